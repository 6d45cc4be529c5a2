//! File and JSON I/O for the CLI
//!
//! - Content: a file given with `--file`, or all of stdin
//! - Chain files: one JSON document per page, optionally gzipped
//! - Output: single JSON object on stdout, logs go to stderr

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::codec;
use crate::observability::{log_event, Event};
use crate::version::VersionChain;

use super::errors::{CliError, CliResult};

/// Read page content from `path`, or from stdin when `path` is `None`.
pub fn read_content(path: Option<&Path>) -> CliResult<String> {
    match path {
        Some(path) => fs::read_to_string(path).map_err(|e| {
            CliError::io_error(format!("Failed to read {}: {}", path.display(), e))
        }),
        None => {
            let mut content = String::new();
            io::stdin().lock().read_to_string(&mut content)?;
            Ok(content)
        }
    }
}

/// Load and structurally validate a chain file.
///
/// Gzipped files are recognised by their magic bytes, so a chain written
/// with compression on still loads after it is turned off.
pub fn load_chain(path: &Path) -> CliResult<VersionChain> {
    let mut bytes = fs::read(path).map_err(|e| {
        CliError::io_error(format!("Failed to read chain {}: {}", path.display(), e))
    })?;
    let compressed = codec::is_compressed(&bytes);
    if compressed {
        bytes = codec::decompress(&bytes).map_err(|e| {
            CliError::invalid_chain_file(format!("{}: {}", path.display(), e))
        })?;
    }
    let chain: VersionChain = serde_json::from_slice(&bytes).map_err(|e| {
        CliError::invalid_chain_file(format!("{}: {}", path.display(), e))
    })?;

    let path_str = path.display().to_string();
    let versions = chain.len().to_string();
    log_event(
        Event::ChainLoaded,
        &[
            ("path", path_str.as_str()),
            ("versions", versions.as_str()),
            ("compressed", if compressed { "true" } else { "false" }),
        ],
    );
    Ok(chain)
}

/// Write a chain file, gzipped at `compression` when given.
///
/// The chain is written to a sibling temp file and renamed over the
/// target, so a crash leaves either the old or the new file.
pub fn save_chain(path: &Path, chain: &VersionChain, compression: Option<u32>) -> CliResult<()> {
    let mut bytes = serde_json::to_vec_pretty(chain)?;
    bytes.push(b'\n');
    let plain_len = bytes.len();
    if let Some(level) = compression {
        bytes = codec::compress(&bytes, level)?;
    }

    let tmp = temp_path(path);
    {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(&bytes)?;
        file.sync_all()?;
    }
    fs::rename(&tmp, path)?;

    let path_str = path.display().to_string();
    let versions = chain.len().to_string();
    let written = bytes.len().to_string();
    let plain = plain_len.to_string();
    log_event(
        Event::ChainSaved,
        &[
            ("path", path_str.as_str()),
            ("versions", versions.as_str()),
            ("bytes", written.as_str()),
            ("uncompressed_bytes", plain.as_str()),
        ],
    );
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "ok",
        "data": data
    });

    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, &response)?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}

/// Write an error response to stdout
pub fn write_error(code: &str, message: &str) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "error",
        "code": code,
        "message": message
    });

    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, &response)?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}
