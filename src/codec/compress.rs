//! Gzip compression of stored bytes
//!
//! Used for the storage form of records (snapshot content, delta frames)
//! and for whole chain files. Compressed data is plain gzip, so
//! [`is_compressed`] can tell it apart from JSON or a codec frame by its
//! first two bytes.

use std::io::{Read, Write};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::errors::{VersionError, VersionResult};

/// Gzip member header magic.
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

pub const MIN_COMPRESSION_LEVEL: u32 = 1;
pub const MAX_COMPRESSION_LEVEL: u32 = 9;
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 6;

/// Gzip `data` at `level` (1 = fastest, 9 = smallest).
pub fn compress(data: &[u8], level: u32) -> VersionResult<Vec<u8>> {
    if !(MIN_COMPRESSION_LEVEL..=MAX_COMPRESSION_LEVEL).contains(&level) {
        return Err(VersionError::invalid_argument(format!(
            "compression level must be between {} and {}, got {}",
            MIN_COMPRESSION_LEVEL, MAX_COMPRESSION_LEVEL, level
        )));
    }
    let mut encoder = GzEncoder::new(Vec::with_capacity(data.len() / 2), Compression::new(level));
    encoder
        .write_all(data)
        .map_err(|e| VersionError::invalid_argument(format!("failed to compress: {}", e)))?;
    encoder
        .finish()
        .map_err(|e| VersionError::invalid_argument(format!("failed to finish compression: {}", e)))
}

/// Inflate gzip `data`.
///
/// Truncated or damaged input fails with `PV_CORRUPT_DIFF`.
pub fn decompress(data: &[u8]) -> VersionResult<Vec<u8>> {
    let mut decoder = GzDecoder::new(data);
    let mut out = Vec::with_capacity(data.len() * 2);
    decoder
        .read_to_end(&mut out)
        .map_err(|e| VersionError::corrupt_diff(format!("failed to decompress: {}", e)))?;
    Ok(out)
}

/// True if `data` starts with the gzip magic.
#[inline]
pub fn is_compressed(data: &[u8]) -> bool {
    data.starts_with(&GZIP_MAGIC)
}

/// `compressed / original`; 0 for empty input.
pub fn compression_ratio(original: usize, compressed: usize) -> f64 {
    if original == 0 {
        return 0.0;
    }
    compressed as f64 / original as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::VersionErrorCode;

    #[test]
    fn test_compress_then_decompress() {
        let text = "== Heading ==\nSome wiki text, repeated. ".repeat(50);
        let packed = compress(text.as_bytes(), DEFAULT_COMPRESSION_LEVEL).unwrap();
        assert!(is_compressed(&packed));
        assert!(packed.len() < text.len());
        assert_eq!(decompress(&packed).unwrap(), text.as_bytes());
    }

    #[test]
    fn test_empty_input() {
        let packed = compress(b"", MIN_COMPRESSION_LEVEL).unwrap();
        assert!(decompress(&packed).unwrap().is_empty());
        assert_eq!(compression_ratio(0, packed.len()), 0.0);
    }

    #[test]
    fn test_level_out_of_range() {
        let err = compress(b"text", 0).unwrap_err();
        assert_eq!(err.code(), VersionErrorCode::InvalidArgument);
        assert!(compress(b"text", MAX_COMPRESSION_LEVEL + 1).is_err());
    }

    #[test]
    fn test_truncated_input_is_corrupt() {
        let packed = compress("truncate me ".repeat(20).as_bytes(), 6).unwrap();
        let err = decompress(&packed[..packed.len() / 2]).unwrap_err();
        assert_eq!(err.code(), VersionErrorCode::CorruptDiff);
    }

    #[test]
    fn test_plain_json_is_not_compressed() {
        assert!(!is_compressed(b"{\"page_id\":\"x\"}"));
        assert!(!is_compressed(b""));
    }

    #[test]
    fn test_ratio() {
        assert_eq!(compression_ratio(200, 50), 0.25);
    }
}
