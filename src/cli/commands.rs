//! CLI command implementations
//!
//! Every command loads the configuration, does its work through the
//! version policy and returns a JSON value that `run_command` prints as
//! `{"status":"ok","data":...}`. Commands that append a version rewrite
//! the chain file only after the new record has been accepted.

use std::path::Path;

use chrono::Utc;
use serde_json::{json, Value};

use crate::codec::encoded_delta_len;
use crate::diff::{diff_with, DiffOptions, DiffStrategy};
use crate::observability::{log_event, Event};
use crate::policy::{EditPlan, StorageDecision, VersionPolicy};
use crate::version::{ChangeType, PageId, VersionChain, VersionMetadata, VersionRecord};

use super::args::{Cli, Command, MetadataArgs};
use super::config::Config;
use super::errors::{CliError, CliResult};
use super::io::{load_chain, read_content, save_chain, write_response};

/// Main CLI entry point
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli)
}

/// Run the command named by the parsed arguments
pub fn run_command(cli: Cli) -> CliResult<()> {
    let config = load_config(&cli.config)?;
    let data = execute(&config, cli.command)?;
    write_response(data)
}

/// Load the configuration file, falling back to defaults if absent.
pub fn load_config(path: &Path) -> CliResult<Config> {
    let (config, found) = Config::load_or_default(path)?;
    let path_str = path.display().to_string();
    let interval = config.policy.rebase_interval.to_string();
    log_event(
        Event::ConfigLoaded,
        &[
            ("path", path_str.as_str()),
            ("source", if found { "file" } else { "defaults" }),
            ("rebase_interval", interval.as_str()),
        ],
    );
    Ok(config)
}

/// Execute one command and return its response data.
pub fn execute(config: &Config, command: Command) -> CliResult<Value> {
    let policy = config.version_policy()?;
    match command {
        Command::Init {
            chain,
            page_id,
            file,
            meta,
        } => init(&policy, &chain, page_id, file.as_deref(), meta),
        Command::Record {
            chain,
            file,
            meta,
            change_type,
        } => record(&policy, &chain, file.as_deref(), meta, change_type.into()),
        Command::Show { chain, versions } => show(config, &policy, &chain, &versions),
        Command::History { chain } => history(&chain),
        Command::Compare { chain, from, to } => compare(&policy, &chain, from, to),
        Command::Restore {
            chain,
            version,
            meta,
        } => restore(&policy, &chain, version, meta),
        Command::Verify { chain } => verify(&policy, &chain),
        Command::Stats { chain } => stats(&policy, &chain),
        Command::Diff {
            base,
            target,
            minimal,
        } => diff_files(&policy, &base, &target, minimal),
    }
}

/// Create a chain file holding version 1.
///
/// Fails if the chain file already exists.
pub fn init(
    policy: &VersionPolicy,
    chain_path: &Path,
    page_id: Option<PageId>,
    file: Option<&Path>,
    meta: MetadataArgs,
) -> CliResult<Value> {
    if chain_path.exists() {
        return Err(CliError::already_initialized(chain_path.display()));
    }

    let content = read_content(file)?;
    let mut chain = VersionChain::new(page_id.unwrap_or_else(PageId::random));
    let plan = policy.plan_edit(chain.records(), &content, metadata(meta, ChangeType::Create))?;
    let data = append(&mut chain, plan)?;
    save_chain(chain_path, &chain, policy.config().compression())?;
    Ok(data)
}

/// Record new content as the next version.
pub fn record(
    policy: &VersionPolicy,
    chain_path: &Path,
    file: Option<&Path>,
    meta: MetadataArgs,
    change_type: ChangeType,
) -> CliResult<Value> {
    let mut chain = load_chain(chain_path)?;
    let content = read_content(file)?;
    let plan = policy
        .plan_edit(chain.records(), &content, metadata(meta, change_type))
        .map_err(|e| report_failure(e, chain_path))?;
    let data = append(&mut chain, plan)?;
    save_chain(chain_path, &chain, policy.config().compression())?;
    Ok(data)
}

/// Reconstruct one or more versions through a shared cache.
pub fn show(
    config: &Config,
    policy: &VersionPolicy,
    chain_path: &Path,
    versions: &[u64],
) -> CliResult<Value> {
    let chain = load_chain(chain_path)?;
    let mut cache = config.reconstruction_cache();

    let mut shown = Vec::with_capacity(versions.len());
    for &version in versions {
        let read = policy.select_base_for_read(chain.records(), version)?;
        let content = policy
            .read_plan_cached(chain.page_id(), &read, &mut cache)
            .map_err(|e| report_failure(e, chain_path))?;

        let version_str = version.to_string();
        let depth = read.depth().to_string();
        log_event(
            Event::VersionRead,
            &[("sequence_number", version_str.as_str()), ("read_depth", depth.as_str())],
        );

        let record = chain.get(read.target())?;
        shown.push(json!({
            "sequence_number": version,
            "base_snapshot": read.snapshot.sequence_number,
            "read_depth": read.depth(),
            "content_hash": record.content_hash(),
            "metadata": record.metadata(),
            "content": content,
        }));
    }

    Ok(json!({
        "page_id": chain.page_id(),
        "versions": shown,
        "cache": cache.stats(),
    }))
}

/// List every version without reconstructing any content.
pub fn history(chain_path: &Path) -> CliResult<Value> {
    let chain = load_chain(chain_path)?;
    let versions: Vec<Value> = chain.records().iter().map(history_entry).collect();
    Ok(json!({
        "page_id": chain.page_id(),
        "versions": versions,
    }))
}

fn history_entry(record: &VersionRecord) -> Value {
    json!({
        "sequence_number": record.sequence_number(),
        "kind": record.kind(),
        "base_sequence_number": record.base_sequence_number(),
        "content_hash": record.content_hash(),
        "content_bytes": record.content_len(),
        "stored_bytes": record.stored_len(),
        "metadata": record.metadata(),
    })
}

/// Diff two versions of a chain.
pub fn compare(policy: &VersionPolicy, chain_path: &Path, from: u64, to: u64) -> CliResult<Value> {
    let chain = load_chain(chain_path)?;
    let comparison = policy
        .compare_versions(chain.records(), from, to)
        .map_err(|e| report_failure(e, chain_path))?;
    Ok(serde_json::to_value(&comparison)?)
}

/// Record an earlier version's content as the new head.
pub fn restore(
    policy: &VersionPolicy,
    chain_path: &Path,
    version: u64,
    meta: MetadataArgs,
) -> CliResult<Value> {
    let mut chain = load_chain(chain_path)?;
    let plan = policy
        .restore_version(chain.records(), version, metadata(meta, ChangeType::Restored))
        .map_err(|e| report_failure(e, chain_path))?;
    let data = append(&mut chain, plan)?;
    save_chain(chain_path, &chain, policy.config().compression())?;

    let from = version.to_string();
    let head = chain
        .head()
        .map(|r| r.sequence_number().to_string())
        .unwrap_or_default();
    log_event(
        Event::RestoreComplete,
        &[("restored_from", from.as_str()), ("sequence_number", head.as_str())],
    );
    Ok(data)
}

/// Reconstruct and verify every version.
pub fn verify(policy: &VersionPolicy, chain_path: &Path) -> CliResult<Value> {
    let chain = load_chain(chain_path)?;
    let versions = chain.len().to_string();
    log_event(Event::AuditStart, &[("versions", versions.as_str())]);

    let report = policy.audit_chain(chain.records());
    for failure in &report.failures {
        let seq = failure.sequence_number.to_string();
        log_event(
            Event::IntegrityFailure,
            &[
                ("sequence_number", seq.as_str()),
                ("code", failure.error.code().code()),
                ("message", failure.error.message()),
            ],
        );
    }

    let checked = report.versions_checked.to_string();
    let failed = report.failures.len().to_string();
    log_event(
        Event::AuditComplete,
        &[("versions_checked", checked.as_str()), ("failures", failed.as_str())],
    );

    let failures: Vec<Value> = report
        .failures
        .iter()
        .map(|f| {
            json!({
                "sequence_number": f.sequence_number,
                "code": f.error.code().code(),
                "message": f.error.message(),
                "details": f.error.details(),
            })
        })
        .collect();
    Ok(json!({
        "page_id": chain.page_id(),
        "clean": report.is_clean(),
        "versions_checked": report.versions_checked,
        "last_good": report.last_good,
        "failures": failures,
    }))
}

/// Storage statistics for a chain.
pub fn stats(policy: &VersionPolicy, chain_path: &Path) -> CliResult<Value> {
    let chain = load_chain(chain_path)?;
    let stats = policy.chain_stats(chain.records())?;
    let mut data = serde_json::to_value(&stats)?;
    if let Value::Object(map) = &mut data {
        map.insert("page_id".to_string(), json!(chain.page_id()));
    }
    Ok(data)
}

/// Diff two plain text files.
pub fn diff_files(
    policy: &VersionPolicy,
    base: &Path,
    target: &Path,
    minimal: bool,
) -> CliResult<Value> {
    let base_text = read_content(Some(base))?;
    let target_text = read_content(Some(target))?;
    let mut options: DiffOptions = policy.config().diff_options();
    if minimal {
        options.semantic_cleanup = false;
    }

    let outcome = diff_with(&base_text, &target_text, &options);
    if outcome.is_fallback() {
        log_event(Event::DiffFallback, &[("source", "diff")]);
    }
    Ok(json!({
        "strategy": outcome.strategy,
        "edit_distance": outcome.edit_distance,
        "stats": outcome.script.stats(),
        "encoded_bytes": encoded_delta_len(&outcome.script),
        "operations": outcome.script,
    }))
}

/// Append a planned record to the chain and describe it.
fn append(chain: &mut VersionChain, plan: EditPlan) -> CliResult<Value> {
    let EditPlan {
        record,
        decision,
        strategy,
        stats,
    } = plan;

    let seq = record.sequence_number().to_string();
    if strategy == Some(DiffStrategy::FullReplacement) {
        log_event(Event::DiffFallback, &[("sequence_number", seq.as_str())]);
    }
    if matches!(
        decision,
        StorageDecision::RebaseThreshold | StorageDecision::OversizedDelta | StorageDecision::Forced
    ) {
        log_event(
            Event::SnapshotForced,
            &[("sequence_number", seq.as_str()), ("reason", decision.as_str())],
        );
    }

    let data = json!({
        "page_id": chain.page_id(),
        "sequence_number": record.sequence_number(),
        "kind": record.kind(),
        "decision": decision,
        "strategy": strategy,
        "stats": stats,
        "content_hash": record.content_hash(),
        "stored_bytes": record.stored_len(),
    });

    chain.push(record)?;
    log_event(
        Event::VersionRecorded,
        &[("sequence_number", seq.as_str()), ("decision", decision.as_str())],
    );
    Ok(data)
}

fn metadata(meta: MetadataArgs, change_type: ChangeType) -> VersionMetadata {
    let mut metadata = VersionMetadata::new(change_type).with_created_at(Utc::now());
    metadata.author = meta.author;
    metadata.comment = meta.comment;
    metadata
}

/// Log corruption errors before handing them back to the caller.
fn report_failure(e: crate::errors::VersionError, chain_path: &Path) -> CliError {
    if e.is_corruption() {
        let path = chain_path.display().to_string();
        log_event(
            Event::IntegrityFailure,
            &[
                ("path", path.as_str()),
                ("code", e.code().code()),
                ("message", e.message()),
            ],
        );
    }
    CliError::from(e)
}
