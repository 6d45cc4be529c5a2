//! Version store policy
//!
//! Decides how each edit is stored and assembles reads.
//!
//! On every edit the previous head is reconstructed (and verified), diffed
//! against the new content, and the new version is stored as:
//!
//! - a Snapshot if it is version 1
//! - a Snapshot if `new_seq - nearest_snapshot_seq >= rebase_interval`
//! - a Snapshot if the diff changes more than `max_delta_ratio` of the new
//!   content, or the diff hit the edit distance cap
//! - otherwise a Delta against the previous head
//!
//! ```text
//! NoHistory --edit--> Snapshot(1)
//! Snapshot|Delta(n) --edit--> Delta(n+1)        below threshold
//! Snapshot|Delta(n) --edit--> Snapshot(n+1)     threshold reached
//! ```
//!
//! No operation removes or alters an existing record. Callers serialize
//! `record_edit` per page; the policy holds no per-page state, so distinct
//! pages can be handled from any number of threads.

mod audit;
mod config;
mod plan;
mod stats;

pub use audit::{AuditFailure, AuditReport};
pub use config::PolicyConfig;
pub use plan::{EditPlan, StorageDecision, VersionComparison};
pub use stats::ChainStats;

use crate::diff::{diff_with, EditScript};
use crate::errors::VersionResult;
use crate::hash::hash;
use crate::reconstruct::{
    plan_read, reconstruct_plan, reconstruct_version_with, resume, ReadPlan, ReconstructionCache,
};
use crate::version::{
    ChangeType, Delta, PageId, SequenceNumber, Snapshot, VersionChain, VersionMetadata,
    VersionRecord,
};

/// Storage policy for version chains.
#[derive(Debug, Clone, Default)]
pub struct VersionPolicy {
    config: PolicyConfig,
}

impl VersionPolicy {
    /// Creates a policy, validating its configuration.
    pub fn new(config: PolicyConfig) -> VersionResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Record `new_content` as the next version of `chain`.
    pub fn record_edit(&self, chain: &[VersionRecord], new_content: &str) -> VersionResult<VersionRecord> {
        let change_type = if chain.is_empty() {
            ChangeType::Create
        } else {
            ChangeType::Update
        };
        self.record_edit_with(chain, new_content, VersionMetadata::new(change_type))
    }

    /// `record_edit` with caller-supplied metadata.
    pub fn record_edit_with(
        &self,
        chain: &[VersionRecord],
        new_content: &str,
        metadata: VersionMetadata,
    ) -> VersionResult<VersionRecord> {
        Ok(self.plan_edit(chain, new_content, metadata)?.record)
    }

    /// Decide how to store `new_content` as the next version of `chain`.
    ///
    /// `chain` must be sorted by sequence number and end at the current
    /// head; it only needs the records on the head's read path. The chain
    /// is not modified: appending the returned record is the caller's job.
    pub fn plan_edit(
        &self,
        chain: &[VersionRecord],
        new_content: &str,
        metadata: VersionMetadata,
    ) -> VersionResult<EditPlan> {
        let Some(head) = chain.last() else {
            return Ok(snapshot_plan(
                SequenceNumber::FIRST,
                new_content,
                metadata,
                StorageDecision::InitialVersion,
            ));
        };

        let base_sequence_number = head.sequence_number();
        let sequence_number = base_sequence_number.next()?;

        let read = plan_read(chain, base_sequence_number)?;
        let previous = reconstruct_plan(&read, &self.config.reconstruct_options())?;

        let since_snapshot = sequence_number.distance_from(read.snapshot.sequence_number);
        if since_snapshot >= u64::from(self.config.rebase_interval) {
            return Ok(snapshot_plan(
                sequence_number,
                new_content,
                metadata,
                StorageDecision::RebaseThreshold,
            ));
        }

        // A script with more edits than the oversize limit allows would be
        // stored as a snapshot, so the search stops there.
        let size_limit = self.delta_distance_limit(new_content);
        let mut options = self.config.diff_options();
        let capped_by_size = options.max_edit_distance.map_or(true, |max| size_limit < max);
        if capped_by_size {
            options.max_edit_distance = Some(size_limit);
        }

        let outcome = diff_with(&previous, new_content, &options);
        if outcome.is_fallback() && capped_by_size {
            return Ok(snapshot_plan(
                sequence_number,
                new_content,
                metadata,
                StorageDecision::OversizedDelta,
            ));
        }

        let stats = outcome.script.stats();
        if outcome.is_fallback() || self.is_oversized(&outcome.script, new_content) {
            let mut plan = snapshot_plan(
                sequence_number,
                new_content,
                metadata,
                StorageDecision::OversizedDelta,
            );
            plan.strategy = Some(outcome.strategy);
            plan.stats = Some(stats);
            return Ok(plan);
        }

        let delta = Delta::new(
            sequence_number,
            base_sequence_number,
            outcome.script,
            hash(new_content),
            metadata,
        )?;
        Ok(EditPlan {
            record: delta.into(),
            decision: StorageDecision::Delta,
            strategy: Some(outcome.strategy),
            stats: Some(stats),
        })
    }

    /// Store `content` as a snapshot at the next sequence number without
    /// reading the current head.
    ///
    /// This is the repair path: it works even when the head no longer
    /// reconstructs.
    pub fn force_snapshot(
        &self,
        chain: &[VersionRecord],
        content: &str,
        metadata: VersionMetadata,
    ) -> VersionResult<EditPlan> {
        let sequence_number = match chain.last() {
            Some(head) => head.sequence_number().next()?,
            None => SequenceNumber::FIRST,
        };
        Ok(snapshot_plan(
            sequence_number,
            content,
            metadata,
            StorageDecision::Forced,
        ))
    }

    /// The nearest snapshot at or before `target` plus the deltas leading
    /// to it. Version 0 is an invalid argument.
    pub fn select_base_for_read<'a>(
        &self,
        chain: &'a [VersionRecord],
        target: u64,
    ) -> VersionResult<ReadPlan<'a>> {
        plan_read(chain, SequenceNumber::new(target)?)
    }

    /// Reconstruct and verify version `target`.
    pub fn reconstruct_version(&self, chain: &[VersionRecord], target: u64) -> VersionResult<String> {
        reconstruct_version_with(
            chain,
            SequenceNumber::new(target)?,
            &self.config.reconstruct_options(),
        )
    }

    /// Reconstruct version `target`, starting from the closest version on
    /// its read path that `cache` holds, and cache the result.
    pub fn read_version_cached(
        &self,
        chain: &VersionChain,
        target: u64,
        cache: &mut ReconstructionCache,
    ) -> VersionResult<String> {
        let plan = plan_read(chain.records(), SequenceNumber::new(target)?)?;
        self.read_plan_cached(chain.page_id(), &plan, cache)
    }

    /// Execute an already selected read plan through `cache`.
    ///
    /// Only the deltas past the latest cached version on the path are
    /// applied. The cached text was verified when it was inserted and its
    /// hash tag still matches the record, so it is not verified again.
    pub fn read_plan_cached(
        &self,
        page_id: PageId,
        plan: &ReadPlan<'_>,
        cache: &mut ReconstructionCache,
    ) -> VersionResult<String> {
        let options = self.config.reconstruct_options();

        let mut cached = None;
        for applied in (0..=plan.depth()).rev() {
            let (sequence_number, content_hash) = match applied {
                0 => (plan.snapshot.sequence_number, &plan.snapshot.content_hash),
                n => {
                    let delta = plan.deltas[n - 1];
                    (delta.sequence_number, &delta.content_hash)
                }
            };
            if let Some(text) = cache.get(page_id, sequence_number, content_hash) {
                cached = Some((applied, text.to_string()));
                break;
            }
        }

        let text = match cached {
            Some((applied, text)) => resume(text, &plan.deltas[applied..], &options)?,
            None => reconstruct_plan(plan, &options)?,
        };

        let target_hash = plan
            .deltas
            .last()
            .map(|d| d.content_hash)
            .unwrap_or(plan.snapshot.content_hash);
        cache.insert(page_id, plan.target(), target_hash, text.clone());
        Ok(text)
    }

    /// Make version `target` current again by recording its content as a
    /// new head. History is not rewritten.
    pub fn restore_version(
        &self,
        chain: &[VersionRecord],
        target: u64,
        metadata: VersionMetadata,
    ) -> VersionResult<EditPlan> {
        let content = self.reconstruct_version(chain, target)?;
        let mut metadata = metadata;
        metadata.change_type = ChangeType::Restored;
        if metadata.comment.is_none() {
            metadata.comment = Some(format!("Restored from v{}", target));
        }
        self.plan_edit(chain, &content, metadata)
    }

    /// Diff two verified versions.
    pub fn compare_versions(
        &self,
        chain: &[VersionRecord],
        from: u64,
        to: u64,
    ) -> VersionResult<VersionComparison> {
        let from_seq = SequenceNumber::new(from)?;
        let to_seq = SequenceNumber::new(to)?;
        let options = self.config.reconstruct_options();
        let from_text = reconstruct_version_with(chain, from_seq, &options)?;
        let to_text = reconstruct_version_with(chain, to_seq, &options)?;

        let outcome = diff_with(&from_text, &to_text, &self.config.diff_options());
        let stats = outcome.script.stats();
        Ok(VersionComparison {
            from: from_seq,
            to: to_seq,
            script: outcome.script,
            strategy: outcome.strategy,
            stats,
        })
    }

    /// Storage statistics, with compressed sizes when compression is on.
    pub fn chain_stats(&self, chain: &[VersionRecord]) -> VersionResult<ChainStats> {
        match self.config.compression() {
            Some(level) => ChainStats::compute_compressed(chain, level),
            None => Ok(ChainStats::compute(chain)),
        }
    }

    /// Verify every version of the chain.
    pub fn audit_chain(&self, chain: &[VersionRecord]) -> AuditReport {
        audit::audit(chain, &self.config.reconstruct_options())
    }

    fn is_oversized(&self, script: &EditScript, new_content: &str) -> bool {
        script.changed_bytes() as f64 > self.config.max_delta_ratio * new_content.len() as f64
    }

    /// Largest edit distance a delta of `new_content` can have without
    /// being oversized.
    ///
    /// Every deleted or inserted character costs at least one changed
    /// byte, so a distance above this bound always fails `is_oversized`.
    fn delta_distance_limit(&self, new_content: &str) -> usize {
        (self.config.max_delta_ratio * new_content.len() as f64).floor() as usize
    }
}

fn snapshot_plan(
    sequence_number: SequenceNumber,
    content: &str,
    metadata: VersionMetadata,
    decision: StorageDecision,
) -> EditPlan {
    EditPlan {
        record: Snapshot::new(sequence_number, content.to_string(), metadata).into(),
        decision,
        strategy: None,
        stats: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::DiffStrategy;
    use crate::errors::VersionErrorCode;
    use crate::version::RecordKind;

    fn policy(interval: u32) -> VersionPolicy {
        VersionPolicy::new(PolicyConfig::default().with_rebase_interval(interval)).unwrap()
    }

    fn build(policy: &VersionPolicy, texts: &[&str]) -> Vec<VersionRecord> {
        let mut chain = Vec::new();
        for text in texts {
            let record = policy.record_edit(&chain, text).unwrap();
            chain.push(record);
        }
        chain
    }

    fn kinds(chain: &[VersionRecord]) -> Vec<RecordKind> {
        chain.iter().map(VersionRecord::kind).collect()
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let err = VersionPolicy::new(PolicyConfig::default().with_rebase_interval(0)).unwrap_err();
        assert_eq!(err.code(), VersionErrorCode::InvalidArgument);
    }

    #[test]
    fn test_first_edit_is_snapshot() {
        let plan = policy(10)
            .plan_edit(&[], "hello", VersionMetadata::new(ChangeType::Create))
            .unwrap();
        assert_eq!(plan.decision, StorageDecision::InitialVersion);
        assert_eq!(plan.record.sequence_number(), SequenceNumber::FIRST);
        assert!(plan.record.is_snapshot());
        assert_eq!(plan.record.metadata().change_type, ChangeType::Create);
    }

    #[test]
    fn test_revert_sequence_stores_deltas() {
        let p = policy(10);
        let chain = build(&p, &["A", "AB", "ABC", "AB"]);
        assert_eq!(
            kinds(&chain),
            vec![RecordKind::Snapshot, RecordKind::Delta, RecordKind::Delta, RecordKind::Delta]
        );
        for (i, text) in ["A", "AB", "ABC", "AB"].iter().enumerate() {
            assert_eq!(p.reconstruct_version(&chain, i as u64 + 1).unwrap(), *text);
        }
    }

    #[test]
    fn test_rebase_interval_two() {
        let p = policy(2);
        let chain = build(&p, &["v1 text", "v1 text!", "v1 text!!", "v1 text!!!"]);
        assert_eq!(
            kinds(&chain),
            vec![RecordKind::Snapshot, RecordKind::Delta, RecordKind::Snapshot, RecordKind::Delta]
        );
        let plan = p.select_base_for_read(&chain, 4).unwrap();
        assert_eq!(plan.snapshot.sequence_number.value(), 3);
        assert_eq!(plan.deltas.len(), 1);
        assert_eq!(plan.deltas[0].sequence_number.value(), 4);
    }

    #[test]
    fn test_interval_one_stores_only_snapshots() {
        let p = policy(1);
        let chain = build(&p, &["a", "ab", "abc"]);
        assert!(chain.iter().all(VersionRecord::is_snapshot));
    }

    #[test]
    fn test_rewrite_is_stored_as_snapshot() {
        let p = policy(10);
        let chain = build(&p, &["The quick brown fox"]);
        let plan = p
            .plan_edit(&chain, "Lorem ipsum dolor sit amet", VersionMetadata::default())
            .unwrap();
        assert_eq!(plan.decision, StorageDecision::OversizedDelta);
        assert!(plan.record.is_snapshot());
        // The search stopped at the size limit; no script was kept.
        assert_eq!(plan.strategy, None);
        assert_eq!(plan.stats, None);
    }

    #[test]
    fn test_size_limit_follows_delta_ratio() {
        // "ab" -> "abcdefghij" inserts 8 of 10 bytes.
        let p = VersionPolicy::new(PolicyConfig::default().with_max_delta_ratio(1.0)).unwrap();
        let chain = build(&p, &["ab"]);
        let plan = p
            .plan_edit(&chain, "abcdefghij", VersionMetadata::default())
            .unwrap();
        assert_eq!(plan.decision, StorageDecision::Delta);
        assert_eq!(plan.strategy, Some(DiffStrategy::Myers));

        let p = policy(10);
        let chain = build(&p, &["ab"]);
        let plan = p
            .plan_edit(&chain, "abcdefghij", VersionMetadata::default())
            .unwrap();
        assert_eq!(plan.decision, StorageDecision::OversizedDelta);
        assert_eq!(plan.strategy, None);
    }

    #[test]
    fn test_large_rewrite_stops_search_early() {
        let p = policy(10);
        let base = "ab".repeat(2_500);
        let rewrite = "xy".repeat(2_500);
        let chain = build(&p, &[base.as_str()]);
        let plan = p.plan_edit(&chain, &rewrite, VersionMetadata::default()).unwrap();
        assert_eq!(plan.decision, StorageDecision::OversizedDelta);
        assert!(plan.record.is_snapshot());
        assert_eq!(plan.strategy, None);
        assert_eq!(plan.record.content_len(), rewrite.len());
    }

    #[test]
    fn test_distance_cap_fallback_is_reported() {
        let config = PolicyConfig::default().with_max_edit_distance(Some(1));
        let p = VersionPolicy::new(config).unwrap();
        let chain = build(&p, &["abcdefghij"]);
        let plan = p
            .plan_edit(&chain, "abXdeYghiZ", VersionMetadata::default())
            .unwrap();
        assert_eq!(plan.decision, StorageDecision::OversizedDelta);
        assert_eq!(plan.strategy, Some(DiffStrategy::FullReplacement));
    }

    #[test]
    fn test_version_zero_is_invalid_argument() {
        let p = policy(10);
        let chain = build(&p, &["A"]);
        let err = p.select_base_for_read(&chain, 0).unwrap_err();
        assert_eq!(err.code(), VersionErrorCode::InvalidArgument);
        let err = p.reconstruct_version(&chain, 0).unwrap_err();
        assert_eq!(err.code(), VersionErrorCode::InvalidArgument);
    }

    #[test]
    fn test_empty_chain_read_is_invalid_argument() {
        let p = policy(10);
        let err = p.select_base_for_read(&[], 1).unwrap_err();
        assert_eq!(err.code(), VersionErrorCode::InvalidArgument);
        let err = p.reconstruct_version(&[], 1).unwrap_err();
        assert_eq!(err.code(), VersionErrorCode::InvalidArgument);
        let err = p.compare_versions(&[], 1, 1).unwrap_err();
        assert_eq!(err.code(), VersionErrorCode::InvalidArgument);
    }

    #[test]
    fn test_missing_version_is_not_found() {
        let p = policy(10);
        let chain = build(&p, &["A"]);
        let err = p.reconstruct_version(&chain, 2).unwrap_err();
        assert_eq!(err.code(), VersionErrorCode::NotFound);
    }

    #[test]
    fn test_edit_on_corrupt_head_fails_but_force_snapshot_works() {
        let p = policy(10);
        let mut chain = build(&p, &["A", "AB"]);
        if let VersionRecord::Snapshot(s) = &mut chain[0] {
            s.content = "Z".to_string();
        }
        let err = p.record_edit(&chain, "ABC").unwrap_err();
        assert_eq!(err.code(), VersionErrorCode::Integrity);

        let plan = p
            .force_snapshot(&chain, "A", VersionMetadata::new(ChangeType::Checkpoint))
            .unwrap();
        assert_eq!(plan.decision, StorageDecision::Forced);
        assert_eq!(plan.record.sequence_number().value(), 3);
    }

    #[test]
    fn test_restore_records_new_head() {
        let p = policy(10);
        let mut chain = build(&p, &["first draft", "first draft, revised"]);
        let plan = p
            .restore_version(&chain, 1, VersionMetadata::default().with_author("bob"))
            .unwrap();
        let record = plan.record;
        assert_eq!(record.sequence_number().value(), 3);
        assert_eq!(record.metadata().change_type, ChangeType::Restored);
        assert_eq!(record.metadata().comment.as_deref(), Some("Restored from v1"));
        assert_eq!(record.metadata().author.as_deref(), Some("bob"));
        chain.push(record);
        assert_eq!(p.reconstruct_version(&chain, 3).unwrap(), "first draft");
        assert_eq!(p.reconstruct_version(&chain, 2).unwrap(), "first draft, revised");
    }

    #[test]
    fn test_compare_versions() {
        let p = policy(10);
        let chain = build(&p, &["Hello world", "Hello world, again", "Hello amdWiki, again"]);
        let cmp = p.compare_versions(&chain, 1, 3).unwrap();
        assert_eq!(cmp.script.base_text(), "Hello world");
        assert_eq!(cmp.script.target_text(), "Hello amdWiki, again");
        assert_eq!(cmp.stats, cmp.script.stats());
        assert_eq!(cmp.from.value(), 1);
        assert_eq!(cmp.to.value(), 3);
    }

    #[test]
    fn test_read_version_cached_matches_uncached() {
        let p = policy(10);
        let texts = ["one", "one two", "one two three", "one two three four"];
        let chain =
            VersionChain::from_records(PageId::random(), build(&p, &texts)).unwrap();
        let mut cache = ReconstructionCache::new(16);

        assert_eq!(p.read_version_cached(&chain, 2, &mut cache).unwrap(), texts[1]);
        // Version 4 resumes from the cached version 2.
        assert_eq!(p.read_version_cached(&chain, 4, &mut cache).unwrap(), texts[3]);
        assert_eq!(cache.stats().hits, 1);
        assert_eq!(p.read_version_cached(&chain, 4, &mut cache).unwrap(), texts[3]);
        assert_eq!(cache.stats().hits, 2);
    }

    #[test]
    fn test_read_plan_cached_reuses_selected_plan() {
        let p = policy(10);
        let texts = ["alpha", "alpha beta", "alpha beta gamma"];
        let chain =
            VersionChain::from_records(PageId::random(), build(&p, &texts)).unwrap();
        let mut cache = ReconstructionCache::new(4);

        let plan = p.select_base_for_read(chain.records(), 3).unwrap();
        assert_eq!(p.read_plan_cached(chain.page_id(), &plan, &mut cache).unwrap(), texts[2]);
        assert_eq!(cache.len(), 1);
        assert_eq!(p.read_plan_cached(chain.page_id(), &plan, &mut cache).unwrap(), texts[2]);
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn test_chain_stats_follow_compression_switch() {
        let texts = ["page body ".repeat(40), format!("{}edited", "page body ".repeat(40))];
        let texts: Vec<&str> = texts.iter().map(String::as_str).collect();

        let plain = policy(10);
        let stats = plain.chain_stats(&build(&plain, &texts)).unwrap();
        assert_eq!(stats.compressed_bytes, None);

        let packed = VersionPolicy::new(PolicyConfig::default().with_compression(9)).unwrap();
        let chain = build(&packed, &texts);
        let stats = packed.chain_stats(&chain).unwrap();
        assert_eq!(stats.total_versions, 2);
        assert!(stats.compressed_bytes.unwrap() < stats.stored_bytes);
    }

    #[test]
    fn test_policy_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<VersionPolicy>();
        assert_send_sync::<VersionRecord>();
    }
}
