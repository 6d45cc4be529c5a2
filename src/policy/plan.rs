//! Outcomes of policy operations

use serde::Serialize;

use crate::diff::{DiffStats, DiffStrategy, EditScript};
use crate::version::{SequenceNumber, VersionRecord};

/// Why an edit was stored the way it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageDecision {
    /// First version of the page: always a snapshot.
    InitialVersion,
    /// The delta run since the nearest snapshot reached the rebase interval.
    RebaseThreshold,
    /// The delta would change too much of the content, or the diff hit the
    /// edit distance cap.
    OversizedDelta,
    /// Explicit snapshot requested by the caller.
    Forced,
    /// Stored as a delta against the previous head.
    Delta,
}

impl StorageDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageDecision::InitialVersion => "initial_version",
            StorageDecision::RebaseThreshold => "rebase_threshold",
            StorageDecision::OversizedDelta => "oversized_delta",
            StorageDecision::Forced => "forced",
            StorageDecision::Delta => "delta",
        }
    }

    #[inline]
    pub fn is_snapshot(&self) -> bool {
        !matches!(self, StorageDecision::Delta)
    }
}

/// A new record plus how it was decided.
///
/// `strategy` and `stats` are `None` when no diff was computed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditPlan {
    pub record: VersionRecord,
    pub decision: StorageDecision,
    pub strategy: Option<DiffStrategy>,
    pub stats: Option<DiffStats>,
}

/// Difference between two verified versions of a page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VersionComparison {
    pub from: SequenceNumber,
    pub to: SequenceNumber,
    pub script: EditScript,
    pub strategy: DiffStrategy,
    pub stats: DiffStats,
}
