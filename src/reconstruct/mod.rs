//! Chain reconstructor
//!
//! Turns stored records back into text:
//!
//! 1. `plan_read` walks delta base pointers back from the target to the
//!    nearest snapshot, producing the minimal `ReadPlan`
//! 2. the snapshot's content is verified against its recorded hash
//! 3. deltas are applied strictly in order, each to the exact output of
//!    the previous one
//! 4. the final text is verified against the target's recorded hash
//!
//! A mismatch at any step is an error; text that failed verification is
//! never returned. Reconstruction is pure: callers may reconstruct from as
//! many threads as they like.

mod apply;
mod cache;

pub use apply::apply;
pub use cache::{CacheStats, ReconstructionCache};

use crate::diff::EditScript;
use crate::errors::{VersionError, VersionResult};
use crate::hash::verify_recorded;
use crate::version::{find_record, Delta, SequenceNumber, Snapshot, VersionRecord};

/// Replay `deltas` in order on top of `base`.
///
/// An empty list returns `base` unchanged.
pub fn reconstruct(base: &str, deltas: &[EditScript]) -> VersionResult<String> {
    let mut text = base.to_string();
    let total = deltas.len();
    for (index, script) in deltas.iter().enumerate() {
        text = apply(&text, script)
            .map_err(|e| e.context(format!("delta {} of {}", index + 1, total)))?;
    }
    Ok(text)
}

/// Verification switches for chain reconstruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconstructOptions {
    /// Check every intermediate delta's hash, not only the base snapshot
    /// and the target.
    pub verify_intermediate: bool,
}

impl Default for ReconstructOptions {
    fn default() -> Self {
        Self {
            verify_intermediate: true,
        }
    }
}

/// The records needed to rebuild one version: its nearest snapshot at or
/// before it, then the deltas leading to it, in application order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadPlan<'a> {
    pub snapshot: &'a Snapshot,
    pub deltas: Vec<&'a Delta>,
}

impl<'a> ReadPlan<'a> {
    /// The version this plan rebuilds.
    pub fn target(&self) -> SequenceNumber {
        self.deltas
            .last()
            .map(|d| d.sequence_number)
            .unwrap_or(self.snapshot.sequence_number)
    }

    /// Number of deltas to apply.
    pub fn depth(&self) -> usize {
        self.deltas.len()
    }

    /// Sequence numbers touched by the plan, snapshot first.
    pub fn sequence_numbers(&self) -> Vec<SequenceNumber> {
        std::iter::once(self.snapshot.sequence_number)
            .chain(self.deltas.iter().map(|d| d.sequence_number))
            .collect()
    }
}

/// Walk back from `target` to the nearest snapshot.
///
/// `chain` must be sorted by sequence number but may be a partial slice of
/// the page's history, as long as it holds every record on the path. An
/// empty chain is an invalid argument rather than a missing version.
pub fn plan_read(chain: &[VersionRecord], target: SequenceNumber) -> VersionResult<ReadPlan<'_>> {
    if chain.is_empty() {
        return Err(VersionError::invalid_argument("empty chain")
            .with_details(format!("sequence_number: {}", target)));
    }
    let mut current =
        find_record(chain, target).ok_or_else(|| VersionError::not_found(target.value()))?;
    let mut deltas = Vec::new();

    loop {
        match current {
            VersionRecord::Snapshot(snapshot) => {
                deltas.reverse();
                return Ok(ReadPlan { snapshot, deltas });
            }
            VersionRecord::Delta(delta) => {
                // Bases strictly decrease, so the walk terminates.
                delta.check_base()?;
                deltas.push(delta);
                current = find_record(chain, delta.base_sequence_number).ok_or_else(|| {
                    VersionError::not_found(delta.base_sequence_number.value())
                        .context(format!("base of delta {}", delta.sequence_number))
                })?;
            }
        }
    }
}

/// Execute a read plan with verification.
pub fn reconstruct_plan(plan: &ReadPlan<'_>, options: &ReconstructOptions) -> VersionResult<String> {
    let snapshot = plan.snapshot;
    verify_recorded(
        &snapshot.content,
        &snapshot.content_hash,
        snapshot.sequence_number.value(),
    )
    .map_err(|e| e.context(format!("snapshot {}", snapshot.sequence_number)))?;

    resume(snapshot.content.clone(), &plan.deltas, options)
}

/// Apply `deltas` to already verified `text`, verifying as configured.
pub(crate) fn resume(
    mut text: String,
    deltas: &[&Delta],
    options: &ReconstructOptions,
) -> VersionResult<String> {
    let last = deltas.len();
    for (index, delta) in deltas.iter().enumerate() {
        text = apply(&text, &delta.edit_script).map_err(|e| {
            e.context(format!(
                "applying delta {} to version {}",
                delta.sequence_number, delta.base_sequence_number
            ))
        })?;
        if options.verify_intermediate || index + 1 == last {
            verify_recorded(&text, &delta.content_hash, delta.sequence_number.value())?;
        }
    }
    Ok(text)
}

/// Rebuild version `target` from a chain slice, verifying its hash.
pub fn reconstruct_version(chain: &[VersionRecord], target: SequenceNumber) -> VersionResult<String> {
    reconstruct_version_with(chain, target, &ReconstructOptions::default())
}

/// `reconstruct_version` with explicit options.
pub fn reconstruct_version_with(
    chain: &[VersionRecord],
    target: SequenceNumber,
    options: &ReconstructOptions,
) -> VersionResult<String> {
    let plan = plan_read(chain, target)?;
    reconstruct_plan(&plan, options)
}
