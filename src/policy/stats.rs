//! Storage statistics for a chain
//!
//! Computed from record sizes alone; nothing is reconstructed. Compressed
//! sizes are only filled in when asked for, since they cost a gzip pass
//! over every record.

use serde::Serialize;

use crate::codec::compression_ratio;
use crate::errors::VersionResult;
use crate::version::{SequenceNumber, VersionRecord};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChainStats {
    pub total_versions: usize,
    pub snapshots: usize,
    pub deltas: usize,
    pub head: Option<SequenceNumber>,
    /// Sum of the full content size of every version.
    pub logical_bytes: u64,
    /// Snapshot content plus encoded delta frames.
    pub stored_bytes: u64,
    /// `(1 - stored / logical) * 100`; negative when deltas cost more than
    /// they save. Zero for an empty chain.
    pub space_savings_percent: f64,
    /// Longest run of consecutive deltas, i.e. the worst-case number of
    /// scripts a read has to apply.
    pub longest_delta_run: usize,
    /// Sum of each record's storage form after gzip.
    pub compressed_bytes: Option<u64>,
    /// `compressed_bytes / stored_bytes`.
    pub compression_ratio: Option<f64>,
}

impl ChainStats {
    pub fn compute(chain: &[VersionRecord]) -> Self {
        let mut stats = ChainStats {
            total_versions: chain.len(),
            snapshots: 0,
            deltas: 0,
            head: chain.last().map(VersionRecord::sequence_number),
            logical_bytes: 0,
            stored_bytes: 0,
            space_savings_percent: 0.0,
            longest_delta_run: 0,
            compressed_bytes: None,
            compression_ratio: None,
        };

        let mut run = 0usize;
        for record in chain {
            if record.is_snapshot() {
                stats.snapshots += 1;
                run = 0;
            } else {
                stats.deltas += 1;
                run += 1;
                stats.longest_delta_run = stats.longest_delta_run.max(run);
            }
            stats.logical_bytes += record.content_len() as u64;
            stats.stored_bytes += record.stored_len() as u64;
        }

        if stats.logical_bytes > 0 {
            let ratio = stats.stored_bytes as f64 / stats.logical_bytes as f64;
            stats.space_savings_percent = (1.0 - ratio) * 100.0;
        }
        stats
    }

    /// `compute` plus the size of every record gzipped at `level`.
    pub fn compute_compressed(chain: &[VersionRecord], level: u32) -> VersionResult<Self> {
        let mut stats = Self::compute(chain);
        let mut compressed = 0u64;
        for record in chain {
            compressed += record.compressed_len(level)? as u64;
        }
        stats.compressed_bytes = Some(compressed);
        stats.compression_ratio = Some(compression_ratio(
            stats.stored_bytes as usize,
            compressed as usize,
        ));
        Ok(stats)
    }
}
