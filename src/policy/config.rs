//! Version store policy configuration
//!
//! Loaded from JSON; every field has a default so an empty object is a
//! valid configuration.

use serde::{Deserialize, Serialize};

use crate::codec::{DEFAULT_COMPRESSION_LEVEL, MAX_COMPRESSION_LEVEL, MIN_COMPRESSION_LEVEL};
use crate::diff::DiffOptions;
use crate::errors::{VersionError, VersionResult};
use crate::reconstruct::ReconstructOptions;

/// Storage policy knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Versions from the nearest snapshot at which the next version is
    /// stored as a snapshot. 1 stores every version as a snapshot.
    #[serde(default = "default_rebase_interval")]
    pub rebase_interval: u32,

    /// A delta whose changed bytes exceed this fraction of the new
    /// content's size is stored as a snapshot instead.
    #[serde(default = "default_max_delta_ratio")]
    pub max_delta_ratio: f64,

    /// Myers edit distance cap; `None` is unbounded.
    #[serde(default = "default_max_edit_distance")]
    pub max_edit_distance: Option<usize>,

    #[serde(default = "default_semantic_cleanup")]
    pub semantic_cleanup: bool,

    /// Verify every delta's hash during reconstruction, not only the base
    /// snapshot and the target.
    #[serde(default = "default_verify_intermediate")]
    pub verify_intermediate: bool,

    /// Gzip stored versions: chain files are written compressed and stats
    /// report compressed sizes.
    #[serde(default)]
    pub compression_enabled: bool,

    /// Gzip level, 1 (fastest) to 9 (smallest).
    #[serde(default = "default_compression_level")]
    pub compression_level: u32,
}

fn default_rebase_interval() -> u32 {
    10
}

fn default_max_delta_ratio() -> f64 {
    0.5
}

fn default_max_edit_distance() -> Option<usize> {
    Some(10_000)
}

fn default_semantic_cleanup() -> bool {
    true
}

fn default_verify_intermediate() -> bool {
    true
}

fn default_compression_level() -> u32 {
    DEFAULT_COMPRESSION_LEVEL
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            rebase_interval: default_rebase_interval(),
            max_delta_ratio: default_max_delta_ratio(),
            max_edit_distance: default_max_edit_distance(),
            semantic_cleanup: default_semantic_cleanup(),
            verify_intermediate: default_verify_intermediate(),
            compression_enabled: false,
            compression_level: default_compression_level(),
        }
    }
}

impl PolicyConfig {
    pub fn with_rebase_interval(mut self, interval: u32) -> Self {
        self.rebase_interval = interval;
        self
    }

    pub fn with_max_delta_ratio(mut self, ratio: f64) -> Self {
        self.max_delta_ratio = ratio;
        self
    }

    pub fn with_max_edit_distance(mut self, max: Option<usize>) -> Self {
        self.max_edit_distance = max;
        self
    }

    pub fn with_compression(mut self, level: u32) -> Self {
        self.compression_enabled = true;
        self.compression_level = level;
        self
    }

    /// The gzip level to store with, or `None` when compression is off.
    pub fn compression(&self) -> Option<u32> {
        self.compression_enabled.then_some(self.compression_level)
    }

    /// Reject out-of-range values.
    pub fn validate(&self) -> VersionResult<()> {
        if self.rebase_interval == 0 {
            return Err(VersionError::invalid_argument(
                "rebase_interval must be at least 1",
            ));
        }
        if !(self.max_delta_ratio > 0.0 && self.max_delta_ratio <= 1.0) {
            return Err(VersionError::invalid_argument(format!(
                "max_delta_ratio must be in (0, 1], got {}",
                self.max_delta_ratio
            )));
        }
        if self.max_edit_distance == Some(0) {
            return Err(VersionError::invalid_argument(
                "max_edit_distance must be positive when set",
            ));
        }
        if !(MIN_COMPRESSION_LEVEL..=MAX_COMPRESSION_LEVEL).contains(&self.compression_level) {
            return Err(VersionError::invalid_argument(format!(
                "compression_level must be between {} and {}, got {}",
                MIN_COMPRESSION_LEVEL, MAX_COMPRESSION_LEVEL, self.compression_level
            )));
        }
        Ok(())
    }

    pub fn diff_options(&self) -> DiffOptions {
        DiffOptions {
            max_edit_distance: self.max_edit_distance,
            semantic_cleanup: self.semantic_cleanup,
        }
    }

    pub fn reconstruct_options(&self) -> ReconstructOptions {
        ReconstructOptions {
            verify_intermediate: self.verify_intermediate,
        }
    }
}
