//! Binary configuration (`pagevault.json`)
//!
//! ```json
//! {
//!   "policy": { "rebase_interval": 10, "max_delta_ratio": 0.5 },
//!   "cache_max_entries": 32
//! }
//! ```
//!
//! Every field is optional. A missing file means defaults.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::errors::VersionError;
use crate::policy::{PolicyConfig, VersionPolicy};
use crate::reconstruct::ReconstructionCache;

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("invalid config JSON in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid policy configuration: {0}")]
    Policy(#[from] VersionError),
}

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub policy: PolicyConfig,

    /// Entries in the cache shared by the versions one `show` reads;
    /// 0 disables the cache
    #[serde(default = "default_cache_max_entries")]
    pub cache_max_entries: usize,
}

fn default_cache_max_entries() -> usize {
    32
}

impl Default for Config {
    fn default() -> Self {
        Self {
            policy: PolicyConfig::default(),
            cache_max_entries: default_cache_max_entries(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;
        let config: Config = serde_json::from_str(&content).map_err(|source| {
            ConfigError::Parse {
                path: display,
                source,
            }
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration, falling back to defaults if the file is absent.
    ///
    /// Returns whether the file was found.
    pub fn load_or_default(path: &Path) -> Result<(Self, bool), ConfigError> {
        if path.exists() {
            Ok((Self::load(path)?, true))
        } else {
            Ok((Self::default(), false))
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.policy.validate()?;
        Ok(())
    }

    pub fn version_policy(&self) -> Result<VersionPolicy, ConfigError> {
        Ok(VersionPolicy::new(self.policy.clone())?)
    }

    pub fn reconstruction_cache(&self) -> ReconstructionCache {
        ReconstructionCache::new(self.cache_max_entries)
    }
}
