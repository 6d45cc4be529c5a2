//! Version metadata
//!
//! Descriptive data attached to each record. None of it takes part in
//! reconstruction or integrity checks; the engine never reads a clock, so
//! `created_at` is whatever the caller supplies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Why a version was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    /// First version of a page.
    Create,
    /// Ordinary edit.
    #[default]
    Update,
    /// Small edit (typo, formatting).
    Minor,
    /// Substantial rewrite.
    Major,
    /// Copy of an earlier version made current again.
    Restored,
    /// Explicit checkpoint requested by the repository.
    Checkpoint,
}

impl ChangeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeType::Create => "create",
            ChangeType::Update => "update",
            ChangeType::Minor => "minor",
            ChangeType::Major => "major",
            ChangeType::Restored => "restored",
            ChangeType::Checkpoint => "checkpoint",
        }
    }
}

/// Author, change type, comment and timestamp of a version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default)]
    pub change_type: ChangeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl VersionMetadata {
    pub fn new(change_type: ChangeType) -> Self {
        Self {
            change_type,
            ..Self::default()
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }
}
