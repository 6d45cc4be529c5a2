//! Version engine error types
//!
//! Error codes:
//! - PV_CORRUPT_DIFF (CORRUPTION severity)
//! - PV_DIFF_APPLICATION (CORRUPTION severity)
//! - PV_INTEGRITY (CORRUPTION severity)
//! - PV_NOT_FOUND (ERROR severity)
//! - PV_INVALID_ARGUMENT (ERROR severity)
//!
//! Every error is recoverable from the caller's point of view. None of them
//! is ever auto-corrected inside the engine: corruption surfaces so the
//! owning repository can re-snapshot or flag the page.

use std::fmt;

/// Severity classes for version engine errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The request was wrong; stored data is fine
    Error,
    /// Stored data is damaged; the caller must repair, not retry
    Corruption,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Corruption => write!(f, "CORRUPTION"),
        }
    }
}

/// Error codes for the version engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionErrorCode {
    /// Serialized edit script is malformed
    CorruptDiff,
    /// A Keep/Delete operation does not match the text it is applied to
    DiffApplication,
    /// Reconstructed text does not hash to the recorded content hash
    Integrity,
    /// Requested sequence number is not in the chain
    NotFound,
    /// Precondition violation
    InvalidArgument,
}

impl VersionErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            VersionErrorCode::CorruptDiff => "PV_CORRUPT_DIFF",
            VersionErrorCode::DiffApplication => "PV_DIFF_APPLICATION",
            VersionErrorCode::Integrity => "PV_INTEGRITY",
            VersionErrorCode::NotFound => "PV_NOT_FOUND",
            VersionErrorCode::InvalidArgument => "PV_INVALID_ARGUMENT",
        }
    }

    /// Returns the severity class for this error
    pub fn severity(&self) -> Severity {
        match self {
            VersionErrorCode::CorruptDiff => Severity::Corruption,
            VersionErrorCode::DiffApplication => Severity::Corruption,
            VersionErrorCode::Integrity => Severity::Corruption,
            VersionErrorCode::NotFound => Severity::Error,
            VersionErrorCode::InvalidArgument => Severity::Error,
        }
    }
}

impl fmt::Display for VersionErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Version engine error with context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionError {
    code: VersionErrorCode,
    message: String,
    details: Option<String>,
}

impl VersionError {
    fn new(code: VersionErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Malformed serialized edit script
    pub fn corrupt_diff(message: impl Into<String>) -> Self {
        Self::new(VersionErrorCode::CorruptDiff, message)
    }

    /// Malformed serialized edit script, with the offending byte offset
    pub fn corrupt_diff_at_offset(offset: usize, message: impl Into<String>) -> Self {
        Self::new(VersionErrorCode::CorruptDiff, message)
            .with_details(format!("byte_offset: {}", offset))
    }

    /// Edit script does not fit the text it was applied to
    pub fn diff_application(message: impl Into<String>) -> Self {
        Self::new(VersionErrorCode::DiffApplication, message)
    }

    /// Edit script mismatch at a character offset of the running text
    pub fn diff_application_at_offset(offset: usize, message: impl Into<String>) -> Self {
        Self::new(VersionErrorCode::DiffApplication, message)
            .with_details(format!("char_offset: {}", offset))
    }

    /// Reconstructed content hash mismatch
    pub fn integrity(sequence: u64, expected: impl fmt::Display, actual: impl fmt::Display) -> Self {
        Self::new(
            VersionErrorCode::Integrity,
            format!("content hash mismatch: expected {}, got {}", expected, actual),
        )
        .with_details(format!("sequence_number: {}", sequence))
    }

    /// Sequence number missing from the chain
    pub fn not_found(sequence: u64) -> Self {
        Self::new(
            VersionErrorCode::NotFound,
            format!("version {} does not exist in the chain", sequence),
        )
        .with_details(format!("sequence_number: {}", sequence))
    }

    /// Precondition violation
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(VersionErrorCode::InvalidArgument, message)
    }

    /// Attach (or replace) the details string
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Prefix the message with outer context, keeping code and details
    pub fn context(mut self, context: impl fmt::Display) -> Self {
        self.message = format!("{}: {}", context, self.message);
        self
    }

    /// Returns the error code
    pub fn code(&self) -> VersionErrorCode {
        self.code
    }

    /// Returns the severity class
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns additional error details
    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    /// Returns whether the error indicates damaged stored data
    pub fn is_corruption(&self) -> bool {
        self.severity() == Severity::Corruption
    }
}

impl fmt::Display for VersionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for VersionError {}

/// Result type for version engine operations
pub type VersionResult<T> = Result<T, VersionError>;
