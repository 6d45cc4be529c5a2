//! CLI-specific error types
//!
//! Engine errors keep their own `PV_*` code so scripts can tell a
//! corrupted chain from a bad request.

use std::fmt;
use std::io;

use crate::errors::{VersionError, VersionErrorCode};

use super::config::ConfigError;

/// CLI error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// File or stdin/stdout I/O error
    IoError,
    /// Chain file is not valid JSON or not a valid chain
    InvalidChainFile,
    /// `init` on an existing chain file
    AlreadyInitialized,
    /// Error returned by the version engine
    Engine(VersionErrorCode),
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "PV_CLI_CONFIG_ERROR",
            Self::IoError => "PV_CLI_IO_ERROR",
            Self::InvalidChainFile => "PV_CLI_INVALID_CHAIN_FILE",
            Self::AlreadyInitialized => "PV_CLI_ALREADY_INITIALIZED",
            Self::Engine(code) => code.code(),
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn invalid_chain_file(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::InvalidChainFile, msg)
    }

    pub fn already_initialized(path: impl fmt::Display) -> Self {
        Self::new(
            CliErrorCode::AlreadyInitialized,
            format!("Chain file {} already exists", path),
        )
    }

    pub fn code(&self) -> CliErrorCode {
        self.code
    }

    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// True if the error reports damaged stored data.
    pub fn is_corruption(&self) -> bool {
        match self.code {
            CliErrorCode::Engine(code) => code.severity() == crate::errors::Severity::Corruption,
            _ => false,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<VersionError> for CliError {
    fn from(e: VersionError) -> Self {
        let message = match e.details() {
            Some(details) => format!("{} ({})", e.message(), details),
            None => e.message().to_string(),
        };
        Self::new(CliErrorCode::Engine(e.code()), message)
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::config_error(e.to_string())
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
