//! CLI module for pagevault
//!
//! One chain file per page. Commands:
//! - init / record / restore: append a version
//! - show / history / compare: read versions
//! - verify / stats: check and measure a chain
//! - diff: diff two plain files
//!
//! Responses are single JSON objects on stdout; logs go to stderr.

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{ChangeKind, Cli, Command, MetadataArgs};
pub use commands::{execute, load_config, run, run_command};
pub use config::{Config, ConfigError};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{load_chain, read_content, save_chain, write_error, write_response};
