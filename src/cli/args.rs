//! CLI argument definitions using clap
//!
//! Commands:
//! - pagevault init <chain> [--file <path>] [--page-id <uuid>]
//! - pagevault record <chain> [--file <path>]
//! - pagevault show <chain> <version>...
//! - pagevault history <chain>
//! - pagevault compare <chain> <from> <to>
//! - pagevault restore <chain> <version>
//! - pagevault verify <chain>
//! - pagevault stats <chain>
//! - pagevault diff <base> <target> [--minimal]
//!
//! Content is read from `--file`, or from stdin when no file is given.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::version::{ChangeType, PageId};

/// pagevault - page version history with delta storage and integrity checks
#[derive(Parser, Debug)]
#[command(name = "pagevault")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (defaults apply if it does not exist)
    #[arg(long, global = true, default_value = "./pagevault.json")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a chain file holding version 1
    Init {
        /// Chain file to create
        chain: PathBuf,
        /// Page identifier; random if omitted
        #[arg(long)]
        page_id: Option<PageId>,
        /// Read content from this file instead of stdin
        #[arg(long)]
        file: Option<PathBuf>,
        #[command(flatten)]
        meta: MetadataArgs,
    },

    /// Record new content as the next version
    Record {
        chain: PathBuf,
        #[arg(long)]
        file: Option<PathBuf>,
        #[command(flatten)]
        meta: MetadataArgs,
        /// Why the edit was made
        #[arg(long, value_enum, default_value_t = ChangeKind::Update)]
        change_type: ChangeKind,
    },

    /// Print the content of one or more versions
    ///
    /// All versions are read through one reconstruction cache, so later
    /// versions on a shared path resume from earlier ones.
    Show {
        chain: PathBuf,
        #[arg(required = true)]
        versions: Vec<u64>,
    },

    /// List every version with its storage form and metadata
    History { chain: PathBuf },

    /// Diff two versions of a chain
    Compare {
        chain: PathBuf,
        from: u64,
        to: u64,
    },

    /// Record an earlier version's content as the new head
    Restore {
        chain: PathBuf,
        version: u64,
        #[command(flatten)]
        meta: MetadataArgs,
    },

    /// Reconstruct and verify every version
    Verify { chain: PathBuf },

    /// Storage statistics for a chain
    Stats { chain: PathBuf },

    /// Diff two plain text files
    Diff {
        base: PathBuf,
        target: PathBuf,
        /// Skip semantic cleanup (plain minimal Myers output)
        #[arg(long)]
        minimal: bool,
    },
}

/// Author and comment for a new version.
#[derive(Args, Debug, Clone, Default)]
pub struct MetadataArgs {
    #[arg(long)]
    pub author: Option<String>,
    #[arg(long)]
    pub comment: Option<String>,
}

/// Change types accepted on the command line.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Update,
    Minor,
    Major,
    Checkpoint,
}

impl From<ChangeKind> for ChangeType {
    fn from(kind: ChangeKind) -> Self {
        match kind {
            ChangeKind::Update => ChangeType::Update,
            ChangeKind::Minor => ChangeType::Minor,
            ChangeKind::Major => ChangeType::Major,
            ChangeKind::Checkpoint => ChangeType::Checkpoint,
        }
    }
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
