//! pagevault - page version history with delta storage
//!
//! Each page's history is a chain of versions. Version 1 and every
//! rebase point are stored as full snapshots; the versions between them
//! are stored as character-level edit scripts against their predecessor.
//! Every stored version carries a SHA-256 of its full content, and every
//! read is verified against it.
//!
//! Modules, bottom up:
//! - `diff`: Myers diff producing edit scripts
//! - `codec`: checksummed binary frames for edit scripts and deltas
//! - `hash`: content hashing
//! - `version`: records, metadata and the chain
//! - `reconstruct`: applying deltas to snapshots, read plans and caching
//! - `policy`: snapshot-or-delta decisions, restore, compare and audit
//! - `cli`: the `pagevault` binary

pub mod cli;
pub mod codec;
pub mod diff;
pub mod errors;
pub mod hash;
pub mod observability;
pub mod policy;
pub mod reconstruct;
pub mod version;

pub use diff::{diff, diff_minimal, diff_with, DiffOptions, DiffOutcome, DiffStrategy, EditScript, Operation};
pub use errors::{VersionError, VersionErrorCode, VersionResult};
pub use hash::ContentHash;
pub use policy::{PolicyConfig, VersionPolicy};
pub use reconstruct::{apply, reconstruct};
pub use version::{PageId, SequenceNumber, VersionChain, VersionMetadata, VersionRecord};
