//! Version data model
//!
//! - `SequenceNumber`, `PageId`: identity of a version and of its page
//! - `VersionRecord`: a `Snapshot` (full content) or a `Delta` (edit script
//!   against an earlier version), each tagged with the content hash of the
//!   full text
//! - `VersionChain`: ordered records of one page; append-only
//!
//! These are data types. Deciding how to store an edit lives in `policy`;
//! turning records back into text lives in `reconstruct`.

mod chain;
mod metadata;
mod record;
mod sequence;

pub use chain::{find_record, VersionChain};
pub use metadata::{ChangeType, VersionMetadata};
pub use record::{Delta, RecordKind, Snapshot, VersionRecord};
pub use sequence::{PageId, SequenceNumber};
