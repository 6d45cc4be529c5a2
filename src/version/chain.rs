//! VersionChain - version history of one page
//!
//! An ordered list of records, keyed by sequence number. The chain only
//! grows: `push` appends the next version and nothing removes or rewrites
//! an existing record.
//!
//! Structural rules, checked on `push` and when a chain is loaded:
//! - sequence numbers start at 1 and are gap-free
//! - version 1 is a snapshot
//! - a delta's base precedes it and exists in the chain
//!
//! Content hashes are NOT checked here; that is the reconstructor's job.

use serde::{Deserialize, Serialize};

use super::{PageId, SequenceNumber, VersionRecord};
use crate::errors::{VersionError, VersionResult};

/// The complete version history of a single page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawChain")]
pub struct VersionChain {
    page_id: PageId,
    records: Vec<VersionRecord>,
}

#[derive(Deserialize)]
struct RawChain {
    page_id: PageId,
    records: Vec<VersionRecord>,
}

impl TryFrom<RawChain> for VersionChain {
    type Error = VersionError;

    fn try_from(raw: RawChain) -> Result<Self, Self::Error> {
        Self::from_records(raw.page_id, raw.records)
    }
}

impl VersionChain {
    /// Creates an empty chain (no history yet).
    pub fn new(page_id: PageId) -> Self {
        Self {
            page_id,
            records: Vec::new(),
        }
    }

    /// Creates a chain from existing records, validating its structure.
    pub fn from_records(page_id: PageId, records: Vec<VersionRecord>) -> VersionResult<Self> {
        let mut chain = Self::new(page_id);
        chain.records.reserve(records.len());
        for record in records {
            chain.push(record)?;
        }
        Ok(chain)
    }

    #[inline]
    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records, in sequence order.
    #[inline]
    pub fn records(&self) -> &[VersionRecord] {
        &self.records
    }

    /// The latest version, if any.
    pub fn head(&self) -> Option<&VersionRecord> {
        self.records.last()
    }

    /// Sequence number the next recorded version must carry.
    pub fn next_sequence_number(&self) -> VersionResult<SequenceNumber> {
        match self.head() {
            Some(head) => head.sequence_number().next(),
            None => Ok(SequenceNumber::FIRST),
        }
    }

    /// Look up a version by sequence number.
    pub fn get(&self, sequence_number: SequenceNumber) -> VersionResult<&VersionRecord> {
        find_record(&self.records, sequence_number)
            .ok_or_else(|| VersionError::not_found(sequence_number.value()))
    }

    /// Appends the next version.
    ///
    /// Rejects anything that would break the chain's structure; the record
    /// is not appended on error.
    pub fn push(&mut self, record: VersionRecord) -> VersionResult<()> {
        let expected = self.next_sequence_number()?;
        let actual = record.sequence_number();
        if actual != expected {
            return Err(VersionError::invalid_argument(format!(
                "expected version {} next, got {}",
                expected, actual
            ))
            .with_details(format!("sequence_number: {}", actual)));
        }

        match &record {
            VersionRecord::Snapshot(_) => {}
            VersionRecord::Delta(_) if self.records.is_empty() => {
                return Err(VersionError::invalid_argument(
                    "version 1 must be a snapshot",
                ));
            }
            VersionRecord::Delta(delta) => {
                delta.check_base()?;
            }
        }

        self.records.push(record);
        Ok(())
    }
}

/// Find a record in a slice sorted by ascending sequence number.
///
/// Works on partial chains: the slice does not have to start at version 1.
pub fn find_record(
    records: &[VersionRecord],
    sequence_number: SequenceNumber,
) -> Option<&VersionRecord> {
    // Gap-free slices resolve by offset; anything else falls back to search.
    if let Some(first) = records.first() {
        let offset = sequence_number.distance_from(first.sequence_number()) as usize;
        if let Some(record) = records.get(offset) {
            if record.sequence_number() == sequence_number {
                return Some(record);
            }
        }
    }
    records
        .binary_search_by_key(&sequence_number, VersionRecord::sequence_number)
        .ok()
        .map(|index| &records[index])
}
