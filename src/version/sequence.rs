//! Version identity
//!
//! `SequenceNumber` orders the versions of one page: strictly increasing,
//! gap-free, starting at 1. Zero is not a sequence number and cannot be
//! constructed.
//!
//! `PageId` names the page a chain belongs to. The engine never assigns
//! page identifiers itself beyond `PageId::random()` for callers that
//! have none.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{VersionError, VersionResult};

/// Position of a version within its page's chain.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct SequenceNumber(u64);

impl SequenceNumber {
    /// The first version of every page.
    pub const FIRST: SequenceNumber = SequenceNumber(1);

    /// Creates a sequence number, rejecting zero.
    pub fn new(value: u64) -> VersionResult<Self> {
        if value == 0 {
            return Err(VersionError::invalid_argument(
                "sequence numbers start at 1; version 0 does not exist",
            ));
        }
        Ok(Self(value))
    }

    #[inline]
    pub fn value(&self) -> u64 {
        self.0
    }

    /// The sequence number that follows this one.
    pub fn next(&self) -> VersionResult<Self> {
        self.0
            .checked_add(1)
            .map(Self)
            .ok_or_else(|| VersionError::invalid_argument("sequence number overflow"))
    }

    /// Number of versions from `earlier` to `self`; zero if `earlier` is not earlier.
    pub fn distance_from(&self, earlier: SequenceNumber) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl TryFrom<u64> for SequenceNumber {
    type Error = VersionError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SequenceNumber> for u64 {
    fn from(seq: SequenceNumber) -> u64 {
        seq.0
    }
}

impl fmt::Display for SequenceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a versioned page.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(Uuid);

impl PageId {
    /// A fresh random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    #[inline]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PageId {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| VersionError::invalid_argument(format!("invalid page id {:?}: {}", s, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::VersionErrorCode;

    #[test]
    fn test_zero_is_rejected() {
        let err = SequenceNumber::new(0).unwrap_err();
        assert_eq!(err.code(), VersionErrorCode::InvalidArgument);
        assert!(SequenceNumber::try_from(0u64).is_err());
    }

    #[test]
    fn test_ordering_and_next() {
        let one = SequenceNumber::FIRST;
        let two = one.next().unwrap();
        assert!(one < two);
        assert_eq!(two.value(), 2);
        assert_eq!(two.distance_from(one), 1);
        assert_eq!(one.distance_from(two), 0);
    }

    #[test]
    fn test_next_overflow_is_an_error() {
        let max = SequenceNumber::new(u64::MAX).unwrap();
        assert!(max.next().is_err());
    }

    #[test]
    fn test_serde_rejects_zero() {
        assert_eq!(serde_json::to_string(&SequenceNumber::FIRST).unwrap(), "1");
        let seq: SequenceNumber = serde_json::from_str("7").unwrap();
        assert_eq!(seq.value(), 7);
        assert!(serde_json::from_str::<SequenceNumber>("0").is_err());
    }

    #[test]
    fn test_page_id_parse_round_trip() {
        let id = PageId::random();
        let parsed: PageId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!("not-a-uuid".parse::<PageId>().is_err());
    }
}
