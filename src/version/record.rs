//! Version records
//!
//! A record is created exactly once, when an edit is recorded, and is
//! read-only afterwards. Two storage forms exist:
//!
//! - `Snapshot`: the full content of the version
//! - `Delta`: an edit script against a named earlier version
//!
//! Both carry the content hash of the *full* text of the version, so a
//! read can verify the end result whichever form was stored.
//!
//! In JSON a delta's edit script is the base64 of its codec frame, so a
//! damaged file is caught by the frame checksum on load.

use serde::{Deserialize, Serialize};

use super::{SequenceNumber, VersionMetadata};
use crate::codec;
use crate::diff::EditScript;
use crate::errors::{VersionError, VersionResult};
use crate::hash::{self, ContentHash};

/// A version stored as its full content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub sequence_number: SequenceNumber,
    pub content: String,
    pub content_hash: ContentHash,
    #[serde(default)]
    pub metadata: VersionMetadata,
}

impl Snapshot {
    /// Build a snapshot, hashing `content`.
    pub fn new(sequence_number: SequenceNumber, content: String, metadata: VersionMetadata) -> Self {
        let content_hash = hash::hash(&content);
        Self {
            sequence_number,
            content,
            content_hash,
            metadata,
        }
    }
}

/// A version stored as an edit script against `base_sequence_number`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delta {
    pub sequence_number: SequenceNumber,
    pub base_sequence_number: SequenceNumber,
    #[serde(with = "edit_script_frame")]
    pub edit_script: EditScript,
    pub content_hash: ContentHash,
    #[serde(default)]
    pub metadata: VersionMetadata,
}

impl Delta {
    /// Build a delta. The base must precede the delta itself.
    pub fn new(
        sequence_number: SequenceNumber,
        base_sequence_number: SequenceNumber,
        edit_script: EditScript,
        content_hash: ContentHash,
        metadata: VersionMetadata,
    ) -> VersionResult<Self> {
        let delta = Self {
            sequence_number,
            base_sequence_number,
            edit_script,
            content_hash,
            metadata,
        };
        delta.check_base()?;
        Ok(delta)
    }

    /// Fails unless the base sequence number is strictly lower.
    pub fn check_base(&self) -> VersionResult<()> {
        if self.base_sequence_number >= self.sequence_number {
            return Err(VersionError::invalid_argument(format!(
                "delta {} names base {}; a base must precede the delta",
                self.sequence_number, self.base_sequence_number
            ))
            .with_details(format!("sequence_number: {}", self.sequence_number)));
        }
        Ok(())
    }
}

/// Storage form of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Snapshot,
    Delta,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Snapshot => "snapshot",
            RecordKind::Delta => "delta",
        }
    }
}

/// One version of a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VersionRecord {
    Snapshot(Snapshot),
    Delta(Delta),
}

impl VersionRecord {
    #[inline]
    pub fn sequence_number(&self) -> SequenceNumber {
        match self {
            VersionRecord::Snapshot(s) => s.sequence_number,
            VersionRecord::Delta(d) => d.sequence_number,
        }
    }

    #[inline]
    pub fn content_hash(&self) -> &ContentHash {
        match self {
            VersionRecord::Snapshot(s) => &s.content_hash,
            VersionRecord::Delta(d) => &d.content_hash,
        }
    }

    pub fn metadata(&self) -> &VersionMetadata {
        match self {
            VersionRecord::Snapshot(s) => &s.metadata,
            VersionRecord::Delta(d) => &d.metadata,
        }
    }

    pub fn kind(&self) -> RecordKind {
        match self {
            VersionRecord::Snapshot(_) => RecordKind::Snapshot,
            VersionRecord::Delta(_) => RecordKind::Delta,
        }
    }

    #[inline]
    pub fn is_snapshot(&self) -> bool {
        matches!(self, VersionRecord::Snapshot(_))
    }

    /// Base of a delta; `None` for a snapshot.
    pub fn base_sequence_number(&self) -> Option<SequenceNumber> {
        match self {
            VersionRecord::Snapshot(_) => None,
            VersionRecord::Delta(d) => Some(d.base_sequence_number),
        }
    }

    /// Byte length of the full text of this version.
    ///
    /// Computed without reconstruction: a delta's target length is the sum
    /// of its Keep and Insert text.
    pub fn content_len(&self) -> usize {
        match self {
            VersionRecord::Snapshot(s) => s.content.len(),
            VersionRecord::Delta(d) => d.edit_script.target_len(),
        }
    }

    /// Bytes this record occupies in storage form: the content for a
    /// snapshot, the encoded delta frame for a delta.
    pub fn stored_len(&self) -> usize {
        match self {
            VersionRecord::Snapshot(s) => s.content.len(),
            VersionRecord::Delta(d) => codec::encoded_delta_len(&d.edit_script),
        }
    }

    /// The storage form itself; `stored_len()` bytes long.
    pub fn stored_bytes(&self) -> VersionResult<Vec<u8>> {
        match self {
            VersionRecord::Snapshot(s) => Ok(s.content.as_bytes().to_vec()),
            VersionRecord::Delta(d) => {
                codec::encode_delta(d.base_sequence_number.value(), &d.edit_script)
            }
        }
    }

    /// Size of the storage form after gzip at `level`.
    pub fn compressed_len(&self, level: u32) -> VersionResult<usize> {
        Ok(codec::compress(&self.stored_bytes()?, level)?.len())
    }
}

impl From<Snapshot> for VersionRecord {
    fn from(snapshot: Snapshot) -> Self {
        VersionRecord::Snapshot(snapshot)
    }
}

impl From<Delta> for VersionRecord {
    fn from(delta: Delta) -> Self {
        VersionRecord::Delta(delta)
    }
}

mod edit_script_frame {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::{de, Deserialize, Deserializer, Serializer};

    use crate::codec;
    use crate::diff::EditScript;

    pub fn serialize<S: Serializer>(script: &EditScript, serializer: S) -> Result<S::Ok, S::Error> {
        let frame = codec::encode(script).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&STANDARD.encode(frame))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<EditScript, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        let frame = STANDARD
            .decode(encoded.as_bytes())
            .map_err(|e| de::Error::custom(format!("edit script is not valid base64: {}", e)))?;
        codec::decode(&frame).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;

    use crate::diff::diff;
    use crate::errors::VersionErrorCode;

    fn seq(n: u64) -> SequenceNumber {
        SequenceNumber::new(n).unwrap()
    }

    fn sample_delta() -> Delta {
        let script = diff("Hello world", "Hello amdWiki");
        Delta::new(
            seq(2),
            seq(1),
            script,
            hash::hash("Hello amdWiki"),
            VersionMetadata::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_snapshot_hashes_content() {
        let snap = Snapshot::new(seq(1), "body".to_string(), VersionMetadata::default());
        assert_eq!(snap.content_hash, hash::hash("body"));
    }

    #[test]
    fn test_delta_base_must_precede() {
        let err = Delta::new(
            seq(2),
            seq(2),
            EditScript::empty(),
            hash::hash(""),
            VersionMetadata::default(),
        )
        .unwrap_err();
        assert_eq!(err.code(), VersionErrorCode::InvalidArgument);
    }

    #[test]
    fn test_record_accessors() {
        let record = VersionRecord::from(sample_delta());
        assert_eq!(record.sequence_number(), seq(2));
        assert_eq!(record.base_sequence_number(), Some(seq(1)));
        assert_eq!(record.kind(), RecordKind::Delta);
        assert!(!record.is_snapshot());
        assert_eq!(record.content_len(), "Hello amdWiki".len());
    }

    #[test]
    fn test_stored_bytes_match_stored_len() {
        let snapshot = VersionRecord::from(Snapshot::new(
            seq(1),
            "Hello world".to_string(),
            VersionMetadata::default(),
        ));
        let delta = VersionRecord::from(sample_delta());
        for record in [&snapshot, &delta] {
            assert_eq!(record.stored_bytes().unwrap().len(), record.stored_len());
        }
        let (base, script) = codec::decode_delta(&delta.stored_bytes().unwrap()).unwrap();
        assert_eq!(base, 1);
        assert_eq!(script.target_text(), "Hello amdWiki");
    }

    #[test]
    fn test_compressed_len_of_repetitive_snapshot() {
        let record = VersionRecord::from(Snapshot::new(
            seq(1),
            "same line\n".repeat(200),
            VersionMetadata::default(),
        ));
        let packed = record.compressed_len(codec::DEFAULT_COMPRESSION_LEVEL).unwrap();
        assert!(packed < record.stored_len() / 10);
    }

    #[test]
    fn test_json_round_trip() {
        let records = vec![
            VersionRecord::from(Snapshot::new(
                seq(1),
                "Hello world".to_string(),
                VersionMetadata::default(),
            )),
            VersionRecord::from(sample_delta()),
        ];
        let json = serde_json::to_string(&records).unwrap();
        let back: Vec<VersionRecord> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, records);
    }

    #[test]
    fn test_json_shape() {
        let value = serde_json::to_value(VersionRecord::from(sample_delta())).unwrap();
        assert_eq!(value["kind"], "delta");
        assert_eq!(value["sequence_number"], 2);
        assert_eq!(value["base_sequence_number"], 1);
        assert!(value["edit_script"].is_string());
    }

    #[test]
    fn test_json_rejects_damaged_script_frame() {
        let mut value = serde_json::to_value(VersionRecord::from(sample_delta())).unwrap();
        let encoded = value["edit_script"].as_str().unwrap().to_string();
        let mut frame = STANDARD.decode(encoded).unwrap();
        frame[10] ^= 0x01;
        value["edit_script"] = serde_json::Value::String(STANDARD.encode(&frame));
        let err = serde_json::from_value::<VersionRecord>(value).unwrap_err();
        assert!(err.to_string().contains("PV_CORRUPT_DIFF"));
    }

}
