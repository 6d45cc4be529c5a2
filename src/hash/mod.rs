//! Content hashing for version integrity
//!
//! Every version record is tagged with the SHA-256 digest of its full
//! reconstructed text, regardless of whether it is stored as a snapshot or
//! a delta. Reads recompute the digest and refuse to return text that does
//! not match.
//!
//! Digests are rendered as 64 lowercase hex characters and compared in
//! constant time.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::errors::{VersionError, VersionResult};

/// Digest length in bytes.
pub const DIGEST_LEN: usize = 32;

/// SHA-256 digest of a text state.
#[derive(Clone, Copy)]
pub struct ContentHash([u8; DIGEST_LEN]);

impl ContentHash {
    /// Wrap raw digest bytes.
    pub fn from_bytes(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }

    /// Raw digest bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    /// Lowercase hex rendering.
    pub fn to_hex(&self) -> String {
        self.to_string()
    }

    /// Parse a 64-character hex digest.
    pub fn from_hex(hex: &str) -> VersionResult<Self> {
        if hex.len() != DIGEST_LEN * 2 || !hex.is_ascii() {
            return Err(VersionError::invalid_argument(format!(
                "content hash must be {} hex characters, got {:?}",
                DIGEST_LEN * 2,
                hex
            )));
        }
        let mut bytes = [0u8; DIGEST_LEN];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).map_err(|_| {
                VersionError::invalid_argument(format!("invalid hex in content hash: {:?}", hex))
            })?;
        }
        Ok(Self(bytes))
    }
}

impl PartialEq for ContentHash {
    fn eq(&self, other: &Self) -> bool {
        self.0.ct_eq(&other.0).into()
    }
}

impl Eq for ContentHash {}

impl std::hash::Hash for ContentHash {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::hash::Hash::hash(&self.0, state);
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", self)
    }
}

impl FromStr for ContentHash {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for ContentHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ContentHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Self::from_hex(&hex).map_err(|e| serde::de::Error::custom(e.message().to_string()))
    }
}

/// Computes the SHA-256 digest of a text state over its UTF-8 bytes.
///
/// Deterministic: the same text always produces the same digest.
pub fn hash(text: &str) -> ContentHash {
    let digest = Sha256::digest(text.as_bytes());
    let mut bytes = [0u8; DIGEST_LEN];
    bytes.copy_from_slice(&digest);
    ContentHash(bytes)
}

/// Returns true if `text` hashes to `expected`.
pub fn verify(text: &str, expected: &ContentHash) -> bool {
    hash(text) == *expected
}

/// Verify `text` against the hash recorded for `sequence`.
///
/// Fails with an integrity error naming the sequence number on mismatch.
pub fn verify_recorded(text: &str, expected: &ContentHash, sequence: u64) -> VersionResult<()> {
    let actual = hash(text);
    if actual != *expected {
        return Err(VersionError::integrity(sequence, expected, actual));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::VersionErrorCode;

    #[test]
    fn test_hash_deterministic() {
        assert_eq!(hash("page body"), hash("page body"));
    }

    #[test]
    fn test_known_digest() {
        assert_eq!(
            hash("").to_hex(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            hash("abc").to_hex(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_single_character_mutation_changes_digest() {
        let base = "The quick brown fox jumps over the lazy dog";
        let original = hash(base);
        for (i, _) in base.char_indices() {
            let mut mutated: Vec<char> = base.chars().collect();
            mutated[base[..i].chars().count()] = '#';
            let mutated: String = mutated.into_iter().collect();
            if mutated != base {
                assert_ne!(hash(&mutated), original, "collision at char {}", i);
            }
        }
    }

    #[test]
    fn test_hex_round_trip() {
        let h = hash("round trip");
        assert_eq!(ContentHash::from_hex(&h.to_hex()).unwrap(), h);
        assert_eq!(h.to_hex().parse::<ContentHash>().unwrap(), h);
    }

    #[test]
    fn test_from_hex_rejects_malformed() {
        assert!(ContentHash::from_hex("abc").is_err());
        assert!(ContentHash::from_hex(&"zz".repeat(32)).is_err());
        assert!(ContentHash::from_hex(&"é".repeat(32)).is_err());
    }

    #[test]
    fn test_verify_recorded() {
        let h = hash("content");
        assert!(verify("content", &h));
        assert!(verify_recorded("content", &h, 1).is_ok());

        let err = verify_recorded("tampered", &h, 3).unwrap_err();
        assert_eq!(err.code(), VersionErrorCode::Integrity);
        assert_eq!(err.details(), Some("sequence_number: 3"));
    }

    #[test]
    fn test_serde_as_hex_string() {
        let h = hash("serde");
        let json = serde_json::to_string(&h).unwrap();
        assert_eq!(json, format!("\"{}\"", h.to_hex()));
        let back: ContentHash = serde_json::from_str(&json).unwrap();
        assert_eq!(back, h);
    }
}
