//! Edit script frame
//!
//! ```text
//! +--------------------+
//! | Magic "PVES"       | (4 bytes)
//! +--------------------+
//! | Format Version     | (u8)
//! +--------------------+
//! | Operation Count    | (u32 LE)
//! +--------------------+
//! | Operation *        | tag (u8) | text length (u32 LE) | UTF-8 text
//! +--------------------+
//! | Checksum           | (u32 LE, CRC32 over all preceding bytes)
//! +--------------------+
//! ```
//!
//! Tags: 0 = KEEP, 1 = DELETE, 2 = INSERT. Text is never empty.

use crate::diff::{EditScript, Operation, OperationKind};
use crate::errors::{VersionError, VersionResult};

use super::frame::{put_len, verify_frame, FrameReader};

/// Frame magic for an encoded edit script.
pub const SCRIPT_MAGIC: [u8; 4] = *b"PVES";

/// Current script frame format version.
pub const SCRIPT_FORMAT_VERSION: u8 = 1;

const HEADER_LEN: usize = 4 + 1 + 4;
const CHECKSUM_LEN: usize = 4;
/// Smallest possible operation: tag + length + one byte of text.
const MIN_OPERATION_LEN: usize = 1 + 4 + 1;

/// Encode an edit script.
///
/// Fails only if an operation text or the operation count exceeds `u32::MAX`.
pub fn encode(script: &EditScript) -> VersionResult<Vec<u8>> {
    let mut buf = Vec::with_capacity(encoded_len(script));
    buf.extend_from_slice(&SCRIPT_MAGIC);
    buf.push(SCRIPT_FORMAT_VERSION);
    put_len(&mut buf, script.len(), "operation count")?;

    for op in script.operations() {
        buf.push(op.kind().as_u8());
        put_len(&mut buf, op.text().len(), "operation text")?;
        buf.extend_from_slice(op.text().as_bytes());
    }

    let checksum = super::checksum::compute_checksum(&buf);
    buf.extend_from_slice(&checksum.to_le_bytes());
    Ok(buf)
}

/// Exact byte length `encode` would produce, without encoding.
pub fn encoded_len(script: &EditScript) -> usize {
    HEADER_LEN
        + script
            .operations()
            .iter()
            .map(|op| 1 + 4 + op.text().len())
            .sum::<usize>()
        + CHECKSUM_LEN
}

/// Decode an edit script, rejecting anything malformed.
///
/// Nothing is returned unless the whole frame is valid: checksum, magic,
/// version, known tags, non-empty UTF-8 text, exact operation count and no
/// trailing bytes.
pub fn decode(data: &[u8]) -> VersionResult<EditScript> {
    let body = verify_frame(data, HEADER_LEN + CHECKSUM_LEN, "edit script frame")?;
    let mut reader = FrameReader::new(body);

    let magic = reader.take(4, "magic")?;
    if magic != SCRIPT_MAGIC {
        return Err(VersionError::corrupt_diff_at_offset(
            0,
            format!("bad edit script magic {:02x?}", magic),
        ));
    }

    let version = reader.read_u8("format version")?;
    if version != SCRIPT_FORMAT_VERSION {
        return Err(VersionError::corrupt_diff_at_offset(
            4,
            format!("unsupported edit script format version {}", version),
        ));
    }

    let count = reader.read_u32("operation count")? as usize;
    if count > reader.remaining() / MIN_OPERATION_LEN {
        return Err(VersionError::corrupt_diff_at_offset(
            5,
            format!(
                "operation count {} cannot fit in {} remaining bytes",
                count,
                reader.remaining()
            ),
        ));
    }

    let mut operations = Vec::with_capacity(count);
    for index in 0..count {
        let tag_offset = reader.position();
        let tag = reader.read_u8("operation tag")?;
        let kind = OperationKind::from_u8(tag).ok_or_else(|| {
            VersionError::corrupt_diff_at_offset(
                tag_offset,
                format!("operation {} has unknown tag {}", index, tag),
            )
        })?;

        let len_offset = reader.position();
        let len = reader.read_u32("operation text length")? as usize;
        if len == 0 {
            return Err(VersionError::corrupt_diff_at_offset(
                len_offset,
                format!("operation {} ({}) has empty text", index, kind.as_str()),
            ));
        }

        let text_offset = reader.position();
        let bytes = reader.take(len, "operation text")?;
        let text = std::str::from_utf8(bytes).map_err(|e| {
            VersionError::corrupt_diff_at_offset(
                text_offset + e.valid_up_to(),
                format!("operation {} text is not valid UTF-8", index),
            )
        })?;
        operations.push(Operation::new(kind, text.to_string()));
    }

    if reader.remaining() != 0 {
        return Err(VersionError::corrupt_diff_at_offset(
            reader.position(),
            format!("{} trailing bytes after last operation", reader.remaining()),
        ));
    }

    EditScript::from_operations(operations).map_err(|e| VersionError::corrupt_diff(e.message()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::checksum::compute_checksum;
    use crate::diff::diff;
    use crate::errors::VersionErrorCode;

    fn sample() -> EditScript {
        diff("Hello world", "Hello amdWiki")
    }

    /// Replace the trailing checksum so structural checks are reached.
    fn reseal(mut frame: Vec<u8>) -> Vec<u8> {
        frame.truncate(frame.len() - 4);
        let checksum = compute_checksum(&frame);
        frame.extend_from_slice(&checksum.to_le_bytes());
        frame
    }

    fn assert_corrupt(result: VersionResult<EditScript>, needle: &str) {
        let err = result.unwrap_err();
        assert_eq!(err.code(), VersionErrorCode::CorruptDiff, "{}", err);
        assert!(err.message().contains(needle), "{} !~ {}", err, needle);
    }

    #[test]
    fn test_round_trip() {
        let script = sample();
        let encoded = encode(&script).unwrap();
        assert_eq!(encoded.len(), encoded_len(&script));
        assert_eq!(decode(&encoded).unwrap(), script);
    }

    #[test]
    fn test_empty_script_round_trip() {
        let encoded = encode(&EditScript::empty()).unwrap();
        assert_eq!(encoded.len(), HEADER_LEN + CHECKSUM_LEN);
        assert!(decode(&encoded).unwrap().is_empty());
    }

    #[test]
    fn test_layout() {
        let encoded = encode(&sample()).unwrap();
        assert_eq!(&encoded[0..4], b"PVES");
        assert_eq!(encoded[4], SCRIPT_FORMAT_VERSION);
        assert_eq!(u32::from_le_bytes([encoded[5], encoded[6], encoded[7], encoded[8]]), 3);
        assert_eq!(encoded[9], OperationKind::Keep.as_u8());
    }

    #[test]
    fn test_rejects_too_short() {
        assert_corrupt(decode(&[]), "too short");
        assert_corrupt(decode(b"PVES"), "too short");
    }

    #[test]
    fn test_rejects_checksum_mismatch() {
        let mut encoded = encode(&sample()).unwrap();
        encoded[12] ^= 0x40;
        assert_corrupt(decode(&encoded), "checksum mismatch");
    }

    #[test]
    fn test_rejects_bad_magic() {
        let mut encoded = encode(&sample()).unwrap();
        encoded[0] = b'X';
        assert_corrupt(decode(&reseal(encoded)), "magic");
    }

    #[test]
    fn test_rejects_unknown_version() {
        let mut encoded = encode(&sample()).unwrap();
        encoded[4] = 9;
        assert_corrupt(decode(&reseal(encoded)), "format version 9");
    }

    #[test]
    fn test_rejects_unknown_tag() {
        let mut encoded = encode(&sample()).unwrap();
        encoded[9] = 7;
        let err = decode(&reseal(encoded)).unwrap_err();
        assert_eq!(err.code(), VersionErrorCode::CorruptDiff);
        assert!(err.message().contains("unknown tag 7"));
        assert_eq!(err.details(), Some("byte_offset: 9"));
    }

    #[test]
    fn test_rejects_empty_text() {
        let mut frame = Vec::new();
        frame.extend_from_slice(&SCRIPT_MAGIC);
        frame.push(SCRIPT_FORMAT_VERSION);
        frame.extend_from_slice(&1u32.to_le_bytes());
        frame.push(OperationKind::Insert.as_u8());
        frame.extend_from_slice(&0u32.to_le_bytes());
        frame.push(b'x'); // padding so the count check passes
        frame.extend_from_slice(&[0; 4]);
        assert_corrupt(decode(&reseal(frame)), "empty text");
    }

    #[test]
    fn test_rejects_truncated_text() {
        let mut encoded = encode(&sample()).unwrap();
        // Claim a longer first operation than the frame holds.
        encoded[10..14].copy_from_slice(&1000u32.to_le_bytes());
        assert_corrupt(decode(&reseal(encoded)), "truncated operation text");
    }

    #[test]
    fn test_rejects_inflated_count() {
        let mut encoded = encode(&sample()).unwrap();
        encoded[5..9].copy_from_slice(&u32::MAX.to_le_bytes());
        assert_corrupt(decode(&reseal(encoded)), "cannot fit");
    }

    #[test]
    fn test_rejects_trailing_bytes() {
        let mut encoded = encode(&sample()).unwrap();
        encoded[5..9].copy_from_slice(&2u32.to_le_bytes());
        assert_corrupt(decode(&reseal(encoded)), "trailing bytes");
    }

    #[test]
    fn test_rejects_invalid_utf8() {
        let script = EditScript::from_operations(vec![Operation::Insert("é".to_string())]).unwrap();
        let mut encoded = encode(&script).unwrap();
        // 'é' is C3 A9; break the continuation byte.
        let text_start = HEADER_LEN + 1 + 4;
        encoded[text_start + 1] = 0x41;
        assert_corrupt(decode(&reseal(encoded)), "not valid UTF-8");
    }

    #[test]
    fn test_every_single_byte_flip_is_rejected() {
        let encoded = encode(&sample()).unwrap();
        for i in 0..encoded.len() {
            let mut mutated = encoded.clone();
            mutated[i] ^= 0x01;
            assert!(decode(&mutated).is_err(), "flip at byte {} accepted", i);
        }
    }
}
