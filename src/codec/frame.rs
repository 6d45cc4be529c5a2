//! Bounds-checked frame reader
//!
//! Every read reports the byte offset it failed at, so a corrupt-diff error
//! can say where the frame went wrong.

use crate::errors::{VersionError, VersionResult};

pub(crate) struct FrameReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> FrameReader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    #[inline]
    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub(crate) fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub(crate) fn take(&mut self, len: usize, what: &str) -> VersionResult<&'a [u8]> {
        if self.remaining() < len {
            return Err(VersionError::corrupt_diff_at_offset(
                self.pos,
                format!(
                    "truncated {}: need {} bytes, {} remain",
                    what,
                    len,
                    self.remaining()
                ),
            ));
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    pub(crate) fn read_u8(&mut self, what: &str) -> VersionResult<u8> {
        Ok(self.take(1, what)?[0])
    }

    pub(crate) fn read_u32(&mut self, what: &str) -> VersionResult<u32> {
        let bytes = self.take(4, what)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub(crate) fn read_u64(&mut self, what: &str) -> VersionResult<u64> {
        let bytes = self.take(8, what)?;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(bytes);
        Ok(u64::from_le_bytes(buf))
    }
}

/// Split a frame into (body, stored checksum) and verify it.
pub(crate) fn verify_frame<'a>(
    data: &'a [u8],
    min_len: usize,
    what: &str,
) -> VersionResult<&'a [u8]> {
    if data.len() < min_len {
        return Err(VersionError::corrupt_diff(format!(
            "{} too short: {} bytes, minimum {}",
            what,
            data.len(),
            min_len
        )));
    }
    let checksum_offset = data.len() - 4;
    let stored = u32::from_le_bytes([
        data[checksum_offset],
        data[checksum_offset + 1],
        data[checksum_offset + 2],
        data[checksum_offset + 3],
    ]);
    let body = &data[..checksum_offset];
    let computed = super::checksum::compute_checksum(body);
    if computed != stored {
        return Err(VersionError::corrupt_diff_at_offset(
            checksum_offset,
            format!(
                "{} checksum mismatch: computed {:08x}, stored {:08x}",
                what, computed, stored
            ),
        ));
    }
    Ok(body)
}

/// Append a little-endian u32 length, rejecting lengths that do not fit.
pub(crate) fn put_len(buf: &mut Vec<u8>, len: usize, what: &str) -> VersionResult<()> {
    let len = u32::try_from(len).map_err(|_| {
        VersionError::invalid_argument(format!("{} length {} exceeds u32::MAX", what, len))
    })?;
    buf.extend_from_slice(&len.to_le_bytes());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::VersionErrorCode;

    #[test]
    fn test_reader_reads_little_endian() {
        let data = [0x01, 0x02, 0x00, 0x00, 0x00, 0xff];
        let mut reader = FrameReader::new(&data);
        assert_eq!(reader.read_u8("a").unwrap(), 1);
        assert_eq!(reader.read_u32("b").unwrap(), 2);
        assert_eq!(reader.remaining(), 1);
        assert_eq!(reader.position(), 5);
    }

    #[test]
    fn test_reader_truncation_reports_offset() {
        let data = [0x01, 0x02];
        let mut reader = FrameReader::new(&data);
        reader.read_u8("tag").unwrap();
        let err = reader.read_u32("length").unwrap_err();
        assert_eq!(err.code(), VersionErrorCode::CorruptDiff);
        assert_eq!(err.details(), Some("byte_offset: 1"));
        assert!(err.message().contains("truncated length"));
    }

    #[test]
    fn test_verify_frame_rejects_bad_checksum() {
        let mut frame = b"body".to_vec();
        let checksum = super::super::checksum::compute_checksum(&frame);
        frame.extend_from_slice(&checksum.to_le_bytes());
        assert_eq!(verify_frame(&frame, 4, "frame").unwrap(), b"body");

        frame[0] ^= 0x20;
        let err = verify_frame(&frame, 4, "frame").unwrap_err();
        assert!(err.message().contains("checksum mismatch"));
    }
}
