//! Delta record frame
//!
//! The persisted form of a delta: identifies itself as a delta, names the
//! base version it applies to, and embeds the edit script frame.
//!
//! ```text
//! +--------------------+
//! | Magic "PVDL"       | (4 bytes)
//! +--------------------+
//! | Base Sequence      | (u64 LE)
//! +--------------------+
//! | Script Length      | (u32 LE)
//! +--------------------+
//! | Script Frame       | (see codec::script)
//! +--------------------+
//! | Checksum           | (u32 LE, CRC32 over all preceding bytes)
//! +--------------------+
//! ```

use crate::diff::EditScript;
use crate::errors::{VersionError, VersionResult};

use super::frame::{put_len, verify_frame, FrameReader};

/// Frame magic for a delta record.
pub const DELTA_MAGIC: [u8; 4] = *b"PVDL";

const HEADER_LEN: usize = 4 + 8 + 4;
const CHECKSUM_LEN: usize = 4;

/// Exact byte length of the delta frame for `script`, without encoding.
pub fn encoded_delta_len(script: &EditScript) -> usize {
    HEADER_LEN + super::script::encoded_len(script) + CHECKSUM_LEN
}

/// A decoded delta frame: base version plus the script to apply to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeltaFrame {
    pub base_sequence_number: u64,
    pub script: EditScript,
}

impl DeltaFrame {
    pub fn new(base_sequence_number: u64, script: EditScript) -> Self {
        Self {
            base_sequence_number,
            script,
        }
    }

    /// Serialize the frame.
    pub fn encode(&self) -> VersionResult<Vec<u8>> {
        let script = super::script::encode(&self.script)?;

        let mut buf = Vec::with_capacity(HEADER_LEN + script.len() + CHECKSUM_LEN);
        buf.extend_from_slice(&DELTA_MAGIC);
        buf.extend_from_slice(&self.base_sequence_number.to_le_bytes());
        put_len(&mut buf, script.len(), "script frame")?;
        buf.extend_from_slice(&script);

        let checksum = super::checksum::compute_checksum(&buf);
        buf.extend_from_slice(&checksum.to_le_bytes());
        Ok(buf)
    }

    /// Deserialize and validate a frame.
    pub fn decode(data: &[u8]) -> VersionResult<Self> {
        let body = verify_frame(data, HEADER_LEN + CHECKSUM_LEN, "delta frame")?;
        let mut reader = FrameReader::new(body);

        let magic = reader.take(4, "magic")?;
        if magic != DELTA_MAGIC {
            return Err(VersionError::corrupt_diff_at_offset(
                0,
                format!("bad delta magic {:02x?}", magic),
            ));
        }

        let base_sequence_number = reader.read_u64("base sequence number")?;
        if base_sequence_number == 0 {
            return Err(VersionError::corrupt_diff_at_offset(
                4,
                "delta names base sequence number 0",
            ));
        }

        let script_len = reader.read_u32("script length")? as usize;
        let script_offset = reader.position();
        let script_bytes = reader.take(script_len, "script frame")?;
        if reader.remaining() != 0 {
            return Err(VersionError::corrupt_diff_at_offset(
                reader.position(),
                format!("{} trailing bytes after script frame", reader.remaining()),
            ));
        }

        let script = super::script::decode(script_bytes).map_err(|e| {
            e.context("embedded script")
                .with_details(format!("byte_offset: {}", script_offset))
        })?;

        Ok(Self {
            base_sequence_number,
            script,
        })
    }
}
