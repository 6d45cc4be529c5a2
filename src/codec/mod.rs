//! Diff codec
//!
//! Binary serialization of edit scripts and delta records.
//!
//! Frames are self-describing (magic + format version), length-prefixed in
//! little-endian and sealed with a trailing CRC32. Decoding either returns a
//! fully valid value or fails with `PV_CORRUPT_DIFF`; a partially decoded
//! script is never returned.
//!
//! `decode(encode(s)) == s` for every script `s`.
//!
//! Stored bytes can additionally be gzip-compressed; see [`compress()`].

mod checksum;
mod compress;
mod delta;
mod frame;
mod script;

pub use checksum::{compute_checksum, verify_checksum};
pub use compress::{
    compress, compression_ratio, decompress, is_compressed, DEFAULT_COMPRESSION_LEVEL,
    GZIP_MAGIC, MAX_COMPRESSION_LEVEL, MIN_COMPRESSION_LEVEL,
};
pub use delta::{encoded_delta_len, DeltaFrame, DELTA_MAGIC};
pub use script::{decode, encode, encoded_len, SCRIPT_FORMAT_VERSION, SCRIPT_MAGIC};

use crate::diff::EditScript;
use crate::errors::VersionResult;

/// Encode a delta (base sequence number + script) into a delta frame.
pub fn encode_delta(base_sequence_number: u64, script: &EditScript) -> VersionResult<Vec<u8>> {
    DeltaFrame::new(base_sequence_number, script.clone()).encode()
}

/// Decode a delta frame into its base sequence number and script.
pub fn decode_delta(data: &[u8]) -> VersionResult<(u64, EditScript)> {
    let frame = DeltaFrame::decode(data)?;
    Ok((frame.base_sequence_number, frame.script))
}
