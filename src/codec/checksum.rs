//! CRC32 frame checksums
//!
//! Every encoded frame ends with a CRC32 (IEEE) over all preceding bytes.
//! Any mismatch is treated as a corrupt diff; the frame is not parsed.

use crc32fast::Hasher;

/// Computes a CRC32 checksum over the provided data.
pub fn compute_checksum(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// Returns `true` if the checksum of `data` equals `expected`.
pub fn verify_checksum(data: &[u8], expected: u32) -> bool {
    compute_checksum(data) == expected
}
