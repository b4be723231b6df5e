//! Bit/byte conversion helpers shared across the pipeline.
//!
//! The whole receive chain uses the MSB-first convention: bit `j` of byte
//! `i` lands at position `i * 8 + j` of the unpacked stream.

/// Expand packed bytes into one 0/1 octet per bit, MSB first.
pub fn unpack_bits(bytes: &[u8]) -> Vec<u8> {
    bytes
        .iter()
        .flat_map(|byte| (0..8).rev().map(move |bit| (byte >> bit) & 1))
        .collect()
}

/// Collapse unpacked bits into bytes, MSB first.
///
/// Trailing bits that do not fill a whole byte are dropped, which is how the
/// frame layer realigns the stream to 8-bit boundaries.
pub fn pack_bits(bits: &[u8]) -> Vec<u8> {
    bits.chunks_exact(8)
        .map(|chunk| chunk.iter().fold(0u8, |acc, &b| (acc << 1) | (b & 1)))
        .collect()
}
