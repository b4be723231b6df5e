//! NRZ-M differential line coding.
//!
//! On the wire a 1 is a transition and a 0 is no transition. The previous-bit
//! seed starts at 0 and carries across the whole buffer; there is no reset
//! at byte boundaries.

/// Decode an NRZ-M bit stream: `o[i] = (b[i] ^ b[i-1]) ^ invert`, `b[-1] = 0`.
pub fn decode(bits: &[u8], invert: bool) -> Vec<u8> {
    let inv = u8::from(invert);
    let mut prev = 0u8;
    bits.iter()
        .map(|&b| {
            let out = (b ^ prev) ^ inv;
            prev = b;
            out
        })
        .collect()
}

/// Encode a bit stream into NRZ-M. Inverse of [`decode`] for `invert = false`.
pub fn encode(bits: &[u8], invert: bool) -> Vec<u8> {
    let inv = u8::from(invert);
    let mut prev = 0u8;
    bits.iter()
        .map(|&b| {
            let out = (b ^ prev) ^ inv;
            prev = out;
            out
        })
        .collect()
}
