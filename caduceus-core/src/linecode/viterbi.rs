//! Interface to an external rate-1/2 convolutional decoder.
//!
//! The receive chain can hand the packed symbol stream to a Viterbi decoder
//! before line decoding. The decoder itself is an external collaborator;
//! this module only fixes the contract.

/// First generator polynomial (octal 0117).
pub const POLY_G1: u8 = 0x4F;
/// Second generator polynomial (octal 0155).
pub const POLY_G2: u8 = 0x6D;
/// Constraint length K.
pub const CONSTRAINT_LENGTH: usize = 7;

/// A hard-decision rate-1/2, K=7 Viterbi decoder.
///
/// `packed_in` holds `2 * n_out + tail` bytes of channel symbols;
/// implementations return exactly `n_out` decoded bytes.
pub trait ViterbiDecoder {
    fn decode(&mut self, packed_in: &[u8], n_out: usize) -> Vec<u8>;
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::ViterbiDecoder;

    /// A stand-in collaborator that returns the first half of its input,
    /// used to exercise the chain plumbing without a real decoder.
    pub struct PassthroughViterbi;

    impl ViterbiDecoder for PassthroughViterbi {
        fn decode(&mut self, packed_in: &[u8], n_out: usize) -> Vec<u8> {
            packed_in[..n_out.min(packed_in.len())].to_vec()
        }
    }
}
