//! CCSDS Reed-Solomon (255,223) codec over the dual-basis field.
//!
//! The code is defined over GF(2^8) with field generator polynomial 0x187,
//! first consecutive root 112, primitive element 11, and 32 generator
//! roots, correcting up to 16 symbol errors per codeword. On the wire the
//! symbols use the Berlekamp dual basis; a fixed 256-entry table pair maps
//! to and from the conventional alpha basis around the decoder. Frames
//! interleave five codewords at depth 5.
//!
//! The decoder is the classic syndrome / Berlekamp-Massey / Chien / Forney
//! chain, errors-only. A systematic encoder over the same context exists so
//! round-trip tests and synthetic captures can produce valid codewords.

/// Symbol width in bits.
pub const SYMBOL_BITS: u32 = 8;
/// Field generator polynomial.
pub const FIELD_POLY: u32 = 0x187;
/// First consecutive root of the code generator, index form.
pub const FIRST_ROOT: usize = 112;
/// Primitive element used to generate the code roots, index form.
pub const PRIMITIVE: usize = 11;
/// Number of generator roots = parity symbols per codeword.
pub const NROOTS: usize = 32;
/// Codeword length in symbols.
pub const CODEWORD_LEN: usize = 255;
/// Data symbols per codeword.
pub const DATA_LEN: usize = CODEWORD_LEN - NROOTS;
/// Interleave depth of the frame format.
pub const INTERLEAVE: usize = 5;

const NN: usize = CODEWORD_LEN;
/// Marker for log(0) in index-form arithmetic.
const A0: usize = NN;

/// Wire (dual basis) to conventional alpha-basis symbol mapping.
const DUAL_TO_CONVENTIONAL: [u8; 256] = [
    0x00, 0x98, 0x03, 0x9B, 0x56, 0xCE, 0x55, 0xCD,
    0x88, 0x10, 0x8B, 0x13, 0xDE, 0x46, 0xDD, 0x45,
    0x5A, 0xC2, 0x59, 0xC1, 0x0C, 0x94, 0x0F, 0x97,
    0xD2, 0x4A, 0xD1, 0x49, 0x84, 0x1C, 0x87, 0x1F,
    0x17, 0x8F, 0x14, 0x8C, 0x41, 0xD9, 0x42, 0xDA,
    0x9F, 0x07, 0x9C, 0x04, 0xC9, 0x51, 0xCA, 0x52,
    0x4D, 0xD5, 0x4E, 0xD6, 0x1B, 0x83, 0x18, 0x80,
    0xC5, 0x5D, 0xC6, 0x5E, 0x93, 0x0B, 0x90, 0x08,
    0x5F, 0xC7, 0x5C, 0xC4, 0x09, 0x91, 0x0A, 0x92,
    0xD7, 0x4F, 0xD4, 0x4C, 0x81, 0x19, 0x82, 0x1A,
    0x05, 0x9D, 0x06, 0x9E, 0x53, 0xCB, 0x50, 0xC8,
    0x8D, 0x15, 0x8E, 0x16, 0xDB, 0x43, 0xD8, 0x40,
    0x48, 0xD0, 0x4B, 0xD3, 0x1E, 0x86, 0x1D, 0x85,
    0xC0, 0x58, 0xC3, 0x5B, 0x96, 0x0E, 0x95, 0x0D,
    0x12, 0x8A, 0x11, 0x89, 0x44, 0xDC, 0x47, 0xDF,
    0x9A, 0x02, 0x99, 0x01, 0xCC, 0x54, 0xCF, 0x57,
    0xED, 0x75, 0xEE, 0x76, 0xBB, 0x23, 0xB8, 0x20,
    0x65, 0xFD, 0x66, 0xFE, 0x33, 0xAB, 0x30, 0xA8,
    0xB7, 0x2F, 0xB4, 0x2C, 0xE1, 0x79, 0xE2, 0x7A,
    0x3F, 0xA7, 0x3C, 0xA4, 0x69, 0xF1, 0x6A, 0xF2,
    0xFA, 0x62, 0xF9, 0x61, 0xAC, 0x34, 0xAF, 0x37,
    0x72, 0xEA, 0x71, 0xE9, 0x24, 0xBC, 0x27, 0xBF,
    0xA0, 0x38, 0xA3, 0x3B, 0xF6, 0x6E, 0xF5, 0x6D,
    0x28, 0xB0, 0x2B, 0xB3, 0x7E, 0xE6, 0x7D, 0xE5,
    0xB2, 0x2A, 0xB1, 0x29, 0xE4, 0x7C, 0xE7, 0x7F,
    0x3A, 0xA2, 0x39, 0xA1, 0x6C, 0xF4, 0x6F, 0xF7,
    0xE8, 0x70, 0xEB, 0x73, 0xBE, 0x26, 0xBD, 0x25,
    0x60, 0xF8, 0x63, 0xFB, 0x36, 0xAE, 0x35, 0xAD,
    0xA5, 0x3D, 0xA6, 0x3E, 0xF3, 0x6B, 0xF0, 0x68,
    0x2D, 0xB5, 0x2E, 0xB6, 0x7B, 0xE3, 0x78, 0xE0,
    0xFF, 0x67, 0xFC, 0x64, 0xA9, 0x31, 0xAA, 0x32,
    0x77, 0xEF, 0x74, 0xEC, 0x21, 0xB9, 0x22, 0xBA,
];
/// Conventional alpha-basis to wire (dual basis) symbol mapping.
const CONVENTIONAL_TO_DUAL: [u8; 256] = [
    0x00, 0x7B, 0x79, 0x02, 0x2B, 0x50, 0x52, 0x29,
    0x3F, 0x44, 0x46, 0x3D, 0x14, 0x6F, 0x6D, 0x16,
    0x09, 0x72, 0x70, 0x0B, 0x22, 0x59, 0x5B, 0x20,
    0x36, 0x4D, 0x4F, 0x34, 0x1D, 0x66, 0x64, 0x1F,
    0x87, 0xFC, 0xFE, 0x85, 0xAC, 0xD7, 0xD5, 0xAE,
    0xB8, 0xC3, 0xC1, 0xBA, 0x93, 0xE8, 0xEA, 0x91,
    0x8E, 0xF5, 0xF7, 0x8C, 0xA5, 0xDE, 0xDC, 0xA7,
    0xB1, 0xCA, 0xC8, 0xB3, 0x9A, 0xE1, 0xE3, 0x98,
    0x5F, 0x24, 0x26, 0x5D, 0x74, 0x0F, 0x0D, 0x76,
    0x60, 0x1B, 0x19, 0x62, 0x4B, 0x30, 0x32, 0x49,
    0x56, 0x2D, 0x2F, 0x54, 0x7D, 0x06, 0x04, 0x7F,
    0x69, 0x12, 0x10, 0x6B, 0x42, 0x39, 0x3B, 0x40,
    0xD8, 0xA3, 0xA1, 0xDA, 0xF3, 0x88, 0x8A, 0xF1,
    0xE7, 0x9C, 0x9E, 0xE5, 0xCC, 0xB7, 0xB5, 0xCE,
    0xD1, 0xAA, 0xA8, 0xD3, 0xFA, 0x81, 0x83, 0xF8,
    0xEE, 0x95, 0x97, 0xEC, 0xC5, 0xBE, 0xBC, 0xC7,
    0x37, 0x4C, 0x4E, 0x35, 0x1C, 0x67, 0x65, 0x1E,
    0x08, 0x73, 0x71, 0x0A, 0x23, 0x58, 0x5A, 0x21,
    0x3E, 0x45, 0x47, 0x3C, 0x15, 0x6E, 0x6C, 0x17,
    0x01, 0x7A, 0x78, 0x03, 0x2A, 0x51, 0x53, 0x28,
    0xB0, 0xCB, 0xC9, 0xB2, 0x9B, 0xE0, 0xE2, 0x99,
    0x8F, 0xF4, 0xF6, 0x8D, 0xA4, 0xDF, 0xDD, 0xA6,
    0xB9, 0xC2, 0xC0, 0xBB, 0x92, 0xE9, 0xEB, 0x90,
    0x86, 0xFD, 0xFF, 0x84, 0xAD, 0xD6, 0xD4, 0xAF,
    0x68, 0x13, 0x11, 0x6A, 0x43, 0x38, 0x3A, 0x41,
    0x57, 0x2C, 0x2E, 0x55, 0x7C, 0x07, 0x05, 0x7E,
    0x61, 0x1A, 0x18, 0x63, 0x4A, 0x31, 0x33, 0x48,
    0x5E, 0x25, 0x27, 0x5C, 0x75, 0x0E, 0x0C, 0x77,
    0xEF, 0x94, 0x96, 0xED, 0xC4, 0xBF, 0xBD, 0xC6,
    0xD0, 0xAB, 0xA9, 0xD2, 0xFB, 0x80, 0x82, 0xF9,
    0xE6, 0x9D, 0x9F, 0xE4, 0xCD, 0xB6, 0xB4, 0xCF,
    0xD9, 0xA2, 0xA0, 0xDB, 0xF2, 0x89, 0x8B, 0xF0,
];

/// Immutable Reed-Solomon decoding context.
#[derive(Debug, Clone)]
pub struct ReedSolomon {
    /// Antilog table: alpha_to[i] = alpha^i, with alpha_to[A0] = 0.
    alpha_to: [u8; NN + 1],
    /// Log table: index_of[x] = log_alpha(x), with index_of[0] = A0.
    index_of: [u8; NN + 1],
    /// Code generator polynomial in index form.
    genpoly: [usize; NROOTS + 1],
    /// prim-th root of 1, used to map Chien roots to positions.
    iprim: usize,
}

fn modnn(x: usize) -> usize {
    x % NN
}

impl ReedSolomon {
    /// Build the CCSDS (255,223) context. The parameters are fixed by the
    /// standard, so construction cannot fail.
    pub fn new() -> Self {
        let mut alpha_to = [0u8; NN + 1];
        let mut index_of = [0u8; NN + 1];

        index_of[0] = A0 as u8;
        alpha_to[A0] = 0;
        let mut sr: usize = 1;
        for i in 0..NN {
            index_of[sr] = i as u8;
            alpha_to[i] = sr as u8;
            sr <<= 1;
            if sr & 0x100 != 0 {
                sr ^= FIELD_POLY as usize;
            }
            sr &= NN;
        }
        debug_assert_eq!(sr, 1, "field generator polynomial must be primitive");

        // prim-th root of 1, for converting Chien roots to byte positions.
        let mut iprim = 1;
        while iprim % PRIMITIVE != 0 {
            iprim += NN;
        }
        iprim /= PRIMITIVE;

        // Form the generator polynomial from its roots.
        let mut gen = [0usize; NROOTS + 1];
        gen[0] = 1;
        let mut root = FIRST_ROOT * PRIMITIVE;
        for i in 0..NROOTS {
            gen[i + 1] = 1;
            for j in (1..=i).rev() {
                if gen[j] != 0 {
                    gen[j] = gen[j - 1]
                        ^ alpha_to[modnn(index_of[gen[j]] as usize + root)] as usize;
                } else {
                    gen[j] = gen[j - 1];
                }
            }
            gen[0] = alpha_to[modnn(index_of[gen[0]] as usize + root)] as usize;
            root += PRIMITIVE;
        }
        let mut genpoly = [0usize; NROOTS + 1];
        for (g, out) in gen.iter().zip(genpoly.iter_mut()) {
            *out = index_of[*g] as usize;
        }

        Self {
            alpha_to,
            index_of,
            genpoly,
            iprim,
        }
    }

    /// Systematic encode in the conventional basis: 223 data symbols in,
    /// 32 parity symbols out.
    fn encode_conventional(&self, data: &[u8]) -> [u8; NROOTS] {
        debug_assert_eq!(data.len(), DATA_LEN);
        let mut parity = [0u8; NROOTS];
        for &d in data {
            let feedback = self.index_of[(d ^ parity[0]) as usize] as usize;
            if feedback != A0 {
                for j in 1..NROOTS {
                    parity[j] ^=
                        self.alpha_to[modnn(feedback + self.genpoly[NROOTS - j])];
                }
            }
            parity.copy_within(1.., 0);
            parity[NROOTS - 1] = if feedback != A0 {
                self.alpha_to[modnn(feedback + self.genpoly[0])]
            } else {
                0
            };
        }
        parity
    }

    /// Encode one wire-format codeword: dual-basis data in, dual-basis
    /// parity out.
    pub fn encode(&self, data_dual: &[u8]) -> [u8; NROOTS] {
        debug_assert_eq!(data_dual.len(), DATA_LEN);
        let mut conv = [0u8; DATA_LEN];
        for (c, &d) in conv.iter_mut().zip(data_dual.iter()) {
            *c = DUAL_TO_CONVENTIONAL[d as usize];
        }
        let parity = self.encode_conventional(&conv);
        let mut out = [0u8; NROOTS];
        for (o, &p) in out.iter_mut().zip(parity.iter()) {
            *o = CONVENTIONAL_TO_DUAL[p as usize];
        }
        out
    }

    /// Decode one 255-symbol codeword in the conventional basis, correcting
    /// it in place. Returns the number of corrected symbols, or `None` when
    /// the word is uncorrectable.
    fn decode_conventional(&self, data: &mut [u8]) -> Option<usize> {
        debug_assert_eq!(data.len(), CODEWORD_LEN);

        // Syndromes: evaluate the received polynomial at the code roots.
        let mut s = [0usize; NROOTS];
        for syn in s.iter_mut() {
            *syn = data[0] as usize;
        }
        for &r in data[1..].iter() {
            for (i, syn) in s.iter_mut().enumerate() {
                if *syn == 0 {
                    *syn = r as usize;
                } else {
                    *syn = (r
                        ^ self.alpha_to
                            [modnn(self.index_of[*syn] as usize + (FIRST_ROOT + i) * PRIMITIVE)])
                        as usize;
                }
            }
        }

        let mut syn_error = 0usize;
        for syn in s.iter_mut() {
            syn_error |= *syn;
            *syn = self.index_of[*syn] as usize;
        }
        if syn_error == 0 {
            // Already a codeword.
            return Some(0);
        }

        // Berlekamp-Massey: find the error locator polynomial lambda(x).
        let mut lambda = [0usize; NROOTS + 1];
        lambda[0] = 1;
        let mut b = [A0; NROOTS + 1];
        b[0] = 0; // index_of[1]
        let mut el = 0usize;

        for r in 1..=NROOTS {
            let mut discr = 0usize;
            for i in 0..r {
                if lambda[i] != 0 && s[r - i - 1] != A0 {
                    discr ^=
                        self.alpha_to[modnn(self.index_of[lambda[i]] as usize + s[r - i - 1])]
                            as usize;
                }
            }
            let discr = self.index_of[discr] as usize;
            if discr == A0 {
                // B(x) <- x * B(x)
                b.copy_within(0..NROOTS, 1);
                b[0] = A0;
            } else {
                // T(x) <- lambda(x) - discr * x * B(x)
                let mut t = [0usize; NROOTS + 1];
                t[0] = lambda[0];
                for i in 0..NROOTS {
                    t[i + 1] = if b[i] != A0 {
                        lambda[i + 1] ^ self.alpha_to[modnn(discr + b[i])] as usize
                    } else {
                        lambda[i + 1]
                    };
                }
                if 2 * el <= r - 1 {
                    el = r - el;
                    for (bi, &li) in b.iter_mut().zip(lambda.iter()) {
                        *bi = if li == 0 {
                            A0
                        } else {
                            modnn(self.index_of[li] as usize + NN - discr)
                        };
                    }
                } else {
                    b.copy_within(0..NROOTS, 1);
                    b[0] = A0;
                }
                lambda = t;
            }
        }

        // Convert lambda to index form and find its degree.
        let mut deg_lambda = 0usize;
        let mut lambda_idx = [A0; NROOTS + 1];
        for (i, &l) in lambda.iter().enumerate() {
            lambda_idx[i] = self.index_of[l] as usize;
            if lambda_idx[i] != A0 {
                deg_lambda = i;
            }
        }

        // Chien search for the roots of lambda(x).
        let mut reg = [A0; NROOTS + 1];
        reg[1..].copy_from_slice(&lambda_idx[1..]);
        let mut roots = [0usize; NROOTS];
        let mut locs = [0usize; NROOTS];
        let mut count = 0usize;
        let mut k = self.iprim - 1;
        for i in 1..=NN {
            let mut q = 1usize;
            for j in (1..=deg_lambda).rev() {
                if reg[j] != A0 {
                    reg[j] = modnn(reg[j] + j);
                    q ^= self.alpha_to[reg[j]] as usize;
                }
            }
            if q == 0 {
                roots[count] = i;
                locs[count] = k;
                count += 1;
                if count == deg_lambda {
                    break;
                }
            }
            k = modnn(k + self.iprim);
        }
        if deg_lambda != count {
            // deg(lambda) != number of roots: uncorrectable.
            return None;
        }

        // Error evaluator omega(x) = s(x) * lambda(x) mod x^NROOTS.
        let deg_omega = deg_lambda - 1;
        let mut omega = [A0; NROOTS + 1];
        for (i, om) in omega.iter_mut().enumerate().take(deg_omega + 1) {
            let mut tmp = 0usize;
            for j in (0..=i).rev() {
                if s[i - j] != A0 && lambda_idx[j] != A0 {
                    tmp ^= self.alpha_to[modnn(s[i - j] + lambda_idx[j])] as usize;
                }
            }
            *om = self.index_of[tmp] as usize;
        }

        // Forney: error magnitude at each located position.
        for j in (0..count).rev() {
            let mut num1 = 0usize;
            for i in (0..=deg_omega).rev() {
                if omega[i] != A0 {
                    num1 ^= self.alpha_to[modnn(omega[i] + i * roots[j])] as usize;
                }
            }
            let num2 = self.alpha_to[modnn(roots[j] * (FIRST_ROOT - 1) + NN)] as usize;
            let mut den = 0usize;
            let mut i = deg_lambda.min(NROOTS - 1) & !1;
            loop {
                if lambda_idx[i + 1] != A0 {
                    den ^= self.alpha_to[modnn(lambda_idx[i + 1] + i * roots[j])] as usize;
                }
                if i < 2 {
                    break;
                }
                i -= 2;
            }
            if num1 != 0 {
                data[locs[j]] ^= self.alpha_to[modnn(
                    self.index_of[num1] as usize + self.index_of[num2] as usize + NN
                        - self.index_of[den] as usize,
                )];
            }
        }
        Some(count)
    }

    /// Decode one 255-byte wire-format (dual basis) codeword in place.
    pub fn decode(&self, codeword_dual: &mut [u8]) -> Option<usize> {
        debug_assert_eq!(codeword_dual.len(), CODEWORD_LEN);
        let mut conv = [0u8; CODEWORD_LEN];
        for (c, &d) in conv.iter_mut().zip(codeword_dual.iter()) {
            *c = DUAL_TO_CONVENTIONAL[d as usize];
        }
        let corrected = self.decode_conventional(&mut conv)?;
        for (d, &c) in codeword_dual.iter_mut().zip(conv.iter()) {
            *d = CONVENTIONAL_TO_DUAL[c as usize];
        }
        Some(corrected)
    }

    /// Decode an interleaved frame block of `INTERLEAVE * CODEWORD_LEN`
    /// bytes in place: de-interleave at stride 5, decode each codeword,
    /// re-interleave the corrected symbols. Returns the total number of
    /// corrected symbols, or `None` when any codeword is uncorrectable.
    pub fn decode_block(&self, block: &mut [u8]) -> Option<usize> {
        debug_assert_eq!(block.len(), INTERLEAVE * CODEWORD_LEN);
        let mut total = 0usize;
        let mut failed = false;
        for lane in 0..INTERLEAVE {
            let mut codeword = [0u8; CODEWORD_LEN];
            for (j, c) in codeword.iter_mut().enumerate() {
                *c = block[j * INTERLEAVE + lane];
            }
            match self.decode(&mut codeword) {
                Some(corrected) => {
                    total += corrected;
                    for (j, &c) in codeword.iter().enumerate() {
                        block[j * INTERLEAVE + lane] = c;
                    }
                }
                None => failed = true,
            }
        }
        if failed {
            None
        } else {
            Some(total)
        }
    }

    /// Encode `INTERLEAVE * DATA_LEN` data bytes into the 160 parity bytes
    /// of an interleaved frame block.
    pub fn encode_block(&self, data: &[u8]) -> Vec<u8> {
        debug_assert_eq!(data.len(), INTERLEAVE * DATA_LEN);
        let mut parity = vec![0u8; INTERLEAVE * NROOTS];
        for lane in 0..INTERLEAVE {
            let mut lane_data = [0u8; DATA_LEN];
            for (j, d) in lane_data.iter_mut().enumerate() {
                *d = data[j * INTERLEAVE + lane];
            }
            let lane_parity = self.encode(&lane_data);
            for (j, &p) in lane_parity.iter().enumerate() {
                parity[j * INTERLEAVE + lane] = p;
            }
        }
        parity
    }
}

impl Default for ReedSolomon {
    fn default() -> Self {
        Self::new()
    }
}
