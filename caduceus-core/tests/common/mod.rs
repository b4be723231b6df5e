//! Shared fixtures: synthetic CADU streams and baseband captures.
#![allow(dead_code)] // each test binary uses a different subset

use std::io::Write;
use std::path::PathBuf;

use caduceus_core::framing::{ASM, TM_FRAME_BYTES};
use caduceus_core::linecode::{nrzm, PnScrambler};
use caduceus_core::reed_solomon::ReedSolomon;
use caduceus_core::utils::unpack_bits;

/// Build one wire-format CADU: ASM + scrambled (payload + RS parity).
pub fn build_cadu(rs: &ReedSolomon, payload: &[u8]) -> Vec<u8> {
    assert_eq!(payload.len(), TM_FRAME_BYTES);
    let parity = rs.encode_block(payload);

    let mut region: Vec<u8> = payload.iter().chain(parity.iter()).copied().collect();
    PnScrambler::new().apply_bytes(&mut region);

    let mut cadu = ASM.to_vec();
    cadu.extend(region);
    cadu
}

/// Concatenate CADUs into a channel bit stream: idle bits, frames, tail
/// idle, all NRZ-M encoded as one sequence.
pub fn encode_stream(rs: &ReedSolomon, payloads: &[Vec<u8>], idle_head_bits: usize, idle_tail_bits: usize) -> Vec<u8> {
    let mut bits = vec![0u8; idle_head_bits];
    for payload in payloads {
        bits.extend(unpack_bits(&build_cadu(rs, payload)));
    }
    bits.extend(vec![0u8; idle_tail_bits]);
    nrzm::encode(&bits, false)
}

/// Map channel bits onto rectangular-pulse OQPSK at an integer
/// samples-per-symbol, Q delayed half a symbol. Returns ADC count pairs.
pub fn modulate_oqpsk(bits: &[u8], sps: usize, amplitude: i16) -> Vec<(i16, i16)> {
    assert_eq!(bits.len() % 2, 0, "OQPSK needs an even bit count");
    let nsym = bits.len() / 2;
    let mut iq = vec![(0i16, 0i16); nsym * sps + sps];

    for k in 0..nsym {
        let i_val = if bits[2 * k] == 1 { amplitude } else { -amplitude };
        let q_val = if bits[2 * k + 1] == 1 { amplitude } else { -amplitude };
        for s in 0..sps {
            iq[k * sps + s].0 = i_val;
            let q_pos = k * sps + s + sps / 2;
            if q_pos < iq.len() {
                iq[q_pos].1 = q_val;
            }
        }
    }
    iq
}

/// Map channel bits onto rectangular-pulse BPSK (I channel only).
pub fn modulate_bpsk(bits: &[u8], sps: usize, amplitude: i16) -> Vec<(i16, i16)> {
    let mut iq = Vec::with_capacity(bits.len() * sps);
    for &b in bits {
        let v = if b == 1 { amplitude } else { -amplitude };
        iq.extend(std::iter::repeat((v, 0i16)).take(sps));
    }
    iq
}

/// Write interleaved little-endian i16 IQ pairs to a unique temp file.
pub fn write_iq16(tag: &str, samples: &[(i16, i16)]) -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!("caduceus-test-{}-{}.iq16", std::process::id(), tag));
    let mut f = std::fs::File::create(&path).unwrap();
    let mut buf = Vec::with_capacity(samples.len() * 4);
    for &(i, q) in samples {
        buf.extend_from_slice(&i.to_le_bytes());
        buf.extend_from_slice(&q.to_le_bytes());
    }
    f.write_all(&buf).unwrap();
    path
}

/// Deterministic pseudo-random payload bytes (xorshift, no rand dependency
/// needed at this layer).
pub fn payload_bytes(seed: u64, len: usize) -> Vec<u8> {
    let mut state = seed.wrapping_mul(0x9E3779B97F4A7C15) | 1;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state >> 24) as u8
        })
        .collect()
}
