//! Reed-Solomon codec validation against wire-format codewords.

mod common;

use caduceus_core::reed_solomon::{
    ReedSolomon, CODEWORD_LEN, DATA_LEN, INTERLEAVE, NROOTS,
};
use proptest::prelude::*;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn valid_codeword(rs: &ReedSolomon, seed: u64) -> Vec<u8> {
    let data = common::payload_bytes(seed, DATA_LEN);
    let parity = rs.encode(&data);
    data.iter().chain(parity.iter()).copied().collect()
}

#[test]
fn all_zero_codeword_decodes_clean() {
    let rs = ReedSolomon::new();
    let mut cw = vec![0u8; CODEWORD_LEN];
    assert_eq!(rs.decode(&mut cw), Some(0));
    assert!(cw.iter().all(|&b| b == 0));
}

#[test]
fn three_flipped_bytes_are_restored() {
    let rs = ReedSolomon::new();
    let clean = valid_codeword(&rs, 42);

    let mut rx = clean.clone();
    rx[5] = !rx[5];
    rx[17] = !rx[17];
    rx[200] = !rx[200];

    assert_eq!(rs.decode(&mut rx), Some(3));
    assert_eq!(rx, clean);
}

#[test]
fn corrects_at_the_sixteen_error_limit() {
    let rs = ReedSolomon::new();
    let clean = valid_codeword(&rs, 7);
    let mut rng = ChaCha8Rng::seed_from_u64(7);

    let mut positions: Vec<usize> = (0..CODEWORD_LEN).collect();
    positions.shuffle(&mut rng);

    let mut rx = clean.clone();
    for &p in positions.iter().take(16) {
        rx[p] ^= rng.gen_range(1..=255u8);
    }
    assert_eq!(rs.decode(&mut rx), Some(16));
    assert_eq!(rx, clean);
}

#[test]
fn seventeen_errors_never_silently_pass() {
    let rs = ReedSolomon::new();
    let clean = valid_codeword(&rs, 13);
    let mut rng = ChaCha8Rng::seed_from_u64(13);

    for trial in 0..8 {
        let mut positions: Vec<usize> = (0..CODEWORD_LEN).collect();
        positions.shuffle(&mut rng);
        let mut rx = clean.clone();
        for &p in positions.iter().take(17) {
            rx[p] ^= rng.gen_range(1..=255u8);
        }
        match rs.decode(&mut rx) {
            None => {}
            Some(_) => assert_ne!(rx, clean, "trial {}: miscorrection to original", trial),
        }
    }
}

#[test]
fn interleaved_frame_block_roundtrip() {
    let rs = ReedSolomon::new();
    let data = common::payload_bytes(99, INTERLEAVE * DATA_LEN);
    let parity = rs.encode_block(&data);
    assert_eq!(parity.len(), INTERLEAVE * NROOTS);

    let mut block: Vec<u8> = data.iter().chain(parity.iter()).copied().collect();
    let clean = block.clone();
    let mut rng = ChaCha8Rng::seed_from_u64(99);

    // Up to 16 errors in every one of the five codewords: still correctable.
    for lane in 0..INTERLEAVE {
        let mut symbols: Vec<usize> = (0..CODEWORD_LEN).collect();
        symbols.shuffle(&mut rng);
        for &j in symbols.iter().take(16) {
            block[j * INTERLEAVE + lane] ^= rng.gen_range(1..=255u8);
        }
    }
    assert_eq!(rs.decode_block(&mut block), Some(16 * INTERLEAVE));
    assert_eq!(block, clean);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Encode, corrupt up to 16 symbols, decode: the payload always comes
    /// back and the reported count matches the corruption.
    #[test]
    fn encode_corrupt_decode_roundtrip(
        seed in any::<u64>(),
        nerr in 0usize..=16,
    ) {
        let rs = ReedSolomon::new();
        let clean = valid_codeword(&rs, seed);

        let mut rng = ChaCha8Rng::seed_from_u64(seed ^ 0xDEAD);
        let mut positions: Vec<usize> = (0..CODEWORD_LEN).collect();
        positions.shuffle(&mut rng);

        let mut rx = clean.clone();
        for &p in positions.iter().take(nerr) {
            rx[p] ^= rng.gen_range(1..=255u8);
        }

        prop_assert_eq!(rs.decode(&mut rx), Some(nerr));
        prop_assert_eq!(rx, clean);
    }
}
