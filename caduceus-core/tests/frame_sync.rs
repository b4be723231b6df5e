//! ASM search and frame slicing over synthetic bit streams.

mod common;

use caduceus_core::framing::{
    find_asm, FrameDecoder, ASM, FRAME_BITS, TM_FRAME_BYTES,
};
use caduceus_core::linecode::PnScrambler;
use caduceus_core::logging::StageLogger;
use caduceus_core::reed_solomon::ReedSolomon;
use caduceus_core::utils::unpack_bits;

#[test]
fn sync_found_at_reported_offset() {
    let mut bits = vec![0u8; 40];
    bits.extend(unpack_bits(&ASM));
    bits.extend(vec![0u8; 10_000]);
    assert_eq!(find_asm(&bits, 0), Some(40));
}

/// An ASM followed by fewer bits than a full frame is reported as an
/// incomplete frame and the scan stops there.
#[test]
fn trailing_partial_frame_is_incomplete() {
    let mut bits = vec![0u8; 40];
    bits.extend(unpack_bits(&ASM));
    bits.extend(vec![0u8; 10_000]); // frame needs 10232 bits from the ASM

    let decoder = FrameDecoder::new(true);
    let mut log = StageLogger::default();
    let (frames, stats) = decoder.decode_stream(&bits, &mut log);

    assert_eq!(stats.found, 1);
    assert!(stats.incomplete);
    assert_eq!(stats.ok, 0);
    assert_eq!(stats.bad, 0);
    assert!(frames.is_empty());
}

#[test]
fn empty_and_markerless_streams_find_nothing() {
    let decoder = FrameDecoder::new(true);
    let mut log = StageLogger::default();

    let (frames, stats) = decoder.decode_stream(&[], &mut log);
    assert_eq!(stats.found, 0);
    assert!(frames.is_empty());

    let noise: Vec<u8> = (0..50_000).map(|i| ((i * 31 + 7) % 9 < 4) as u8).collect();
    let (_, stats) = decoder.decode_stream(&noise, &mut log);
    // A purely arithmetic pattern is overwhelmingly unlikely to contain the
    // marker; if it ever did, every hit would still fail RS.
    assert_eq!(stats.ok, 0);
}

#[test]
fn clean_frame_decodes_and_payload_matches() {
    let rs = ReedSolomon::new();
    let payload = common::payload_bytes(5, TM_FRAME_BYTES);
    let cadu = common::build_cadu(&rs, &payload);

    let mut bits = vec![0u8; 56];
    bits.extend(unpack_bits(&cadu));
    bits.extend(vec![0u8; 64]);

    let decoder = FrameDecoder::new(true);
    let mut log = StageLogger::default();
    let (frames, stats) = decoder.decode_stream(&bits, &mut log);

    assert_eq!(stats.found, 1);
    assert_eq!(stats.ok, 1);
    assert_eq!(stats.bad, 0);
    assert_eq!(frames[0].bit_offset, 56);
    assert_eq!(frames[0].corrected, 0);
    assert_eq!(frames[0].data, payload);
}

#[test]
fn corrupted_frame_is_corrected_and_counted() {
    let rs = ReedSolomon::new();
    let payload = common::payload_bytes(11, TM_FRAME_BYTES);
    let mut cadu = common::build_cadu(&rs, &payload);

    // Corrupt six payload bytes after scrambling, i.e. on the wire.
    for (i, pos) in [10usize, 222, 223, 700, 1150, 1278].iter().enumerate() {
        cadu[*pos] ^= (i as u8) + 1;
    }

    let bits = unpack_bits(&cadu);
    let decoder = FrameDecoder::new(true);
    let mut log = StageLogger::default();
    let (frames, stats) = decoder.decode_stream(&bits, &mut log);

    assert_eq!(stats.ok, 1);
    assert_eq!(frames[0].corrected, 6);
    assert_eq!(frames[0].data, payload);
}

#[test]
fn unscrambled_garbage_frame_is_bad_but_scan_continues() {
    let rs = ReedSolomon::new();
    let good = common::build_cadu(&rs, &common::payload_bytes(1, TM_FRAME_BYTES));

    // First frame: an ASM followed by unscrambled garbage that cannot pass
    // RS. Second frame: a valid CADU.
    let mut bad = ASM.to_vec();
    bad.extend(common::payload_bytes(2, TM_FRAME_BYTES + 160));

    let mut bits = unpack_bits(&bad);
    bits.extend(unpack_bits(&good));

    let decoder = FrameDecoder::new(true);
    let mut log = StageLogger::default();
    let (frames, stats) = decoder.decode_stream(&bits, &mut log);

    assert_eq!(stats.found, 2);
    assert_eq!(stats.bad, 1);
    assert_eq!(stats.ok, 1);
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].bit_offset, FRAME_BITS);
}

/// Frames are consumed non-overlapping: scanning resumes immediately after
/// each frame, so back-to-back CADUs all decode.
#[test]
fn back_to_back_frames_all_decode() {
    let rs = ReedSolomon::new();
    let payloads: Vec<Vec<u8>> = (0..4)
        .map(|i| common::payload_bytes(20 + i, TM_FRAME_BYTES))
        .collect();

    let mut bits = Vec::new();
    for p in &payloads {
        bits.extend(unpack_bits(&common::build_cadu(&rs, p)));
    }

    let decoder = FrameDecoder::new(true);
    let mut log = StageLogger::default();
    let (frames, stats) = decoder.decode_stream(&bits, &mut log);

    assert_eq!(stats.found, 4);
    assert_eq!(stats.ok, 4);
    for (frame, payload) in frames.iter().zip(payloads.iter()) {
        assert_eq!(&frame.data, payload);
    }
}

/// With descrambling disabled the frame layer must accept frames whose
/// payload was never randomized.
#[test]
fn descramble_toggle_matches_wire_format() {
    let rs = ReedSolomon::new();
    let payload = common::payload_bytes(33, TM_FRAME_BYTES);

    // Build a CADU without scrambling.
    let parity = rs.encode_block(&payload);
    let mut cadu = ASM.to_vec();
    cadu.extend(payload.iter().chain(parity.iter()));

    let bits = unpack_bits(&cadu);
    let mut log = StageLogger::default();

    let (frames, stats) = FrameDecoder::new(false).decode_stream(&bits, &mut log);
    assert_eq!(stats.ok, 1);
    assert_eq!(frames[0].data, payload);

    // The scrambling decoder sees PN-whitened garbage instead.
    let (_, stats) = FrameDecoder::new(true).decode_stream(&bits, &mut log);
    assert_eq!(stats.ok, 0);
    assert_eq!(stats.bad, 1);
}

#[test]
fn scrambler_fixed_point_reference() {
    // A zero payload region descrambled once is the PN sequence itself.
    let mut zeros = vec![0u8; 100];
    PnScrambler::new().apply_bytes(&mut zeros);
    assert_eq!(&zeros[..5], &[0xFF, 0x48, 0x0E, 0xC0, 0x9A]);

    PnScrambler::new().apply_bytes(&mut zeros);
    assert!(zeros.iter().all(|&b| b == 0));
}
