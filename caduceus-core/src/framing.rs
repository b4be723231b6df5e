//! Sync-marker search, frame slicing, and RS-protected frame decoding.
//!
//! This is the only layer aware of CCSDS semantics. It scans the unpacked
//! post-line-code bit stream for the attached sync marker, packs each
//! candidate into a 1279-byte frame, descrambles the region after the ASM
//! with a freshly seeded register, and runs the interleaved Reed-Solomon
//! decode. Per-frame failures are counted, never raised; a run is never
//! aborted by this layer.

use crate::linecode::scrambler;
use crate::logging::StageLogger;
use crate::reed_solomon::{ReedSolomon, CODEWORD_LEN, INTERLEAVE};
use crate::utils::pack_bits;

const STAGE: &str = "framing";

/// The CCSDS attached sync marker.
pub const ASM: [u8; 4] = [0x1A, 0xCF, 0xFC, 0x1D];
/// ASM length in bits.
pub const ASM_BITS: usize = 32;
/// Full frame: ASM + transfer frame + RS parity.
pub const FRAME_BYTES: usize = 1279;
pub const FRAME_BITS: usize = FRAME_BYTES * 8;
/// Transfer frame payload carried by each CADU.
pub const TM_FRAME_BYTES: usize = 1115;
/// RS check symbols per frame (32 per codeword, depth 5).
pub const RS_PARITY_BYTES: usize = 160;

/// One successfully decoded transfer frame.
#[derive(Debug, Clone)]
pub struct TmFrame {
    /// Bit offset of the frame's ASM in the scanned stream.
    pub bit_offset: usize,
    /// Corrected 1115-byte transfer frame, ASM and parity stripped.
    pub data: Vec<u8>,
    /// RS symbol corrections applied across the five codewords.
    pub corrected: usize,
}

/// Per-run frame counters.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameStats {
    /// Sync markers found, including a trailing incomplete frame.
    pub found: usize,
    pub ok: usize,
    pub bad: usize,
    /// Set when the stream ended inside the last candidate frame.
    pub incomplete: bool,
}

impl FrameStats {
    pub fn success_rate(&self) -> f64 {
        if self.found == 0 {
            0.0
        } else {
            self.ok as f64 / self.found as f64
        }
    }
}

/// Find the next exact ASM match at or after `from`.
///
/// The search tolerates no bit errors in the marker itself; corrupted
/// markers surface later as missed frames, and payload errors are the RS
/// decoder's job.
pub fn find_asm(bits: &[u8], from: usize) -> Option<usize> {
    let pattern = crate::utils::unpack_bits(&ASM);
    if bits.len() < ASM_BITS {
        return None;
    }
    (from..=bits.len() - ASM_BITS).find(|&i| bits[i..i + ASM_BITS] == pattern[..])
}

/// Frame-layer context: the RS codec plus the descramble toggle.
#[derive(Debug, Clone)]
pub struct FrameDecoder {
    rs: ReedSolomon,
    descramble: bool,
}

impl FrameDecoder {
    pub fn new(descramble: bool) -> Self {
        Self {
            rs: ReedSolomon::new(),
            descramble,
        }
    }

    /// Scan the whole bit stream, decoding every non-overlapping frame.
    pub fn decode_stream(
        &self,
        bits: &[u8],
        log: &mut StageLogger,
    ) -> (Vec<TmFrame>, FrameStats) {
        let mut frames = Vec::new();
        let mut stats = FrameStats::default();
        let mut offset = 0usize;

        while let Some(sync_at) = find_asm(bits, offset) {
            stats.found += 1;

            if sync_at + FRAME_BITS > bits.len() {
                stats.incomplete = true;
                log.warn(
                    STAGE,
                    format!(
                        "frame {}: sync at bit {} but only {} bits remain, stopping",
                        stats.found,
                        sync_at,
                        bits.len() - sync_at
                    ),
                );
                break;
            }

            let mut frame = pack_bits(&bits[sync_at..sync_at + FRAME_BITS]);
            debug_assert_eq!(frame.len(), FRAME_BYTES);

            if self.descramble {
                scrambler::descramble_frame(&mut frame[ASM.len()..]);
            }

            debug_assert_eq!(FRAME_BYTES - ASM.len(), INTERLEAVE * CODEWORD_LEN);
            match self.rs.decode_block(&mut frame[ASM.len()..]) {
                Some(corrected) => {
                    stats.ok += 1;
                    log.info(
                        STAGE,
                        format!(
                            "frame {}: sync at bit {}, RS OK, {} corrected",
                            stats.found, sync_at, corrected
                        ),
                    );
                    frames.push(TmFrame {
                        bit_offset: sync_at,
                        data: frame[ASM.len()..ASM.len() + TM_FRAME_BYTES].to_vec(),
                        corrected,
                    });
                }
                None => {
                    stats.bad += 1;
                    log.warn(
                        STAGE,
                        format!("frame {}: sync at bit {}, RS FAILED", stats.found, sync_at),
                    );
                }
            }

            offset = sync_at + FRAME_BITS;
        }

        log.info(
            STAGE,
            format!(
                "scan complete: {} found, {} ok, {} bad",
                stats.found, stats.ok, stats.bad
            ),
        );
        (frames, stats)
    }
}
