//! Post-demodulation bit-stream conditioning.
//!
//! Substages run in a fixed order, each toggled by configuration:
//! Viterbi -> NRZ-M. The CCSDS descrambler is frame-synchronous, so the
//! frame layer applies it per candidate frame; the toggle lives in
//! [`ChainConfig`](crate::config::ChainConfig) alongside the others.

pub mod nrzm;
pub mod scrambler;
pub mod viterbi;

pub use scrambler::PnScrambler;
pub use viterbi::ViterbiDecoder;

use crate::config::ChainConfig;
use crate::logging::StageLogger;
use crate::utils::{pack_bits, unpack_bits};

const STAGE: &str = "linecode";

/// Run the enabled substages over the demodulated bit stream.
///
/// The stream is realigned to a whole number of bytes first, matching what
/// the frame layer consumes. When the Viterbi stage is enabled but no
/// decoder was wired in, the stage is skipped with a warning.
pub fn process(
    cfg: &ChainConfig,
    bits: &[u8],
    viterbi: Option<&mut dyn ViterbiDecoder>,
    log: &mut StageLogger,
) -> Vec<u8> {
    // Align to 8-bit boundaries; trailing fragment bits carry no frame data.
    let packed = pack_bits(bits);
    let mut current = packed;

    if cfg.viterbi {
        match viterbi {
            Some(decoder) => {
                let n_out = current.len() / 2;
                log.info(STAGE, format!("viterbi: {} -> {} bytes", current.len(), n_out));
                current = decoder.decode(&current, n_out);
            }
            None => {
                log.warn(STAGE, "viterbi enabled but no decoder wired, skipping");
            }
        }
    }

    let mut out = unpack_bits(&current);

    if cfg.nrzm {
        log.debug(STAGE, "NRZ-M differential decode");
        out = nrzm::decode(&out, cfg.nrzm_invert);
    }

    out
}
