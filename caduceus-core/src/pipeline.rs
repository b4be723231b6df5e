//! End-to-end receive pipeline orchestration.
//!
//! One synchronous, batch execution per run: preprocess -> carrier loop ->
//! timing loop -> slicing -> line-code chain -> frame layer -> diagnostics.
//! Buffers move stage to stage; nothing is shared mutably. The pipeline
//! never prints: everything user-visible lands in the returned report and
//! its stage log.

use crate::autotune::{self, TuneResult};
use crate::config::DemodConfig;
use crate::diagnostics::LinkReport;
use crate::errors::Result;
use crate::framing::{FrameDecoder, FrameStats, TmFrame};
use crate::linecode::{self, ViterbiDecoder};
use crate::logging::StageLogger;
use crate::preprocess;
use crate::signal_processing::{CostasLoop, LoopStatus, TimingLoop};
use crate::udp::BitStreamSender;

const STAGE: &str = "pipeline";

/// Everything a run produced, plus the stage log.
#[derive(Debug)]
pub struct RunReport {
    /// Samples that entered the carrier loop.
    pub input_samples: usize,
    /// Effective samples per symbol after decimation.
    pub effective_sps: f64,
    pub power_raw_w: f64,
    pub power_post_w: f64,

    pub symbol_count: usize,
    pub loop_status: LoopStatus,

    /// Unpacked bit stream after the line-code stages.
    pub bits: Vec<u8>,

    pub frames: Vec<TmFrame>,
    pub stats: FrameStats,

    /// Windowed decision-directed EVM, when enough symbols were produced.
    pub evm: Option<f64>,
    pub link: Option<LinkReport>,

    /// Gain set chosen by auto-tune, when it ran.
    pub tuned: Option<TuneResult>,

    pub log: StageLogger,
}

/// Run the full pipeline with the default (absent) Viterbi collaborator.
pub fn run(cfg: &DemodConfig) -> Result<RunReport> {
    run_with_viterbi(cfg, None)
}

/// Run the full pipeline, optionally wiring in an external Viterbi decoder.
pub fn run_with_viterbi(
    cfg: &DemodConfig,
    viterbi: Option<&mut dyn ViterbiDecoder>,
) -> Result<RunReport> {
    cfg.validate()?;
    let mut log = StageLogger::default();

    // Stage A: load and condition the capture.
    let pre = preprocess::load_and_process(cfg, &mut log)?;

    // Optional grid search over the shared read-only signal.
    let (costas_gains, timing_gains, tuned) = if cfg.auto_tune {
        let result = autotune::tune(&pre.samples, pre.sps, cfg);
        log.info(
            STAGE,
            format!(
                "auto-tune: best EVM {:.4}% over {} trials (ca {:.3}, cb {:.5}, ta {:.3}, tb {:.4})",
                result.evm * 100.0,
                result.trials,
                result.costas.alpha,
                result.costas.beta,
                result.timing.alpha,
                result.timing.beta
            ),
        );
        (result.costas, result.timing, Some(result))
    } else {
        (cfg.costas, cfg.timing, None)
    };

    // Stages B+C: carrier recovery, then symbol timing recovery.
    let mut carrier = CostasLoop::new(cfg.modulation, costas_gains.alpha, costas_gains.beta);
    let corrected = carrier.process(&pre.samples);
    log.debug(
        STAGE,
        format!(
            "carrier loop done, final freq {:.3e} rad/sample",
            carrier.frequency()
        ),
    );

    let timing = TimingLoop::new(pre.sps, timing_gains.alpha, timing_gains.beta);
    let recovery = timing.recover(&corrected, cfg.modulation);
    if recovery.status == LoopStatus::Diverged {
        log.warn(
            STAGE,
            "timing loop diverged, continuing with partial symbols",
        );
    }
    log.info(
        STAGE,
        format!(
            "{} symbols recovered, final sps {:.4}",
            recovery.symbols.len(),
            recovery.final_sps
        ),
    );

    // Stage D: hard decisions.
    let demod_bits = recovery.symbols.to_bits();

    // Optional UDP tap of the raw demodulated bits.
    if let Some(udp_cfg) = &cfg.udp {
        match BitStreamSender::connect(udp_cfg).and_then(|s| s.send_bits(&demod_bits)) {
            Ok(packets) => log.info(
                STAGE,
                format!("streamed {} UDP packets to {}:{}", packets, udp_cfg.host, udp_cfg.port),
            ),
            Err(e) => log.warn(STAGE, format!("UDP streaming failed: {}", e)),
        }
    }

    // Stage E: line-code chain.
    let bits = linecode::process(&cfg.chain, &demod_bits, viterbi, &mut log);

    // Stage F: frame layer.
    let decoder = FrameDecoder::new(cfg.chain.descramble);
    let (frames, stats) = decoder.decode_stream(&bits, &mut log);

    // Diagnostics.
    let evm = recovery
        .symbols
        .evm_windowed(cfg.evm.skip_syms, cfg.evm.last_syms);
    let link = evm.map(|evm| {
        LinkReport::from_evm(
            evm,
            f64::from(cfg.modulation.bits_per_symbol()),
            cfg.rb,
            if cfg.rrc.enable { cfg.rrc.rolloff } else { 0.0 },
            pre.power_post_w,
        )
    });
    if let Some(evm) = evm {
        log.info(STAGE, format!("EVM {:.4}%", evm * 100.0));
    }

    let symbol_count = recovery.symbols.len();
    Ok(RunReport {
        input_samples: pre.samples.len(),
        effective_sps: pre.sps,
        power_raw_w: pre.power_raw_w,
        power_post_w: pre.power_post_w,
        symbol_count,
        loop_status: recovery.status,
        bits,
        frames,
        stats,
        evm,
        link,
        tuned,
        log,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DemodConfig;
    use std::path::PathBuf;

    #[test]
    fn missing_input_aborts_the_run() {
        let cfg = DemodConfig {
            input_file: PathBuf::from("/no/such/capture.iq"),
            ..DemodConfig::default()
        };
        assert!(matches!(
            run(&cfg),
            Err(crate::errors::DemodError::Input(_))
        ));
    }

    #[test]
    fn invalid_config_aborts_before_touching_the_file() {
        let cfg = DemodConfig {
            input_file: PathBuf::from("/no/such/capture.iq"),
            decim: 0,
            ..DemodConfig::default()
        };
        assert!(matches!(
            run(&cfg),
            Err(crate::errors::DemodError::Config(_))
        ));
    }
}
