//! Loop-gain grid search driven by decision-directed EVM.
//!
//! Each trial runs the Costas and timing loops over the same preprocessed
//! signal with one gain quadruple and scores the resulting constellation.
//! Trials are independent, so the grid is evaluated in parallel with the
//! signal shared read-only.

use num_complex::Complex32;
use rayon::prelude::*;

use crate::config::{DemodConfig, LoopGains};
use crate::signal_processing::{CostasLoop, TimingLoop};

pub const COSTAS_ALPHA_GRID: [f64; 5] = [0.01, 0.03, 0.05, 0.07, 0.1];
pub const COSTAS_BETA_GRID: [f64; 5] = [0.00005, 0.0001, 0.00015, 0.0002, 0.0003];
pub const TIMING_ALPHA_GRID: [f64; 5] = [0.01, 0.03, 0.05, 0.07, 0.1];
pub const TIMING_BETA_GRID: [f64; 5] = [0.001, 0.003, 0.005, 0.007, 0.01];

/// Score assigned to a trial that produced too few symbols to judge.
const WORST_EVM: f64 = 1000.0;

/// Winning gain set and its score.
#[derive(Debug, Clone, Copy)]
pub struct TuneResult {
    pub costas: LoopGains,
    pub timing: LoopGains,
    pub evm: f64,
    pub trials: usize,
}

fn trial_evm(signal: &[Complex32], sps: f64, cfg: &DemodConfig, costas: LoopGains, timing: LoopGains) -> f64 {
    let mut carrier = CostasLoop::new(cfg.modulation, costas.alpha, costas.beta);
    let corrected = carrier.process(signal);

    let timing_loop = TimingLoop::new(sps, timing.alpha, timing.beta);
    let result = timing_loop.recover(&corrected, cfg.modulation);

    result
        .symbols
        .evm_windowed(cfg.evm.skip_syms, cfg.evm.last_syms)
        .unwrap_or(WORST_EVM)
}

/// Grid-search the four loop gains, returning the quadruple with the
/// lowest windowed EVM.
pub fn tune(signal: &[Complex32], sps: f64, cfg: &DemodConfig) -> TuneResult {
    let mut grid = Vec::new();
    for &ca in &COSTAS_ALPHA_GRID {
        for &cb in &COSTAS_BETA_GRID {
            for &ta in &TIMING_ALPHA_GRID {
                for &tb in &TIMING_BETA_GRID {
                    grid.push((
                        LoopGains { alpha: ca, beta: cb },
                        LoopGains { alpha: ta, beta: tb },
                    ));
                }
            }
        }
    }
    let trials = grid.len();

    let best = grid
        .into_par_iter()
        .map(|(costas, timing)| {
            let evm = trial_evm(signal, sps, cfg, costas, timing);
            (costas, timing, evm)
        })
        .min_by(|a, b| a.2.partial_cmp(&b.2).unwrap_or(std::cmp::Ordering::Equal))
        .expect("grid is never empty");

    TuneResult {
        costas: best.0,
        timing: best.1,
        evm: best.2,
        trials,
    }
}
