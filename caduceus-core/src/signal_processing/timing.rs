//! Mueller & Muller symbol timing recovery with linear interpolation.
//!
//! The loop tracks the samples-per-symbol estimate and a fractional sample
//! index. For OQPSK the Q channel is read half a symbol after I, which is
//! the defining offset of the modulation. A watchdog bounds the iteration
//! count so a pathological gain set cannot spin forever, and any non-finite
//! loop state terminates the run with the symbols produced so far.

use num_complex::Complex32;

use super::symbols::{slice_bpsk, slice_qpsk, SymbolStream};
use crate::config::Modulation;

/// Smallest forward step per iteration, in samples.
const MIN_STEP: f64 = 0.10;

/// How the timing loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopStatus {
    /// Ran to the end of the buffer (or hit the iteration watchdog).
    Converged,
    /// Loop state became non-finite; output holds the symbols so far.
    Diverged,
}

/// Output of one timing recovery pass.
#[derive(Debug, Clone)]
pub struct TimingResult {
    pub symbols: SymbolStream,
    pub status: LoopStatus,
    /// Final samples-per-symbol estimate.
    pub final_sps: f64,
    pub iterations: usize,
}

/// Linear interpolation into a complex buffer at a fractional position.
///
/// Positions outside `[0, N-1)` return zero; an integer position `k`
/// returns `buf[k]` exactly.
pub fn interpolate(buf: &[Complex32], pos: f64) -> Complex32 {
    if pos >= 0.0 && pos < buf.len() as f64 - 1.0 {
        let i = pos as usize;
        let frac = (pos - i as f64) as f32;
        buf[i] * (1.0 - frac) + buf[i + 1] * frac
    } else {
        Complex32::new(0.0, 0.0)
    }
}

/// Linear interpolation into a real buffer at a fractional position.
pub fn interpolate_real(buf: &[f32], pos: f64) -> f32 {
    if pos >= 0.0 && pos < buf.len() as f64 - 1.0 {
        let i = pos as usize;
        let frac = (pos - i as f64) as f32;
        buf[i] * (1.0 - frac) + buf[i + 1] * frac
    } else {
        0.0
    }
}

/// Mueller & Muller timing recovery.
#[derive(Debug, Clone)]
pub struct TimingLoop {
    sps_nom: f64,
    alpha: f64,
    beta: f64,
}

impl TimingLoop {
    pub fn new(sps_nom: f64, alpha: f64, beta: f64) -> Self {
        Self {
            sps_nom,
            alpha,
            beta,
        }
    }

    /// Upper bound on loop iterations for a buffer of `n` samples.
    pub fn max_iterations(&self, n: usize) -> usize {
        (n as f64 / self.sps_nom.max(1e-6)) as usize * 4 + 1000
    }

    /// Recover symbols from the carrier-corrected signal.
    pub fn recover(&self, input: &[Complex32], modulation: Modulation) -> TimingResult {
        match modulation {
            Modulation::Bpsk => self.recover_bpsk(input),
            Modulation::Oqpsk => self.recover_oqpsk(input),
        }
    }

    fn recover_oqpsk(&self, input: &[Complex32]) -> TimingResult {
        let n = input.len() as f64;
        let sps_min = 0.5 * self.sps_nom;
        let sps_max = 1.5 * self.sps_nom;
        let max_iters = self.max_iterations(input.len());

        let mut sps = self.sps_nom;
        let mut idx = 0.0f64;
        let mut symbols: Vec<Complex32> = Vec::new();
        let mut prev_sym = Complex32::new(0.0, 0.0);
        let mut prev_dec = Complex32::new(0.0, 0.0);
        let mut started = false;
        let mut status = LoopStatus::Converged;
        let mut iterations = 0usize;

        while idx < n - sps - 5.0 {
            iterations += 1;
            if iterations > max_iters {
                break;
            }

            let i_sample = interpolate(input, idx);
            let q_sample = interpolate(input, idx + sps / 2.0);
            let sym = Complex32::new(i_sample.re, q_sample.im);
            symbols.push(sym);

            if !started {
                prev_sym = sym;
                prev_dec = slice_qpsk(sym);
                started = true;
                idx += sps;
                continue;
            }

            let dec = slice_qpsk(sym);
            let err = (prev_dec.re as f64 * sym.re as f64
                + prev_dec.im as f64 * sym.im as f64)
                - (dec.re as f64 * prev_sym.re as f64
                    + dec.im as f64 * prev_sym.im as f64);

            if !err.is_finite() || !sps.is_finite() || !idx.is_finite() {
                status = LoopStatus::Diverged;
                break;
            }

            sps = (sps + self.beta * err).clamp(sps_min, sps_max);

            let mut step = sps + self.alpha * err;
            if !step.is_finite() || step < MIN_STEP {
                step = MIN_STEP;
            }
            idx += step;

            prev_sym = sym;
            prev_dec = dec;
        }

        TimingResult {
            symbols: SymbolStream::Quadrature(symbols),
            status,
            final_sps: sps,
            iterations,
        }
    }

    fn recover_bpsk(&self, input: &[Complex32]) -> TimingResult {
        let i_channel: Vec<f32> = input.iter().map(|s| s.re).collect();
        let n = i_channel.len() as f64;
        let sps_min = 0.5 * self.sps_nom;
        let sps_max = 1.5 * self.sps_nom;
        let max_iters = self.max_iterations(input.len());

        let mut sps = self.sps_nom;
        let mut idx = sps;
        let mut symbols: Vec<f32> = Vec::new();
        let mut prev_sym = 0.0f32;
        let mut prev_dec = 0.0f32;
        let mut started = false;
        let mut status = LoopStatus::Converged;
        let mut iterations = 0usize;

        while idx < n - sps - 5.0 {
            iterations += 1;
            if iterations > max_iters {
                break;
            }

            let sym = interpolate_real(&i_channel, idx);
            symbols.push(sym);

            if !started {
                prev_sym = sym;
                prev_dec = slice_bpsk(sym);
                started = true;
                idx += sps;
                continue;
            }

            let dec = slice_bpsk(sym);
            let err = prev_dec as f64 * sym as f64 - dec as f64 * prev_sym as f64;

            if !err.is_finite() || !sps.is_finite() || !idx.is_finite() {
                status = LoopStatus::Diverged;
                break;
            }

            sps = (sps + self.beta * err).clamp(sps_min, sps_max);

            let mut step = sps + self.alpha * err;
            if !step.is_finite() || step < MIN_STEP {
                step = MIN_STEP;
            }
            idx += step;

            prev_sym = sym;
            prev_dec = dec;
        }

        TimingResult {
            symbols: SymbolStream::Real(symbols),
            status,
            final_sps: sps,
            iterations,
        }
    }
}
