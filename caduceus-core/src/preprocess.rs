//! IQ capture loading and front-end conditioning.
//!
//! The preprocessor is the only stage that touches the filesystem. It reads
//! the whole capture, removes the per-channel DC offset, scales counts to
//! volts, optionally low-pass filters, decimates, optionally applies the
//! RRC matched filter, and finally normalizes the amplitude so the loops
//! see samples in [-1, 1].

use std::fs;

use num_complex::Complex32;

use crate::config::{DemodConfig, IqFormat};
use crate::errors::{InputError, Result};
use crate::logging::StageLogger;
use crate::signal_processing::filters;

const STAGE: &str = "preprocess";

/// Preprocessor output, handed to the carrier loop by move.
#[derive(Debug, Clone)]
pub struct PreprocessedSignal {
    pub samples: Vec<Complex32>,
    /// Effective samples per symbol after decimation.
    pub sps: f64,
    /// Total power of the scaled capture before any filtering, in watts.
    pub power_raw_w: f64,
    /// Total power after filtering and decimation, before normalization.
    pub power_post_w: f64,
}

/// Mean |v|^2 / Rload over the buffer, accumulated in double precision.
fn mean_power_w(samples: &[Complex32], rload_ohm: f64) -> f64 {
    if samples.is_empty() || rload_ohm <= 0.0 {
        return 0.0;
    }
    let acc: f64 = samples
        .iter()
        .map(|s| s.re as f64 * s.re as f64 + s.im as f64 * s.im as f64)
        .sum();
    acc / samples.len() as f64 / rload_ohm
}

fn read_components(cfg: &DemodConfig) -> Result<(Vec<f32>, Vec<f32>)> {
    let raw = fs::read(&cfg.input_file).map_err(|source| InputError::Unavailable {
        path: cfg.input_file.clone(),
        source,
    })?;

    let pair = 2 * cfg.input_format.bytes_per_component();
    let n_samples = raw.len() / pair;
    if n_samples == 0 {
        return Err(InputError::Truncated {
            path: cfg.input_file.clone(),
            bytes: raw.len(),
        }
        .into());
    }

    let mut i_arr = Vec::with_capacity(n_samples);
    let mut q_arr = Vec::with_capacity(n_samples);
    match cfg.input_format {
        IqFormat::Iq16 => {
            for chunk in raw.chunks_exact(4).take(n_samples) {
                i_arr.push(i16::from_le_bytes([chunk[0], chunk[1]]) as f32);
                q_arr.push(i16::from_le_bytes([chunk[2], chunk[3]]) as f32);
            }
        }
        IqFormat::Iq32 => {
            for chunk in raw.chunks_exact(8).take(n_samples) {
                i_arr.push(i32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]) as f32);
                q_arr.push(i32::from_le_bytes([chunk[4], chunk[5], chunk[6], chunk[7]]) as f32);
            }
        }
    }
    Ok((i_arr, q_arr))
}

/// Load the capture and run the full conditioning chain.
pub fn load_and_process(cfg: &DemodConfig, log: &mut StageLogger) -> Result<PreprocessedSignal> {
    let (mut i_arr, mut q_arr) = read_components(cfg)?;
    let n_samples = i_arr.len();
    log.info(
        STAGE,
        format!("loaded {} IQ samples ({:?})", n_samples, cfg.input_format),
    );

    // DC offset removal, per channel.
    let i_mean = i_arr.iter().map(|&v| v as f64).sum::<f64>() / n_samples as f64;
    let q_mean = q_arr.iter().map(|&v| v as f64).sum::<f64>() / n_samples as f64;
    for v in &mut i_arr {
        *v -= i_mean as f32;
    }
    for v in &mut q_arr {
        *v -= q_mean as f32;
    }

    // Scale counts to volts.
    let v_per_count = cfg.input_format.volts_per_count(cfg.scaling.fs_vpp) as f32;
    let mut sig: Vec<Complex32> = i_arr
        .iter()
        .zip(q_arr.iter())
        .map(|(&i, &q)| Complex32::new(i * v_per_count, q * v_per_count))
        .collect();
    drop(i_arr);
    drop(q_arr);

    let power_raw_w = mean_power_w(&sig, cfg.scaling.rload);

    // Optional low-pass before decimation.
    if cfg.lowpass.enable {
        let cutoff = (cfg.lowpass.cutoff / 150.0).min(0.45);
        log.info(
            STAGE,
            format!(
                "low-pass: cutoff {:.4} of Fs, {} taps",
                cutoff, cfg.lowpass.taps
            ),
        );
        let taps = filters::lowpass_taps(cutoff, cfg.lowpass.taps);
        sig = filters::convolve(&sig, &taps);
    } else {
        log.debug(STAGE, "low-pass disabled");
    }

    // Decimation.
    let mut sps = cfg.sps;
    if cfg.decim > 1 {
        sig = sig.into_iter().step_by(cfg.decim).collect();
        sps = cfg.effective_sps();
        log.info(
            STAGE,
            format!("decimated by {}, new sps {:.4}", cfg.decim, sps),
        );
    }

    // Optional RRC matched filter at the decimated rate.
    if cfg.rrc.enable {
        let rs = cfg.symbol_rate();
        let fs = rs * sps;
        let taps = filters::rrc_taps(fs, rs, cfg.rrc.rolloff, cfg.rrc.span);
        log.info(
            STAGE,
            format!(
                "RRC: rolloff {:.2}, span {} symbols, {} taps",
                cfg.rrc.rolloff,
                cfg.rrc.span,
                taps.len()
            ),
        );
        let filtered = filters::convolve(&sig, &taps);
        sig = if cfg.rrc.trim_delay {
            let group_delay = (taps.len() - 1) / 2;
            filtered[group_delay.min(filtered.len())..].to_vec()
        } else {
            filtered
        };
    }

    let power_post_w = mean_power_w(&sig, cfg.scaling.rload);

    // Normalize amplitude to [-1, 1].
    let max_abs = sig
        .iter()
        .map(|s| s.norm())
        .fold(0.0f32, f32::max);
    let scale = 1.0 / (max_abs + 1e-12);
    for s in &mut sig {
        *s *= scale;
    }

    log.info(
        STAGE,
        format!(
            "conditioned {} samples, Praw {:.3e} W, Ppost {:.3e} W",
            sig.len(),
            power_raw_w,
            power_post_w
        ),
    );

    Ok(PreprocessedSignal {
        samples: sig,
        sps,
        power_raw_w,
        power_post_w,
    })
}
