//! FIR filter design and convolution for the receive front end.
//!
//! Two generators are provided: a root-raised-cosine matched filter built
//! from the sample and symbol rates, and a Hamming-windowed sinc low-pass
//! built from a normalized cutoff. Both always produce an odd tap count so
//! the group delay is an integer number of samples.

use std::f64::consts::PI;

use num_complex::Complex32;

/// Generate root-raised-cosine filter taps.
///
/// The closed form has two singular points handled separately: `t = 0` and
/// `|t| = Ts / (4 * alpha)`. Taps are normalized to unit energy
/// (`sum h^2 = 1`), the standard for matched-filter pairs.
pub fn rrc_taps(fs_hz: f64, rs_hz: f64, alpha: f64, span_symbols: usize) -> Vec<f32> {
    let ts = 1.0 / rs_hz;
    let sps = fs_hz / rs_hz;
    let mut ntaps = (span_symbols as f64 * sps).ceil() as usize;
    if ntaps % 2 == 0 {
        ntaps += 1;
    }

    let mut h = vec![0.0f64; ntaps];
    let mid = (ntaps / 2) as isize;

    for (n, tap) in h.iter_mut().enumerate() {
        let tn = (n as isize - mid) as f64 / fs_hz;

        if tn.abs() < 1e-12 {
            *tap = (1.0 + alpha * (4.0 / PI - 1.0)) / ts.sqrt();
        } else if alpha > 0.0 && (tn.abs() - ts / (4.0 * alpha)).abs() < 1e-12 {
            *tap = (alpha / (2.0 * ts).sqrt())
                * ((1.0 + 2.0 / PI) * (PI / (4.0 * alpha)).sin()
                    + (1.0 - 2.0 / PI) * (PI / (4.0 * alpha)).cos());
        } else {
            let x = PI * tn / ts;
            let num = (x * (1.0 - alpha)).sin()
                + 4.0 * alpha * (tn / ts) * (x * (1.0 + alpha)).cos();
            let den = x * (1.0 - (4.0 * alpha * tn / ts).powi(2));
            *tap = (num / den) / ts.sqrt();
        }
    }

    let energy = (h.iter().map(|&v| v * v).sum::<f64>() + 1e-30).sqrt();
    h.iter().map(|&v| (v / energy) as f32).collect()
}

/// Generate a Hamming-windowed sinc low-pass filter.
///
/// `cutoff_norm` is the cutoff as a fraction of the sample rate, in
/// (0, 0.5). Taps are normalized for unity DC gain (`sum h = 1`). An even
/// `ntaps` is bumped to the next odd count.
pub fn lowpass_taps(cutoff_norm: f64, ntaps: usize) -> Vec<f32> {
    let ntaps = if ntaps % 2 == 0 { ntaps + 1 } else { ntaps };
    let m = (ntaps - 1) as f64;
    let mut h = vec![0.0f64; ntaps];

    for (n, tap) in h.iter_mut().enumerate() {
        let w = 0.54 - 0.46 * (2.0 * PI * n as f64 / m).cos();
        let x = n as f64 - m / 2.0;
        // sin(2*pi*fc*x) / (pi*x) tends to 2*fc at the center tap.
        let sinc = if x.abs() < 1e-7 {
            2.0 * cutoff_norm
        } else {
            (2.0 * PI * cutoff_norm * x).sin() / (PI * x)
        };
        *tap = sinc * w;
    }

    let sum: f64 = h.iter().sum();
    h.iter().map(|&v| (v / sum) as f32).collect()
}

/// Convolve a complex signal with real taps, center-tap aligned.
///
/// The signal is zero-padded on both ends; the output length equals the
/// input length.
pub fn convolve(sig: &[Complex32], taps: &[f32]) -> Vec<Complex32> {
    let delay = (taps.len() / 2) as isize;
    let len = sig.len() as isize;

    (0..len)
        .map(|n| {
            let mut acc = Complex32::new(0.0, 0.0);
            for (k, &tap) in taps.iter().enumerate() {
                let idx = n - delay + k as isize;
                if idx >= 0 && idx < len {
                    acc += sig[idx as usize] * tap;
                }
            }
            acc
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rrc_taps_have_unit_energy() {
        let h = rrc_taps(4.0, 1.0, 0.35, 8);
        let energy: f64 = h.iter().map(|&v| (v as f64) * (v as f64)).sum();
        assert_relative_eq!(energy, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn rrc_tap_count_is_odd() {
        for span in [4, 8, 11, 12] {
            let h = rrc_taps(18.75, 1.0, 0.8, span);
            assert_eq!(h.len() % 2, 1, "span {} gave even tap count", span);
        }
    }

    #[test]
    fn rrc_peak_is_at_center() {
        let h = rrc_taps(8.0, 1.0, 0.5, 10);
        let center = h.len() / 2;
        let peak = h
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.abs().partial_cmp(&b.1.abs()).unwrap())
            .unwrap()
            .0;
        assert_eq!(peak, center);
    }

    #[test]
    fn lowpass_taps_have_unity_dc_gain() {
        let h = lowpass_taps(0.05, 101);
        let sum: f64 = h.iter().map(|&v| v as f64).sum();
        assert_relative_eq!(sum, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn lowpass_even_request_is_bumped_to_odd() {
        assert_eq!(lowpass_taps(0.1, 100).len(), 101);
    }

    #[test]
    fn convolve_preserves_length() {
        let sig = vec![Complex32::new(1.0, -1.0); 37];
        let taps = lowpass_taps(0.2, 11);
        assert_eq!(convolve(&sig, &taps).len(), sig.len());
    }

    #[test]
    fn convolve_with_unit_impulse_is_identity() {
        let sig: Vec<Complex32> = (0..16)
            .map(|i| Complex32::new(i as f32, -(i as f32)))
            .collect();
        let out = convolve(&sig, &[1.0]);
        for (a, b) in sig.iter().zip(out.iter()) {
            assert_relative_eq!(a.re, b.re);
            assert_relative_eq!(a.im, b.im);
        }
    }

    #[test]
    fn lowpass_passes_dc_and_attenuates_high_frequency() {
        let taps = lowpass_taps(0.05, 101);
        let dc = vec![Complex32::new(1.0, 0.0); 400];
        let out = convolve(&dc, &taps);
        // Away from the edges the DC level is preserved.
        assert_relative_eq!(out[200].re, 1.0, epsilon = 1e-3);

        let hf: Vec<Complex32> = (0..400)
            .map(|i| Complex32::new(if i % 2 == 0 { 1.0 } else { -1.0 }, 0.0))
            .collect();
        let out = convolve(&hf, &taps);
        assert!(out[200].re.abs() < 1e-2);
    }
}
