//! Hard-decision slicing, bit mapping, and decision-directed EVM.

use num_complex::Complex32;

/// BPSK hard decision: +1 for non-negative, -1 otherwise.
pub fn slice_bpsk(sym: f32) -> f32 {
    if sym >= 0.0 {
        1.0
    } else {
        -1.0
    }
}

/// QPSK/OQPSK hard decision: nearest of the four (+-1, +-1) points.
pub fn slice_qpsk(sym: Complex32) -> Complex32 {
    Complex32::new(
        if sym.re >= 0.0 { 1.0 } else { -1.0 },
        if sym.im >= 0.0 { 1.0 } else { -1.0 },
    )
}

/// Decision-directed EVM for a real (BPSK) symbol stream.
///
/// A scalar gain is fitted first so the estimate is insensitive to the
/// absolute signal level, then the RMS residual against the scaled
/// decisions is reported as a fraction.
pub fn evm_bpsk(syms: &[f32]) -> f64 {
    let mut num = 0.0f64;
    let mut den = 0.0f64;
    for &s in syms {
        let r = slice_bpsk(s) as f64;
        num += r * s as f64;
        den += r * r;
    }
    let a = num / (den + 1e-30);

    let mut err_sum = 0.0f64;
    let mut ref_sum = 0.0f64;
    for &s in syms {
        let r = a * slice_bpsk(s) as f64;
        let e = s as f64 - r;
        err_sum += e * e;
        ref_sum += r * r;
    }
    (err_sum / (ref_sum + 1e-30)).sqrt()
}

/// Decision-directed EVM for a complex (OQPSK) symbol stream, with a
/// complex gain fit.
pub fn evm_qpsk(syms: &[Complex32]) -> f64 {
    let mut num_re = 0.0f64;
    let mut num_im = 0.0f64;
    let mut den = 0.0f64;
    for &s in syms {
        let r = slice_qpsk(s);
        // conj(ref) * sym, accumulated in f64
        num_re += (r.re * s.re + r.im * s.im) as f64;
        num_im += (r.re * s.im - r.im * s.re) as f64;
        den += (r.re * r.re + r.im * r.im) as f64;
    }
    let a_re = num_re / (den + 1e-30);
    let a_im = num_im / (den + 1e-30);

    let mut err_sum = 0.0f64;
    let mut ref_sum = 0.0f64;
    for &s in syms {
        let r = slice_qpsk(s);
        let ar_re = a_re * r.re as f64 - a_im * r.im as f64;
        let ar_im = a_re * r.im as f64 + a_im * r.re as f64;
        let e_re = s.re as f64 - ar_re;
        let e_im = s.im as f64 - ar_im;
        err_sum += e_re * e_re + e_im * e_im;
        ref_sum += ar_re * ar_re + ar_im * ar_im;
    }
    (err_sum / (ref_sum + 1e-30)).sqrt()
}

/// Recovered symbols from the timing loop, one variant per modulation.
#[derive(Debug, Clone)]
pub enum SymbolStream {
    /// BPSK: the interpolated I channel, one value per symbol.
    Real(Vec<f32>),
    /// OQPSK: (I, Q) pairs with the half-symbol Q offset already removed.
    Quadrature(Vec<Complex32>),
}

impl SymbolStream {
    pub fn len(&self) -> usize {
        match self {
            SymbolStream::Real(v) => v.len(),
            SymbolStream::Quadrature(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Hard-decide every symbol into unpacked bits. BPSK yields one bit per
    /// symbol; OQPSK yields the I bit then the Q bit.
    pub fn to_bits(&self) -> Vec<u8> {
        match self {
            SymbolStream::Real(v) => v
                .iter()
                .map(|&s| u8::from(s >= 0.0))
                .collect(),
            SymbolStream::Quadrature(v) => v
                .iter()
                .flat_map(|s| [u8::from(s.re >= 0.0), u8::from(s.im >= 0.0)])
                .collect(),
        }
    }

    /// Decision-directed EVM over the configured window: skip the pull-in
    /// symbols, then keep at most the trailing `last_syms`. Returns `None`
    /// when too few symbols survived for a meaningful estimate.
    pub fn evm_windowed(&self, skip_syms: usize, last_syms: usize) -> Option<f64> {
        let n = self.len();
        if n <= skip_syms + 1000 {
            return None;
        }
        let mut start = skip_syms;
        if last_syms > 0 && last_syms < n - start {
            start = n - last_syms;
        }
        Some(match self {
            SymbolStream::Real(v) => evm_bpsk(&v[start..]),
            SymbolStream::Quadrature(v) => evm_qpsk(&v[start..]),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn slicers_treat_zero_as_positive() {
        assert_eq!(slice_bpsk(0.0), 1.0);
        let d = slice_qpsk(Complex32::new(0.0, -0.1));
        assert_eq!((d.re, d.im), (1.0, -1.0));
    }

    #[test]
    fn bit_mapping_orders_i_then_q() {
        let stream = SymbolStream::Quadrature(vec![
            Complex32::new(0.9, -0.8),
            Complex32::new(-0.7, 0.6),
        ]);
        assert_eq!(stream.to_bits(), vec![1, 0, 0, 1]);
    }

    #[test]
    fn bpsk_bit_count_matches_symbol_count() {
        let stream = SymbolStream::Real(vec![0.5, -0.5, 0.1, -0.9, 1.0]);
        assert_eq!(stream.to_bits().len(), 5);
        assert_eq!(stream.to_bits(), vec![1, 0, 1, 0, 1]);
    }

    #[test]
    fn evm_is_zero_for_perfect_constellation() {
        let syms = vec![
            Complex32::new(1.0, 1.0),
            Complex32::new(-1.0, 1.0),
            Complex32::new(-1.0, -1.0),
            Complex32::new(1.0, -1.0),
        ];
        assert_relative_eq!(evm_qpsk(&syms), 0.0, epsilon = 1e-7);
        assert_relative_eq!(evm_bpsk(&[1.0, -1.0, 1.0]), 0.0, epsilon = 1e-7);
    }

    #[test]
    fn evm_is_gain_invariant() {
        let base = vec![
            Complex32::new(1.1, 0.9),
            Complex32::new(-0.9, 1.1),
            Complex32::new(-1.1, -0.9),
            Complex32::new(0.9, -1.1),
        ];
        let scaled: Vec<Complex32> = base.iter().map(|&s| s * 3.0).collect();
        assert_relative_eq!(evm_qpsk(&base), evm_qpsk(&scaled), epsilon = 1e-5);
    }

    #[test]
    fn evm_grows_with_noise() {
        let clean: Vec<f32> = (0..100).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        let noisy: Vec<f32> = clean
            .iter()
            .enumerate()
            .map(|(i, &s)| s + if i % 3 == 0 { 0.2 } else { -0.1 })
            .collect();
        assert!(evm_bpsk(&noisy) > evm_bpsk(&clean));
    }

    #[test]
    fn windowed_evm_requires_enough_symbols() {
        let stream = SymbolStream::Real(vec![1.0; 500]);
        assert!(stream.evm_windowed(5000, 0).is_none());

        let stream = SymbolStream::Real(vec![1.0; 2000]);
        assert!(stream.evm_windowed(100, 0).is_some());
    }
}
