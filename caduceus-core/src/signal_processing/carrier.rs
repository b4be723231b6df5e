//! Costas loop carrier recovery.
//!
//! A second-order PLL with a modulation-wiping phase detector. The BPSK
//! variant uses `sign(I) * Q`; the OQPSK/QPSK variant uses
//! `sign(I) * Q - sign(Q) * I`. Loop state is kept in double precision so
//! small integral gains do not quantize away.

use std::f64::consts::PI;

use num_complex::Complex32;

use crate::config::Modulation;

/// Carrier recovery loop state.
#[derive(Debug, Clone)]
pub struct CostasLoop {
    phase: f64,
    freq: f64,
    alpha: f64,
    beta: f64,
    modulation: Modulation,
}

impl CostasLoop {
    pub fn new(modulation: Modulation, alpha: f64, beta: f64) -> Self {
        Self {
            phase: 0.0,
            freq: 0.0,
            alpha,
            beta,
            modulation,
        }
    }

    /// Run the loop over the whole buffer, returning the phase-corrected
    /// samples. The output length always equals the input length.
    pub fn process(&mut self, input: &[Complex32]) -> Vec<Complex32> {
        let mut out = Vec::with_capacity(input.len());
        for &sample in input {
            out.push(self.step(sample));
        }
        out
    }

    /// Advance the loop by one sample.
    pub fn step(&mut self, sample: Complex32) -> Complex32 {
        let (sin, cos) = (-self.phase).sin_cos();
        let rotated = sample * Complex32::new(cos as f32, sin as f32);

        // sign(0) is taken as +1, hence copysign rather than signum.
        let err = match self.modulation {
            Modulation::Bpsk => {
                f64::copysign(1.0, rotated.re as f64) * rotated.im as f64
            }
            Modulation::Oqpsk => {
                f64::copysign(1.0, rotated.re as f64) * rotated.im as f64
                    - f64::copysign(1.0, rotated.im as f64) * rotated.re as f64
            }
        };

        self.freq += self.beta * err;
        self.phase += self.freq + self.alpha * err;

        while self.phase > PI {
            self.phase -= 2.0 * PI;
        }
        while self.phase < -PI {
            self.phase += 2.0 * PI;
        }

        rotated
    }

    /// Current frequency estimate in radians per sample.
    pub fn frequency(&self) -> f64 {
        self.freq
    }

    /// Current phase estimate in radians, wrapped to (-pi, pi].
    pub fn phase(&self) -> f64 {
        self.phase
    }
}
