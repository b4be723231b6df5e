//! Error types for the demodulation pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for Caduceus operations.
///
/// Only startup-time problems are fatal: a missing input file or an invalid
/// configuration. The DSP stages report divergence through their return
/// values, and the frame layer counts per-frame failures instead of raising.
#[derive(Debug, Error)]
pub enum DemodError {
    #[error("Input error: {0}")]
    Input(#[from] InputError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors raised while opening or reading the IQ capture.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("Cannot open input file {}: {source}", path.display())]
    Unavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Input file {} is too short: {bytes} bytes", path.display())]
    Truncated { path: PathBuf, bytes: usize },
}

/// Configuration validation errors, checked once at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid samples per symbol: {sps} (must be finite and > 0)")]
    InvalidSamplesPerSymbol { sps: f64 },

    #[error("Invalid decimation factor: {decim} (must be >= 1)")]
    InvalidDecimation { decim: usize },

    #[error("Invalid symbol rate: {rate} baud (must be finite and > 0)")]
    InvalidSymbolRate { rate: f64 },

    #[error("Loop gain {name} is not finite: {value}")]
    NonFiniteGain { name: &'static str, value: f64 },

    #[error("Invalid RRC span: {span} symbols (must be >= 1)")]
    InvalidRrcSpan { span: usize },

    #[error("Invalid RRC roll-off: {alpha} (must be in (0, 1])")]
    InvalidRrcRolloff { alpha: f64 },

    #[error("Invalid low-pass filter: {reason}")]
    InvalidLowpass { reason: String },

    #[error("Invalid load resistance: {ohms} ohms (must be > 0)")]
    InvalidLoadResistance { ohms: f64 },
}

/// Result type alias for Caduceus operations.
pub type Result<T> = std::result::Result<T, DemodError>;
