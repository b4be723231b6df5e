//! Configuration types for the demodulation pipeline.
//!
//! Every tunable of the receive chain lives in [`DemodConfig`]. The record is
//! read-only for the duration of a run; each stage borrows the subset it
//! needs. The compile-time toggles of older firmware-style demodulators are
//! runtime fields here so batch sweeps and auto-tune can flip them.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Modulation scheme for the incoming baseband.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Modulation {
    /// Binary PSK, one bit per symbol.
    Bpsk,
    /// Offset QPSK, two bits per symbol, Q delayed half a symbol.
    #[default]
    Oqpsk,
}

impl Modulation {
    pub fn bits_per_symbol(self) -> u32 {
        match self {
            Modulation::Bpsk => 1,
            Modulation::Oqpsk => 2,
        }
    }
}

/// On-disk sample format of the IQ capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IqFormat {
    /// Interleaved little-endian `i16` pairs, I first.
    #[default]
    Iq16,
    /// Interleaved little-endian `i32` pairs, I first.
    Iq32,
}

impl IqFormat {
    pub fn bytes_per_component(self) -> usize {
        match self {
            IqFormat::Iq16 => 2,
            IqFormat::Iq32 => 4,
        }
    }

    /// Volts represented by one ADC count at the given full-scale Vpp.
    pub fn volts_per_count(self, fs_vpp: f64) -> f64 {
        let vpk = fs_vpp / 2.0;
        match self {
            IqFormat::Iq16 => vpk / 32768.0,
            IqFormat::Iq32 => vpk / 2147483648.0,
        }
    }
}

/// Proportional/integral gain pair for a tracking loop.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LoopGains {
    pub alpha: f64,
    pub beta: f64,
}

/// Root-raised-cosine matched filter settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RrcConfig {
    pub enable: bool,
    /// Roll-off factor in (0, 1].
    pub rolloff: f64,
    /// Filter span in symbols.
    pub span: usize,
    /// Drop the group delay from the head of the filtered signal.
    pub trim_delay: bool,
}

impl Default for RrcConfig {
    fn default() -> Self {
        Self {
            enable: true,
            rolloff: 0.8,
            span: 12,
            trim_delay: false,
        }
    }
}

/// Pre-demodulation low-pass filter settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LowpassConfig {
    pub enable: bool,
    /// Raw cutoff control; the preprocessor maps it to
    /// `min(cutoff / 150, 0.45)` of the sample rate.
    pub cutoff: f64,
    pub taps: usize,
}

impl Default for LowpassConfig {
    fn default() -> Self {
        Self {
            enable: true,
            cutoff: 7.5,
            taps: 101,
        }
    }
}

/// ADC scaling used to express samples in volts and power in watts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalingConfig {
    /// Full-scale peak-to-peak voltage of the capture front end.
    pub fs_vpp: f64,
    /// Load resistance in ohms.
    pub rload: f64,
}

impl Default for ScalingConfig {
    fn default() -> Self {
        Self {
            fs_vpp: 1.475,
            rload: 50.0,
        }
    }
}

/// Window over which decision-directed EVM is estimated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvmWindow {
    /// Symbols to skip while the loops pull in.
    pub skip_syms: usize,
    /// Truncate to at most this many trailing symbols (0 = no cap).
    pub last_syms: usize,
}

impl Default for EvmWindow {
    fn default() -> Self {
        Self {
            skip_syms: 5000,
            last_syms: 600_000,
        }
    }
}

/// Post-demodulation bit-stream stages, applied Viterbi -> NRZ-M -> PN.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Hand the packed stream to an external rate-1/2 Viterbi decoder.
    pub viterbi: bool,
    /// NRZ-M differential decoding.
    pub nrzm: bool,
    /// Invert flag for the NRZ-M decoder.
    pub nrzm_invert: bool,
    /// Frame-synchronous CCSDS pseudo-random descrambling.
    pub descramble: bool,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            viterbi: false,
            nrzm: true,
            nrzm_invert: false,
            descramble: true,
        }
    }
}

/// Destination for the optional demodulated-bit UDP stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UdpConfig {
    pub host: String,
    pub port: u16,
    /// Unpacked bytes per datagram.
    pub chunk_size: usize,
    /// Inter-packet delay in milliseconds.
    pub delay_ms: u64,
}

impl Default for UdpConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 4040,
            chunk_size: 40928,
            delay_ms: 100,
        }
    }
}

/// Complete configuration for one demodulation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemodConfig {
    /// Path to the raw IQ capture.
    pub input_file: PathBuf,
    pub input_format: IqFormat,
    pub modulation: Modulation,

    /// Decimation factor applied after the low-pass filter.
    pub decim: usize,
    /// Nominal samples per symbol before decimation.
    pub sps: f64,
    /// Bit rate in bit/s. The symbol rate follows from the modulation.
    pub rb: f64,

    pub costas: LoopGains,
    pub timing: LoopGains,

    pub rrc: RrcConfig,
    pub lowpass: LowpassConfig,
    pub scaling: ScalingConfig,
    pub evm: EvmWindow,
    pub chain: ChainConfig,

    /// Grid-search the loop gains before the final run.
    pub auto_tune: bool,
    /// Stream the demodulated bits over UDP when set.
    pub udp: Option<UdpConfig>,
}

impl Default for DemodConfig {
    fn default() -> Self {
        Self {
            input_file: PathBuf::from("input.iq"),
            input_format: IqFormat::default(),
            modulation: Modulation::default(),
            decim: 5,
            sps: 18.75,
            rb: 160e6,
            costas: LoopGains {
                alpha: 0.01,
                beta: 0.0005,
            },
            timing: LoopGains {
                alpha: 0.1,
                beta: 0.005,
            },
            rrc: RrcConfig::default(),
            lowpass: LowpassConfig::default(),
            scaling: ScalingConfig::default(),
            evm: EvmWindow::default(),
            chain: ChainConfig::default(),
            auto_tune: false,
            udp: None,
        }
    }
}

impl DemodConfig {
    /// Symbol rate in symbols/s, derived from the bit rate and modulation.
    ///
    /// OQPSK carries two bits per symbol, so its matched filter is built for
    /// `rb / 2`; BPSK runs the filter at the full bit rate.
    pub fn symbol_rate(&self) -> f64 {
        self.rb / f64::from(self.modulation.bits_per_symbol())
    }

    /// Effective samples per symbol after decimation.
    pub fn effective_sps(&self) -> f64 {
        self.sps / self.decim as f64
    }

    /// Validate the record once at startup. Everything past this point
    /// treats the configuration as trusted.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.sps.is_finite() && self.sps > 0.0) {
            return Err(ConfigError::InvalidSamplesPerSymbol { sps: self.sps });
        }
        if self.decim == 0 {
            return Err(ConfigError::InvalidDecimation { decim: self.decim });
        }
        if !(self.rb.is_finite() && self.rb > 0.0) {
            return Err(ConfigError::InvalidSymbolRate { rate: self.rb });
        }
        for (name, value) in [
            ("costas.alpha", self.costas.alpha),
            ("costas.beta", self.costas.beta),
            ("timing.alpha", self.timing.alpha),
            ("timing.beta", self.timing.beta),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NonFiniteGain { name, value });
            }
        }
        if self.rrc.enable {
            if self.rrc.span == 0 {
                return Err(ConfigError::InvalidRrcSpan { span: self.rrc.span });
            }
            if !(self.rrc.rolloff.is_finite()
                && self.rrc.rolloff > 0.0
                && self.rrc.rolloff <= 1.0)
            {
                return Err(ConfigError::InvalidRrcRolloff {
                    alpha: self.rrc.rolloff,
                });
            }
        }
        if self.lowpass.enable {
            if self.lowpass.taps < 3 {
                return Err(ConfigError::InvalidLowpass {
                    reason: format!("{} taps (need at least 3)", self.lowpass.taps),
                });
            }
            if !(self.lowpass.cutoff.is_finite() && self.lowpass.cutoff > 0.0) {
                return Err(ConfigError::InvalidLowpass {
                    reason: format!("cutoff {}", self.lowpass.cutoff),
                });
            }
        }
        if !(self.scaling.rload.is_finite() && self.scaling.rload > 0.0) {
            return Err(ConfigError::InvalidLoadResistance {
                ohms: self.scaling.rload,
            });
        }
        Ok(())
    }
}
