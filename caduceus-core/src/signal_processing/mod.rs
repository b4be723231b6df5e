//! DSP primitives for the receive chain.
//!
//! This module covers the format-agnostic half of the pipeline:
//! - FIR design (RRC matched filter, Hamming-windowed low-pass) and
//!   convolution
//! - Costas loop carrier recovery
//! - Mueller & Muller symbol timing recovery
//! - Hard-decision slicing and decision-directed EVM
//!
//! Only the frame layer knows about CCSDS semantics; nothing here does.

pub mod carrier;
pub mod filters;
pub mod symbols;
pub mod timing;

// Re-export commonly used items
pub use carrier::CostasLoop;
pub use filters::{convolve, lowpass_taps, rrc_taps};
pub use symbols::{evm_bpsk, evm_qpsk, SymbolStream};
pub use timing::{interpolate, LoopStatus, TimingLoop, TimingResult};
