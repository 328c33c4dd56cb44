//! Per-effect DSP building blocks.
//!
//! Every type validates its parameters and allocates its buffers in `new`.
//! After that the per-sample and per-block paths are allocation-free and have
//! no error path, so they are safe to call from the audio thread.

/// Bilinear-transform biquad and the `SampleFilter` seam.
pub mod biquad;
/// Block FIR convolution with 4-lane SIMD.
pub mod convolution;
/// Circular delay line with integer and interpolated taps.
pub mod delay;
/// Forward-wrapping feedback delay (echo).
pub mod echo;
/// Control-rate oscillator.
pub mod lfo;
/// Chorus and flange.
pub mod modulation;
pub mod tremolo;

pub use biquad::{BiquadFilter, BiquadType, Bypass, SampleFilter};
pub use convolution::ConvolutionEngine;
pub use delay::DelayLine;
pub use echo::FeedbackDelay;
pub use lfo::Lfo;
pub use modulation::TimeModulation;
pub use tremolo::Tremolo;
