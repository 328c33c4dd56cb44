//! Benchmarks for the individual effects.

mod biquad;
mod convolution;
mod delay;
mod modulation;

pub use biquad::bench_biquad;
pub use convolution::bench_convolution;
pub use delay::bench_delay;
pub use modulation::bench_modulation;
