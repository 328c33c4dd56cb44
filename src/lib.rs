pub mod chain; // Fixed-order effect chain
pub mod config;
pub mod dsp;
pub mod engine; // Period loop and the audio I/O seam
pub mod error;
pub mod io;

pub use chain::{ChainFilters, EffectChain};
pub use config::EngineConfig;
pub use error::{DspError, Result, Truncated};

/// SIMD lane width; period sizes and IR lengths are multiples of it.
pub const LANES: usize = 4;
/// Samples moved per device transfer.
pub const DEFAULT_PERIOD_SIZE: usize = 64;
/// Longer impulse responses are truncated. Dominates the per-period cost.
pub const DEFAULT_IR_LENGTH: usize = 1440;
/// Periods buffered by the device in each direction.
pub const DEFAULT_PERIODS: usize = 2;
