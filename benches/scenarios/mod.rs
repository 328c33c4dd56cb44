//! Real-world scenario benchmarks.
//!
//! Whole effect chains as they run on the audio thread, one period per
//! iteration.

mod chain;

pub use chain::bench_chain;
