//! Error taxonomy shared by every effect constructor and the period loop.
//!
//! All validation happens at construction time. Once an effect exists its
//! `apply` path has no failure mode, so nothing in here is ever produced from
//! inside the per-sample code.

use std::fmt;

use thiserror::Error;

use crate::engine::StreamError;

pub type Result<T> = std::result::Result<T, DspError>;

#[derive(Debug, Error)]
pub enum DspError {
    /// A construction-time parameter fell outside its allowed range.
    #[error("invalid parameter `{name}` = {value} (allowed {}..={})", .range.0, .range.1)]
    InvalidParameter {
        name: &'static str,
        value: f32,
        range: (f32, f32),
    },

    #[error("invalid biquad response type `{0}`")]
    InvalidResponseType(String),

    /// A delay or history buffer could not be allocated.
    #[error("could not allocate a buffer of {requested} samples")]
    ResourceExhaustion { requested: usize },

    #[error("unsupported impulse response: {0}")]
    UnsupportedSource(String),

    #[error("period size {0} must be a non-zero multiple of 4")]
    InvalidPeriodSize(usize),

    #[error("impulse response length limit {0} must be a non-zero multiple of 4")]
    InvalidIrLength(usize),

    #[error("could not decode audio file: {0}")]
    Decode(#[from] hound::Error),

    #[error("audio stream failed: {0}")]
    Stream(#[from] StreamError),
}

impl DspError {
    /// Check that `value` lies in `min..=max`, naming the parameter on failure.
    ///
    /// NaN never passes.
    pub(crate) fn check_range(name: &'static str, value: f32, min: f32, max: f32) -> Result<()> {
        if value >= min && value <= max {
            Ok(())
        } else {
            Err(DspError::InvalidParameter {
                name,
                value,
                range: (min, max),
            })
        }
    }
}

/// Allocate a zeroed sample buffer, reporting allocation failure instead of
/// aborting.
pub(crate) fn zeroed_buffer(len: usize) -> Result<Vec<f32>> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(len)
        .map_err(|_| DspError::ResourceExhaustion { requested: len })?;
    buffer.resize(len, 0.0);
    Ok(buffer)
}

/// Non-fatal warning: the impulse response was longer than the configured
/// limit and only its head is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Truncated {
    pub max_len: usize,
    pub source_len: usize,
}

impl fmt::Display for Truncated {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "impulse responses are limited to {} samples; the supplied file contains {}, so it will be truncated",
            self.max_len, self.source_len
        )
    }
}
