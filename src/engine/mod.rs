//! The period loop: read a block, run the chain, write a block.
//!
//! One thread drives everything. The only places it may block are the two
//! transfer calls on [`AudioIo`]; the chain itself never waits, allocates or
//! touches I/O.

use log::{debug, error, info, warn};
use thiserror::Error;

use crate::chain::EffectChain;
use crate::error::{DspError, Result};

/// Failures reported by an audio I/O collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    /// Underrun or overrun. Recoverable.
    #[error("buffer underrun/overrun")]
    Xrun,

    /// The device moved fewer frames than a full period.
    #[error("did not transfer the requested number of frames (expected {expected}, got {got})")]
    Short { expected: usize, got: usize },

    #[error("timed out waiting for the audio device")]
    Timeout,

    /// Clean end of stream.
    #[error("stream closed")]
    Closed,

    #[error("audio device error: {0}")]
    Device(String),
}

/// Blocking audio I/O, one period at a time.
///
/// Both transfer calls block until a full period is available and return the
/// number of frames moved.
pub trait AudioIo {
    fn read_period(&mut self, input: &mut [f32]) -> std::result::Result<usize, StreamError>;

    fn write_period(&mut self, output: &[f32]) -> std::result::Result<usize, StreamError>;

    /// Bring the stream back after `error`. Called at most once per failed
    /// transfer.
    fn recover(&mut self, error: &StreamError) -> std::result::Result<(), StreamError>;
}

/// Run the chain until the stream closes or fails.
///
/// A failed transfer gets one `recover` and one retry. A second failure, or
/// any short transfer, ends the loop with [`DspError::Stream`]. A clean
/// [`StreamError::Closed`] ends it with the number of periods processed.
pub fn run<I: AudioIo + ?Sized>(io: &mut I, chain: &mut EffectChain<'_>) -> Result<u64> {
    let period = chain.period_size();
    let mut periods = 0u64;
    info!(
        "running: {} samples per period at {} Hz",
        period,
        chain.sample_rate()
    );

    let outcome = loop {
        if let Err(err) = transfer(io, period, |io| io.read_period(chain.input_mut())) {
            break err;
        }

        chain.process_period();

        if let Err(err) = transfer(io, period, |io| io.write_period(chain.output())) {
            break err;
        }

        periods += 1;
    };

    match outcome {
        StreamError::Closed => {
            info!("stream closed after {periods} periods");
            Ok(periods)
        }
        err => {
            error!("stopping after {periods} periods: {err}");
            Err(DspError::Stream(err))
        }
    }
}

fn transfer<I, F>(io: &mut I, expected: usize, mut op: F) -> std::result::Result<(), StreamError>
where
    I: AudioIo + ?Sized,
    F: FnMut(&mut I) -> std::result::Result<usize, StreamError>,
{
    let moved = match op(io) {
        Ok(moved) => moved,
        Err(StreamError::Closed) => return Err(StreamError::Closed),
        Err(err) => {
            warn!("{err}, recovering");
            io.recover(&err)?;
            let moved = op(io)?;
            debug!("recovered from {err}");
            moved
        }
    };

    if moved == expected {
        Ok(())
    } else {
        Err(StreamError::Short {
            expected,
            got: moved,
        })
    }
}
