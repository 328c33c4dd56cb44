//! Blocking period I/O over lock-free rings.
//!
//! Callback-driven audio APIs push and pull samples on their own thread.
//! [`RingIo`] turns that into the blocking read/write contract of
//! [`AudioIo`]: the processing thread waits on the rings, the device
//! callbacks never wait on anything.
//!
//! ```text
//!   capture callback ──[CaptureEnd]══ring══▶ RingIo::read_period
//!                                                  │ chain
//!   playback callback ◀═ring══[PlaybackEnd]── RingIo::write_period
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use log::debug;
use rtrb::{Consumer, Producer, RingBuffer};

use crate::engine::{AudioIo, StreamError};

const POLL_INTERVAL: Duration = Duration::from_micros(250);

/// Device-side producer for captured samples. Never blocks.
pub struct CaptureEnd {
    producer: Producer<f32>,
    xruns: Arc<AtomicUsize>,
}

impl CaptureEnd {
    /// Queue one captured sample; a full ring counts as an overrun.
    #[inline]
    pub fn push(&mut self, sample: f32) {
        if self.producer.push(sample).is_err() {
            self.xruns.fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// Device-side consumer for processed samples. Never blocks.
pub struct PlaybackEnd {
    consumer: Consumer<f32>,
    xruns: Arc<AtomicUsize>,
}

impl PlaybackEnd {
    /// Next sample to play; an empty ring counts as an underrun and plays
    /// silence.
    #[inline]
    pub fn pop(&mut self) -> f32 {
        match self.consumer.pop() {
            Ok(sample) => sample,
            Err(_) => {
                self.xruns.fetch_add(1, Ordering::Relaxed);
                0.0
            }
        }
    }
}

pub struct RingIo {
    input: Consumer<f32>,
    output: Producer<f32>,
    xruns: Arc<AtomicUsize>,
    seen_xruns: usize,
    period_size: usize,
    periods: usize,
    timeout: Duration,
}

impl RingIo {
    /// Build the processing side and the two device sides.
    ///
    /// Each ring holds `periods + 2` periods. The playback ring starts with
    /// `periods` periods of silence queued so the device has something to
    /// play before the first processed block arrives.
    pub fn new(
        period_size: usize,
        periods: usize,
        timeout: Duration,
    ) -> (Self, CaptureEnd, PlaybackEnd) {
        let capacity = period_size * (periods + 2);
        let (capture_tx, capture_rx) = RingBuffer::<f32>::new(capacity);
        let (playback_tx, playback_rx) = RingBuffer::<f32>::new(capacity);
        let xruns = Arc::new(AtomicUsize::new(0));

        let mut io = Self {
            input: capture_rx,
            output: playback_tx,
            xruns: Arc::clone(&xruns),
            seen_xruns: 0,
            period_size,
            periods,
            timeout,
        };
        io.prime();

        (
            io,
            CaptureEnd {
                producer: capture_tx,
                xruns: Arc::clone(&xruns),
            },
            PlaybackEnd {
                consumer: playback_rx,
                xruns,
            },
        )
    }

    /// Total under- and overruns counted by the device sides.
    pub fn xruns(&self) -> usize {
        self.xruns.load(Ordering::Relaxed)
    }

    fn prime(&mut self) {
        let silence = self.period_size * self.periods;
        for _ in 0..silence.min(self.output.slots()) {
            let _ = self.output.push(0.0);
        }
    }

    fn check_xruns(&mut self) -> Result<(), StreamError> {
        let count = self.xruns();
        if count != self.seen_xruns {
            self.seen_xruns = count;
            Err(StreamError::Xrun)
        } else {
            Ok(())
        }
    }

    /// Poll until `ready` holds, the peer hangs up, or the timeout passes.
    fn wait(
        &self,
        mut ready: impl FnMut() -> bool,
        abandoned: impl Fn() -> bool,
    ) -> Result<(), StreamError> {
        let deadline = Instant::now() + self.timeout;
        while !ready() {
            if abandoned() {
                return Err(StreamError::Closed);
            }
            if Instant::now() >= deadline {
                return Err(StreamError::Timeout);
            }
            thread::sleep(POLL_INTERVAL);
        }
        Ok(())
    }
}

impl AudioIo for RingIo {
    fn read_period(&mut self, input: &mut [f32]) -> Result<usize, StreamError> {
        self.check_xruns()?;

        let wanted = input.len();
        let rx = &self.input;
        self.wait(|| rx.slots() >= wanted, || rx.is_abandoned())?;

        let mut moved = 0;
        for slot in input.iter_mut() {
            match self.input.pop() {
                Ok(sample) => {
                    *slot = sample;
                    moved += 1;
                }
                Err(_) => break,
            }
        }
        Ok(moved)
    }

    fn write_period(&mut self, output: &[f32]) -> Result<usize, StreamError> {
        let wanted = output.len();
        let tx = &self.output;
        self.wait(|| tx.slots() >= wanted, || tx.is_abandoned())?;

        let mut moved = 0;
        for &sample in output {
            if self.output.push(sample).is_err() {
                break;
            }
            moved += 1;
        }
        Ok(moved)
    }

    /// Drop stale capture data and re-prime playback with silence.
    fn recover(&mut self, error: &StreamError) -> Result<(), StreamError> {
        match error {
            StreamError::Xrun | StreamError::Timeout => {
                let stale = self.input.slots();
                for _ in 0..stale {
                    let _ = self.input.pop();
                }
                self.prime();
                self.seen_xruns = self.xruns();
                debug!("ring recovered: dropped {stale} stale input samples");
                Ok(())
            }
            other => Err(other.clone()),
        }
    }
}
