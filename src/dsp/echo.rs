//! Feedback delay (echo) with an injectable filter in the feedback loop.

use crate::dsp::biquad::SampleFilter;
use crate::dsp::delay::delay_samples;
use crate::error::{zeroed_buffer, DspError, Result};

/*
Feedback Delay
==============

    y[n] = x[n] + mix · line[pos]
    line[pos] ← filter(x[n] + feedback · line[pos])
    pos ← (pos + 1) mod len

Each trip around the ring multiplies the echo by `feedback`, so an impulse
comes back as 1, g, g², g³, ... spaced one delay time apart. Putting a
lowpass in the loop darkens each repeat a little more than the last, the
way tape and bucket-brigade delays do.

This ring walks forwards and wraps by modulo, unlike the retreating cursor
of `dsp::delay`. The two conventions place samples differently.
*/

pub const MAX_ECHO_DELAY_MS: f32 = 1000.0;
pub const MIN_ECHO_SAMPLE_RATE: u32 = 44_100;
pub const MAX_ECHO_SAMPLE_RATE: u32 = 48_000;

pub struct FeedbackDelay {
    buffer: Vec<f32>,
    pos: usize,
    feedback: f32,
    mix: f32,
    feedback_filter: Option<Box<dyn SampleFilter + Send>>,
}

impl FeedbackDelay {
    /// `feedback` and `mix` in 0..=1, `delay_ms` in 0..=1000, sample rate
    /// 44.1..=48 kHz.
    ///
    /// A zero delay time still keeps one sample of history.
    pub fn new(feedback: f32, mix: f32, sample_rate: u32, delay_ms: f32) -> Result<Self> {
        DspError::check_range("feedback", feedback, 0.0, 1.0)?;
        DspError::check_range("mix", mix, 0.0, 1.0)?;
        DspError::check_range("delay_ms", delay_ms, 0.0, MAX_ECHO_DELAY_MS)?;
        DspError::check_range(
            "sample_rate",
            sample_rate as f32,
            MIN_ECHO_SAMPLE_RATE as f32,
            MAX_ECHO_SAMPLE_RATE as f32,
        )?;

        let len = delay_samples(delay_ms, sample_rate).max(1);

        Ok(Self {
            buffer: zeroed_buffer(len)?,
            pos: 0,
            feedback,
            mix,
            feedback_filter: None,
        })
    }

    /// Run every fed-back sample through `filter` before it is stored.
    pub fn with_feedback_filter(mut self, filter: impl SampleFilter + Send + 'static) -> Self {
        self.feedback_filter = Some(Box::new(filter));
        self
    }

    /// Ring length in samples; never below one.
    pub fn ring_len(&self) -> usize {
        self.buffer.len()
    }

    #[inline]
    pub fn apply(&mut self, sample: f32) -> f32 {
        let delayed = self.buffer[self.pos];
        let output = sample + self.mix * delayed;

        let mut fed_back = sample + self.feedback * delayed;
        if let Some(filter) = self.feedback_filter.as_mut() {
            fed_back = filter.apply(fed_back);
        }
        self.buffer[self.pos] = fed_back;
        self.pos = (self.pos + 1) % self.buffer.len();

        output
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.pos = 0;
    }
}
