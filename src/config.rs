//! Startup configuration for the effect chain.
//!
//! An [`EngineConfig`] is built once, before any effect exists, and handed to
//! [`EffectChain::new`](crate::chain::EffectChain::new) by reference. Every
//! sample-wise effect is an `Option`: `None` leaves it out of the chain
//! entirely.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::biquad::BiquadType;
use crate::io::converter::db_to_amp;
use crate::{DEFAULT_IR_LENGTH, DEFAULT_PERIODS, DEFAULT_PERIOD_SIZE};

pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterSettings {
    pub kind: BiquadType,
    pub cutoff_hz: f32,
    pub q: f32,
}

impl FilterSettings {
    pub fn new(kind: BiquadType, cutoff_hz: f32, q: f32) -> Self {
        Self { kind, cutoff_hz, q }
    }

    /// The low-cut used ahead of the modulation effects.
    pub fn lowcut() -> Self {
        Self::new(BiquadType::HighPass, 150.0, 0.707)
    }

    /// The 2 kHz lowpass used to warm up repeats.
    pub fn warm() -> Self {
        Self::new(BiquadType::LowPass, 2_000.0, 0.707)
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TremoloSettings {
    pub depth: f32,
    pub rate_hz: f32,
}

impl Default for TremoloSettings {
    fn default() -> Self {
        Self {
            depth: 0.4,
            rate_hz: 3.5,
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChorusSettings {
    pub depth: f32,
    pub excursion: f32,
    pub feedback: f32,
    pub delay_ms: f32,
    pub rate_hz: f32,
    /// Filter on the delay line's write path.
    pub lowpass: Option<FilterSettings>,
}

impl Default for ChorusSettings {
    fn default() -> Self {
        Self {
            depth: 1.0,
            excursion: 0.2,
            feedback: 0.0,
            delay_ms: 5.0,
            rate_hz: 1.0,
            lowpass: Some(FilterSettings::warm()),
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DelaySettings {
    pub feedback: f32,
    pub mix: f32,
    pub delay_ms: f32,
    /// Filter inside the feedback loop.
    pub lowpass: Option<FilterSettings>,
}

impl Default for DelaySettings {
    fn default() -> Self {
        Self {
            feedback: db_to_amp(-10.0),
            mix: 0.3,
            delay_ms: 250.0,
            lowpass: Some(FilterSettings::warm()),
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Used unless an impulse response brings its own rate.
    pub sample_rate: u32,
    /// Samples per I/O transfer; a non-zero multiple of 4.
    pub period_size: usize,
    /// Periods buffered by the device in each direction.
    pub periods: usize,
    /// Longest impulse response kept; a non-zero multiple of 4.
    pub max_ir_length: usize,
    /// Linear gain applied after convolution.
    pub gain: f32,
    pub highpass: Option<FilterSettings>,
    pub tremolo: Option<TremoloSettings>,
    pub chorus: Option<ChorusSettings>,
    pub delay: Option<DelaySettings>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            period_size: DEFAULT_PERIOD_SIZE,
            periods: DEFAULT_PERIODS,
            max_ir_length: DEFAULT_IR_LENGTH,
            gain: 1.0,
            highpass: None,
            tremolo: None,
            chorus: None,
            delay: None,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_period_size(mut self, period_size: usize) -> Self {
        self.period_size = period_size;
        self
    }

    pub fn with_periods(mut self, periods: usize) -> Self {
        self.periods = periods;
        self
    }

    pub fn with_max_ir_length(mut self, max_ir_length: usize) -> Self {
        self.max_ir_length = max_ir_length;
        self
    }

    /// Linear gain. See [`db_to_amp`] for decibels.
    pub fn with_gain(mut self, gain: f32) -> Self {
        self.gain = gain;
        self
    }

    pub fn with_highpass(mut self, settings: FilterSettings) -> Self {
        self.highpass = Some(settings);
        self
    }

    pub fn with_tremolo(mut self, settings: TremoloSettings) -> Self {
        self.tremolo = Some(settings);
        self
    }

    pub fn with_chorus(mut self, settings: ChorusSettings) -> Self {
        self.chorus = Some(settings);
        self
    }

    pub fn with_delay(mut self, settings: DelaySettings) -> Self {
        self.delay = Some(settings);
        self
    }

    /// Period length in seconds: the deadline for one pass of the chain.
    pub fn period_seconds(&self) -> f64 {
        self.period_size as f64 / f64::from(self.sample_rate)
    }
}
