//! The fixed-order guitar effect chain.

use log::{info, warn};

use crate::config::{EngineConfig, FilterSettings};
use crate::dsp::biquad::BiquadFilter;
use crate::dsp::convolution::{ConvolutionEngine, SUPPORTED_RATES};
use crate::dsp::echo::FeedbackDelay;
use crate::dsp::lfo::Lfo;
use crate::dsp::modulation::TimeModulation;
use crate::dsp::tremolo::Tremolo;
use crate::error::{zeroed_buffer, DspError, Result};
use crate::io::ImpulseResponse;
use crate::LANES;

/*
Signal Flow
===========

    input ─→ [convolution] ─→ ×gain ─→ [highpass] ─→ [tremolo] ─→ [chorus] ─→ [delay] ─→ output
              once per                 └───────────── once per sample ─────────────┘
              period

Convolution works on whole periods, so it runs first and fills the block.
Everything after it walks that block one sample at a time. Effects left out
of the config are not built at all; the sample passes them untouched.

When an impulse response is supplied its sample rate wins over the
configured one, and every other effect is designed for that rate.
*/

/// Filters the chain lends to its effects instead of owning.
///
/// Keep this alive for as long as the [`EffectChain`] built from it. It can
/// be inspected or reset once the chain is gone.
#[derive(Debug, Default)]
pub struct ChainFilters {
    pub chorus_lowpass: Option<BiquadFilter>,
}

pub struct EffectChain<'a> {
    sample_rate: u32,
    period_size: usize,
    gain: f32,
    convolution: Option<ConvolutionEngine>,
    highpass: Option<BiquadFilter>,
    tremolo: Option<Tremolo>,
    chorus: Option<TimeModulation<'a>>,
    delay: Option<FeedbackDelay>,
    block: Vec<f32>,
}

impl std::fmt::Debug for EffectChain<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectChain")
            .field("sample_rate", &self.sample_rate)
            .field("period_size", &self.period_size)
            .field("gain", &self.gain)
            .finish_non_exhaustive()
    }
}

impl<'a> EffectChain<'a> {
    pub fn new(
        config: &EngineConfig,
        ir: Option<&ImpulseResponse>,
        filters: &'a mut ChainFilters,
    ) -> Result<Self> {
        let period_size = config.period_size;
        if period_size == 0 || period_size % LANES != 0 {
            return Err(DspError::InvalidPeriodSize(period_size));
        }

        // Convolution first: the IR decides the sample rate.
        let (convolution, sample_rate) = match ir {
            Some(ir) => {
                let (engine, truncated) =
                    ConvolutionEngine::new(ir, period_size, config.max_ir_length)?;
                if let Some(warning) = truncated {
                    warn!("{warning}");
                }
                info!(
                    "convolution: {} taps at {} Hz",
                    engine.taps(),
                    engine.sample_rate()
                );
                let rate = engine.sample_rate();
                (Some(engine), rate)
            }
            None => {
                info!("convolution: off");
                (None, config.sample_rate)
            }
        };

        if !SUPPORTED_RATES.contains(&sample_rate) {
            return Err(DspError::InvalidParameter {
                name: "sample_rate",
                value: sample_rate as f32,
                range: (SUPPORTED_RATES[0] as f32, SUPPORTED_RATES[1] as f32),
            });
        }
        let rate = sample_rate as f32;

        info!("gain: {:.2} dB", crate::io::converter::amp_to_db(config.gain));

        let highpass = config.highpass.map(|s| {
            info!("highpass: {:?} {} Hz, Q {}", s.kind, s.cutoff_hz, s.q);
            design(s, rate)
        });

        let tremolo = config
            .tremolo
            .map(|s| {
                info!("tremolo: depth {} at {} Hz", s.depth, s.rate_hz);
                Tremolo::new(s.depth, Lfo::new(sample_rate, s.rate_hz))
            })
            .transpose()?;

        let chorus = match config.chorus {
            Some(s) => {
                let mut fx = TimeModulation::new(
                    sample_rate,
                    s.depth,
                    s.excursion,
                    s.feedback,
                    s.delay_ms,
                    Lfo::new(sample_rate, s.rate_hz),
                )?;
                if let Some(lp) = s.lowpass {
                    fx.attach_filter(filters.chorus_lowpass.insert(design(lp, rate)));
                }
                info!(
                    "chorus/flange: depth {}, excursion {}, feedback {}, {} ms at {} Hz",
                    s.depth, s.excursion, s.feedback, s.delay_ms, s.rate_hz
                );
                Some(fx)
            }
            None => None,
        };

        let delay = match config.delay {
            Some(s) => {
                let mut fx = FeedbackDelay::new(s.feedback, s.mix, sample_rate, s.delay_ms)?;
                if let Some(lp) = s.lowpass {
                    fx = fx.with_feedback_filter(design(lp, rate));
                }
                info!(
                    "delay: {} ms, feedback {}, mix {}",
                    s.delay_ms, s.feedback, s.mix
                );
                Some(fx)
            }
            None => None,
        };

        Ok(Self {
            sample_rate,
            period_size,
            gain: config.gain,
            convolution,
            highpass,
            tremolo,
            chorus,
            delay,
            block: zeroed_buffer(period_size)?,
        })
    }

    /// Effective sample rate: the IR's when convolving, the configured one
    /// otherwise.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn period_size(&self) -> usize {
        self.period_size
    }

    /// Where the next period of raw input goes.
    pub fn input_mut(&mut self) -> &mut [f32] {
        match self.convolution.as_mut() {
            Some(conv) => conv.input_mut(),
            None => &mut self.block,
        }
    }

    /// The most recently processed period.
    pub fn output(&self) -> &[f32] {
        &self.block
    }

    /// Run every enabled effect over the pending period.
    pub fn process_period(&mut self) {
        if let Some(conv) = self.convolution.as_mut() {
            conv.apply(&mut self.block);
        }

        for sample in self.block.iter_mut() {
            let mut x = *sample * self.gain;
            if let Some(hp) = self.highpass.as_mut() {
                x = hp.apply(x);
            }
            if let Some(trem) = self.tremolo.as_mut() {
                x = trem.apply(x);
            }
            if let Some(chorus) = self.chorus.as_mut() {
                x = chorus.apply(x);
            }
            if let Some(delay) = self.delay.as_mut() {
                x = delay.apply(x);
            }
            *sample = x;
        }
    }

    /// Copy one period in, process it, and return the result.
    pub fn process_block(&mut self, input: &[f32]) -> &[f32] {
        debug_assert_eq!(input.len(), self.period_size);
        self.input_mut().copy_from_slice(input);
        self.process_period();
        self.output()
    }
}

fn design(settings: FilterSettings, sample_rate: f32) -> BiquadFilter {
    BiquadFilter::new(settings.kind, settings.cutoff_hz, sample_rate, settings.q)
}
