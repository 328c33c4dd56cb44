//! Time modulation: chorus and flange from one modulated delay line.

use crate::dsp::biquad::SampleFilter;
use crate::dsp::delay::{delay_samples, DelayLine};
use crate::dsp::lfo::Lfo;
use crate::error::{DspError, Result};

/*
Chorus / Flange
===============

Both effects mix the dry signal with a copy read from a delay line whose
read position is swept by an LFO. The sweeping delay bends the copy's pitch
up and down slightly; mixed against the dry signal that sounds like several
players (chorus) or a jet-like comb sweep (flange).

    Input ──┬──────────────────────────────(1 - mix)──┐
            │                                          (+)──→ Output
            └─→(+)─→[filter?]─→[ delay line ]──┬─(mix)─┘
                ↑                      ↑ d(t)  │
                └──────(feedback)──────┼───────┘
                                       │
                                    [ LFO ]

Parameters
----------

  depth       0..1   strength of the effect; the wet mix is depth / 2.
  excursion   0..1   how far the tap swings around the centre of the line.
  feedback    amount of the tapped signal fed back into the line.
              Flanger territory; leave at 0 for chorus.
  delay       0..40 ms. Chorus likes 5-30 ms, flange 1-5 ms.

The read offset is

    d = D/2 · (1 - excursion · triangle(t))

which centres the tap in the line and swings it towards both ends. At
excursion 1 it covers the full 0..=D range.

Optional Filter
---------------

A filter may be inserted on the write path only (dark, "analog" repeats).
The effect does not own it: the caller keeps the filter alive at least as
long as the effect and lends it out with a mutable borrow.
*/

/// Longest delay accepted, in milliseconds.
pub const MAX_MODULATION_DELAY_MS: f32 = 40.0;

pub struct TimeModulation<'a> {
    depth: f32,
    excursion: f32,
    feedback: f32,
    lfo: Lfo,
    line: DelayLine,
    filter: Option<&'a mut dyn SampleFilter>,
}

impl<'a> TimeModulation<'a> {
    pub fn new(
        sample_rate: u32,
        depth: f32,
        excursion: f32,
        feedback: f32,
        delay_ms: f32,
        lfo: Lfo,
    ) -> Result<Self> {
        DspError::check_range("depth", depth, 0.0, 1.0)?;
        DspError::check_range("excursion", excursion, 0.0, 1.0)?;
        DspError::check_range("delay_ms", delay_ms, 0.0, MAX_MODULATION_DELAY_MS)?;

        let line = DelayLine::new(delay_samples(delay_ms, sample_rate))?;

        Ok(Self {
            depth,
            excursion,
            feedback,
            lfo,
            line,
            filter: None,
        })
    }

    /// Insert a filter on the delay line's write path.
    pub fn attach_filter(&mut self, filter: &'a mut dyn SampleFilter) {
        self.filter = Some(filter);
    }

    pub fn with_filter(mut self, filter: &'a mut dyn SampleFilter) -> Self {
        self.attach_filter(filter);
        self
    }

    pub fn max_delay(&self) -> usize {
        self.line.max_delay()
    }

    #[inline]
    pub fn apply(&mut self, sample: f32) -> f32 {
        let mix = 0.5 * self.depth;
        let centre = 0.5 * self.line.max_delay() as f32;

        let d = centre * (1.0 - self.excursion * self.lfo.next_triangle());
        let s = self.line.tap_interpolated(d);
        let y = (1.0 - mix) * sample + mix * s;

        // Feedback and filter see the current tap before the cursor moves.
        let x = sample + self.feedback * s;
        let stored = match self.filter.as_deref_mut() {
            Some(filter) => filter.apply(x),
            None => x,
        };
        self.line.write(stored);

        y
    }
}
