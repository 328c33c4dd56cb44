//! Tremolo: amplitude modulation by a sine LFO.

use crate::dsp::lfo::{bipolar_to_unipolar, Lfo};
use crate::error::{DspError, Result};

/*
The gain applied to each sample is

    c = 1 - depth · unipolar(lfo)      unipolar(lfo) = (sin + 1) / 2

so it swings between 1 (sin = -1) and 1 - depth (sin = +1). depth 0 leaves
the signal untouched; depth 1 pulls it all the way to silence once per cycle.
*/

pub struct Tremolo {
    lfo: Lfo,
    depth: f32,
}

impl Tremolo {
    pub fn new(depth: f32, lfo: Lfo) -> Result<Self> {
        DspError::check_range("depth", depth, 0.0, 1.0)?;
        Ok(Self { lfo, depth })
    }

    pub fn depth(&self) -> f32 {
        self.depth
    }

    #[inline]
    pub fn apply(&mut self, sample: f32) -> f32 {
        let c = 1.0 - self.depth * bipolar_to_unipolar(self.lfo.next_sine());
        c * sample
    }
}
