//! Low Frequency Oscillator (LFO).

use std::f64::consts::{FRAC_2_PI, TAU};

/*
Low Frequency Oscillators
=========================

An LFO is an oscillator running at sub-audio frequencies. It never makes
sound itself; it moves another effect's parameter: amplitude for tremolo,
delay time for chorus and flange.

Vocabulary
----------

  control-rate  Frequencies below human hearing: ~0.01 Hz to ~20 Hz.

  omega         Angular increment per sample: 2π · f / fs.
                One cycle lasts 2π / omega samples.

  bipolar       Output swings -1.0 ..= +1.0.
  unipolar      Output stays in 0.0 ..= 1.0.
                Convert: unipolar = (bipolar + 1.0) / 2.0


Phase Accumulation
------------------

The oscillator keeps an integer sample counter t and evaluates the waveform
at omega · t. Once omega · t reaches 2π the counter restarts at zero, so the
phase argument never grows without bound no matter how long the program
runs. The restart happens on the first sample at or past 2π, so one cycle
lasts ceil(2π / omega) samples. For rates that divide the sample rate evenly
(3.5 Hz at 44.1 kHz: 12600 samples) that is exactly fs / f. Otherwise it
lands one sample past the rounded value whenever the fraction is below one
half: 7.3 Hz at 44.1 kHz gives 6041.1, which rounds to 6041, but the
sequence repeats every 6042.


Shapes
------

SINE
    sin(omega · t)

TRIANGLE
    Folding a sine through its own inverse straightens it into ramps:

        (2 / π) · asin(sin(omega · t))

          /\      /\
         /  \    /  \
        /    \  /    \
              \/      \/

    Same period and peak as the sine, but constant slope. A chorus swept by
    a triangle spends equal time at every delay, which sounds more even than
    a sine's lingering at the extremes.
*/

/// Phase tolerance for the cycle reset, far below one sample of phase at any
/// control rate.
const PHASE_EPSILON: f64 = 1e-9;

/// Convert bipolar signal (-1.0 to +1.0) to unipolar (0.0 to 1.0).
#[inline]
pub fn bipolar_to_unipolar(bipolar: f32) -> f32 {
    (bipolar + 1.0) * 0.5
}

#[derive(Debug, Clone, Copy)]
pub struct Lfo {
    omega: f64,
    t: u32,
}

impl Lfo {
    pub fn new(sample_rate: u32, frequency_hz: f32) -> Self {
        Self {
            omega: TAU * f64::from(frequency_hz) / f64::from(sample_rate),
            t: 0,
        }
    }

    pub fn omega(&self) -> f64 {
        self.omega
    }

    #[inline]
    pub fn next_sine(&mut self) -> f32 {
        let value = (self.omega * f64::from(self.t)).sin();
        self.advance();
        value as f32
    }

    #[inline]
    pub fn next_triangle(&mut self) -> f32 {
        let value = FRAC_2_PI * (self.omega * f64::from(self.t)).sin().asin();
        self.advance();
        value as f32
    }

    #[inline]
    fn advance(&mut self) {
        self.t = self.t.wrapping_add(1);
        if f64::from(self.t) * self.omega >= TAU - PHASE_EPSILON {
            self.t = 0;
        }
    }
}
