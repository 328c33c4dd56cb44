//! Second-order IIR ("biquad") filter designed with the bilinear transform.

use std::f32::consts::PI;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{DspError, Result};

/*
Biquad Filter
=============

A biquad is the workhorse second-order IIR section: five coefficients and two
samples of history. Every classic response can be built from one.

Vocabulary
----------

  cutoff        The frequency where the response turns over (-3 dB for
                lowpass/highpass, centre for bandpass/notch).

  Q             Quality factor. 0.707 is maximally flat (Butterworth);
                larger values ring and peak around the cutoff.

  prewarp       The bilinear transform squashes the whole analog frequency
                axis into 0..Nyquist. tan(pi * fc / fs) moves the cutoff
                back to where we asked for it.


Coefficients
------------

    k    = tan(pi * fc / fs)
    norm = 1 / (1 + k/Q + k²)

| type      | cx0            | cx1            | cx2   | cy1             |
| --------- | -------------- | -------------- | ----- | --------------- |
| low-pass  | k²·norm        | 2·cx0          | cx0   | 2(k²−1)·norm    |
| high-pass | norm           | −2·cx0         | cx0   | 2(k²−1)·norm    |
| band-pass | (k/Q)·norm     | 0              | −cx0  | 2(k²−1)·norm    |
| notch     | (1+k²)·norm    | 2(k²−1)·norm   | cx0   | cx1             |

and cy2 = (1 − k/Q + k²)·norm for all four.


Recurrence (direct form II)
---------------------------

    w[n] = x[n] − cy1·w[n−1] − cy2·w[n−2]
    y[n] = cx0·w[n] + cx1·w[n−1] + cx2·w[n−2]

        x ──(+)──────┬──[cx0]──(+)── y
             │      [z⁻¹]        │
             ├─[−cy1]─┤──[cx1]───┤
             │      [z⁻¹]        │
             └─[−cy2]─┘──[cx2]───┘

The history shift (w[n−1] → w[n−2], w[n] → w[n−1]) happens only after the
output has been formed from the old values.
*/

/// Anything that transforms one sample into one sample.
///
/// This is the seam used to inject filters into feedback paths: a
/// [`BiquadFilter`], [`Bypass`], or any `FnMut(f32) -> f32` closure.
pub trait SampleFilter {
    fn apply(&mut self, sample: f32) -> f32;
}

/// Identity filter.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bypass;

impl SampleFilter for Bypass {
    #[inline]
    fn apply(&mut self, sample: f32) -> f32 {
        sample
    }
}

impl<F> SampleFilter for F
where
    F: FnMut(f32) -> f32,
{
    #[inline]
    fn apply(&mut self, sample: f32) -> f32 {
        self(sample)
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BiquadType {
    LowPass,
    HighPass,
    BandPass,
    Notch,
}

/// Numeric response codes: 1 = lowpass, 2 = highpass, 3 = bandpass, 4 = notch.
impl TryFrom<i32> for BiquadType {
    type Error = DspError;

    fn try_from(code: i32) -> Result<Self> {
        match code {
            1 => Ok(BiquadType::LowPass),
            2 => Ok(BiquadType::HighPass),
            3 => Ok(BiquadType::BandPass),
            4 => Ok(BiquadType::Notch),
            other => Err(DspError::InvalidResponseType(other.to_string())),
        }
    }
}

impl FromStr for BiquadType {
    type Err = DspError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "lowpass" | "lpf" => Ok(BiquadType::LowPass),
            "highpass" | "hpf" => Ok(BiquadType::HighPass),
            "bandpass" | "bpf" => Ok(BiquadType::BandPass),
            "notch" | "bandstop" => Ok(BiquadType::Notch),
            _ => Err(DspError::InvalidResponseType(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoefficients {
    pub cx0: f32,
    pub cx1: f32,
    pub cx2: f32,
    pub cy1: f32,
    pub cy2: f32,
}

impl BiquadCoefficients {
    pub fn design(filter_type: BiquadType, cutoff_hz: f32, sample_rate: f32, q: f32) -> Self {
        let k = (PI * cutoff_hz / sample_rate).tan();
        let k2 = k * k;
        let norm = 1.0 / (1.0 + k / q + k2);
        let cy1 = 2.0 * (k2 - 1.0) * norm;
        let cy2 = (1.0 - k / q + k2) * norm;

        match filter_type {
            BiquadType::LowPass => {
                let cx0 = k2 * norm;
                Self {
                    cx0,
                    cx1: 2.0 * cx0,
                    cx2: cx0,
                    cy1,
                    cy2,
                }
            }
            BiquadType::HighPass => {
                let cx0 = norm;
                Self {
                    cx0,
                    cx1: -2.0 * cx0,
                    cx2: cx0,
                    cy1,
                    cy2,
                }
            }
            BiquadType::BandPass => {
                let cx0 = k / q * norm;
                Self {
                    cx0,
                    cx1: 0.0,
                    cx2: -cx0,
                    cy1,
                    cy2,
                }
            }
            BiquadType::Notch => {
                let cx0 = (1.0 + k2) * norm;
                Self {
                    cx0,
                    cx1: cy1,
                    cx2: cx0,
                    cy1,
                    cy2,
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct BiquadFilter {
    coefficients: BiquadCoefficients,
    dly1: f32, // w[n-1]
    dly2: f32, // w[n-2]
}

impl BiquadFilter {
    pub fn new(filter_type: BiquadType, cutoff_hz: f32, sample_rate: f32, q: f32) -> Self {
        Self::from_coefficients(BiquadCoefficients::design(
            filter_type,
            cutoff_hz,
            sample_rate,
            q,
        ))
    }

    /// Design from a numeric response code (see [`BiquadType`]'s `TryFrom<i32>`).
    pub fn from_code(code: i32, cutoff_hz: f32, sample_rate: f32, q: f32) -> Result<Self> {
        let filter_type = BiquadType::try_from(code)?;
        Ok(Self::new(filter_type, cutoff_hz, sample_rate, q))
    }

    pub fn from_coefficients(coefficients: BiquadCoefficients) -> Self {
        Self {
            coefficients,
            dly1: 0.0,
            dly2: 0.0,
        }
    }

    pub fn lowpass(cutoff_hz: f32, sample_rate: f32, q: f32) -> Self {
        Self::new(BiquadType::LowPass, cutoff_hz, sample_rate, q)
    }

    pub fn highpass(cutoff_hz: f32, sample_rate: f32, q: f32) -> Self {
        Self::new(BiquadType::HighPass, cutoff_hz, sample_rate, q)
    }

    pub fn coefficients(&self) -> &BiquadCoefficients {
        &self.coefficients
    }

    #[inline]
    pub fn apply(&mut self, sample: f32) -> f32 {
        let c = &self.coefficients;

        let w = sample - self.dly1 * c.cy1 - self.dly2 * c.cy2;
        let y = w * c.cx0 + self.dly1 * c.cx1 + self.dly2 * c.cx2;

        self.dly2 = self.dly1;
        self.dly1 = w;

        y
    }

    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.apply(*sample);
        }
    }

    pub fn reset(&mut self) {
        self.dly1 = 0.0;
        self.dly2 = 0.0;
    }
}

impl SampleFilter for BiquadFilter {
    #[inline]
    fn apply(&mut self, sample: f32) -> f32 {
        BiquadFilter::apply(self, sample)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f32 = 44_100.0;

    fn sine_peak(filter: &mut BiquadFilter, freq: f32) -> f32 {
        filter.reset();
        let mut peak = 0.0f32;
        for n in 0..8192 {
            let x = (2.0 * PI * freq * n as f32 / SR).sin();
            let y = filter.apply(x);
            // skip the transient
            if n > 4096 {
                peak = peak.max(y.abs());
            }
        }
        peak
    }

    #[test]
    fn test_coefficients_match_closed_form() {
        let cases = [
            (BiquadType::LowPass, 2000.0, 44_100.0, 0.707),
            (BiquadType::HighPass, 150.0, 44_100.0, 0.707),
            (BiquadType::BandPass, 800.0, 48_000.0, 2.0),
            (BiquadType::Notch, 60.0, 48_000.0, 5.0),
        ];

        for (ty, fc, fs, q) in cases {
            let c = BiquadCoefficients::design(ty, fc, fs, q);
            let k = (std::f64::consts::PI * fc as f64 / fs as f64).tan();
            let q = q as f64;
            let norm = 1.0 / (1.0 + k / q + k * k);

            let expected_den = 1.0 + 2.0 * (k * k - 1.0) * norm + (1.0 - k / q + k * k) * norm;
            let expected_num = match ty {
                BiquadType::LowPass => 4.0 * k * k * norm,
                BiquadType::HighPass => 0.0,
                BiquadType::BandPass => 0.0,
                BiquadType::Notch => 2.0 * (1.0 + k * k) * norm + 2.0 * (k * k - 1.0) * norm,
            };

            let num = (c.cx0 + c.cx1 + c.cx2) as f64;
            let den = (1.0 + c.cy1 + c.cy2) as f64;
            assert!(
                (num - expected_num).abs() < 1e-5,
                "{ty:?}: numerator sum {num} != {expected_num}"
            );
            assert!(
                (den - expected_den).abs() < 1e-5,
                "{ty:?}: denominator sum {den} != {expected_den}"
            );
        }
    }

    #[test]
    fn test_lowpass_has_unity_dc_gain() {
        let c = BiquadCoefficients::design(BiquadType::LowPass, 1000.0, SR, 0.707);
        let dc = (c.cx0 + c.cx1 + c.cx2) / (1.0 + c.cy1 + c.cy2);
        assert!((dc - 1.0).abs() < 1e-4, "dc gain {dc}");
    }

    #[test]
    fn test_impulse_response_follows_recurrence() {
        let mut filter = BiquadFilter::lowpass(2000.0, SR, 0.707);
        let c = *filter.coefficients();

        let (mut w1, mut w2) = (0.0f32, 0.0f32);
        for n in 0..64 {
            let x = if n == 0 { 1.0 } else { 0.0 };
            let w = x - w1 * c.cy1 - w2 * c.cy2;
            let expected = w * c.cx0 + w1 * c.cx1 + w2 * c.cx2;
            w2 = w1;
            w1 = w;

            let y = filter.apply(x);
            assert!(
                (y - expected).abs() < 1e-7,
                "sample {n}: got {y}, expected {expected}"
            );
        }
    }

    #[test]
    fn test_impulse_first_samples() {
        let mut filter = BiquadFilter::lowpass(2000.0, SR, 0.707);
        let c = *filter.coefficients();

        let y0 = filter.apply(1.0);
        let y1 = filter.apply(0.0);
        let y2 = filter.apply(0.0);

        assert!((y0 - c.cx0).abs() < 1e-7);
        assert!((y1 - (c.cx1 - c.cy1 * c.cx0)).abs() < 1e-7);
        let w1 = -c.cy1;
        let w2 = -c.cy1 * w1 - c.cy2;
        assert!((y2 - (w2 * c.cx0 + w1 * c.cx1 + c.cx2)).abs() < 1e-6);
    }

    #[test]
    fn test_highpass_blocks_dc() {
        let mut filter = BiquadFilter::highpass(150.0, SR, 0.707);
        let mut buffer = vec![1.0; 4096];
        filter.render(&mut buffer);
        assert!(buffer[4095].abs() < 1e-3, "residual dc {}", buffer[4095]);
    }

    #[test]
    fn test_lowpass_attenuates_high_freq() {
        let mut filter = BiquadFilter::lowpass(500.0, SR, 0.707);
        let pass = sine_peak(&mut filter, 100.0);
        let stop = sine_peak(&mut filter, 8000.0);
        assert!(pass > 0.9, "passband peak {pass}");
        assert!(stop < 0.02, "stopband peak {stop}");
    }

    #[test]
    fn test_bandpass_emphasizes_centre() {
        let mut filter = BiquadFilter::new(BiquadType::BandPass, 1000.0, SR, 2.0);
        let centre = sine_peak(&mut filter, 1000.0);
        let off = sine_peak(&mut filter, 100.0);
        assert!(
            centre > off * 4.0,
            "centre {centre} should dominate off-band {off}"
        );
    }

    #[test]
    fn test_notch_rejects_centre() {
        let mut filter = BiquadFilter::new(BiquadType::Notch, 1000.0, SR, 2.0);
        let centre = sine_peak(&mut filter, 1000.0);
        let off = sine_peak(&mut filter, 100.0);
        assert!(centre < 0.01, "centre leak {centre}");
        assert!(off > 0.9, "off-band {off}");
    }

    #[test]
    fn test_response_codes() {
        assert_eq!(BiquadType::try_from(1).unwrap(), BiquadType::LowPass);
        assert_eq!(BiquadType::try_from(4).unwrap(), BiquadType::Notch);
        assert!(matches!(
            BiquadType::try_from(7),
            Err(DspError::InvalidResponseType(_))
        ));
        assert!(BiquadFilter::from_code(0, 1000.0, SR, 0.707).is_err());
    }

    #[test]
    fn test_response_names() {
        assert_eq!("HighPass".parse::<BiquadType>().unwrap(), BiquadType::HighPass);
        assert_eq!("bpf".parse::<BiquadType>().unwrap(), BiquadType::BandPass);
        assert!("allpass".parse::<BiquadType>().is_err());
    }

    #[test]
    fn test_sample_filter_implementers() {
        let mut bypass = Bypass;
        assert_eq!(bypass.apply(0.25), 0.25);

        let mut halve = |x: f32| x * 0.5;
        assert_eq!(SampleFilter::apply(&mut halve, 0.5), 0.25);

        let mut biquad = BiquadFilter::lowpass(1000.0, SR, 0.707);
        let direct = BiquadFilter::lowpass(1000.0, SR, 0.707).apply(1.0);
        let via_trait = SampleFilter::apply(&mut biquad, 1.0);
        assert_eq!(direct, via_trait);
    }
}
