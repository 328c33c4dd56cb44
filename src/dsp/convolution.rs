//! Block FIR convolution against a fixed impulse response, four lanes at a time.

use log::debug;
use wide::f32x4;

use crate::error::{zeroed_buffer, DspError, Result, Truncated};
use crate::io::ImpulseResponse;
use crate::LANES;

/*
Cabinet / Room Convolution
==========================

Convolving a dry guitar signal with the recorded impulse response (IR) of a
speaker cabinet or a room makes it sound as if it was played through it.

    y[m] = Σ h[j] · x[m - j]        j = 0 .. n-1

Memory Layout
-------------

The history buffer holds the last n-1 input samples followed by room for one
new period of p samples:

    history:  [ x(-n+1) ... x(-1) | x(0) ... x(p-1) ]
               └──── n - 1 ─────┘ └── input slice ─┘

With the kernel stored reversed, hr[k] = h[n-1-k], each output is a straight
dot product over a sliding window:

    y[i] = Σ hr[k] · history[i + k]

Vectorisation
-------------

Each reversed tap is broadcast across a 4-lane vector. One pass over the
kernel then produces four neighbouring outputs at once:

    acc  += [hr[k] hr[k] hr[k] hr[k]] · [h(i+k) h(i+k+1) h(i+k+2) h(i+k+3)]

    ─→ [y(i) y(i+1) y(i+2) y(i+3)]

After the period has been produced the history slides left by p samples so
the newest n-1 inputs become the context for the next call.

Both the period size and the kernel length are multiples of four. Shorter
IRs are padded with trailing zero taps, which leaves the output unchanged.
*/

/// Sample rates an impulse response may be recorded at.
pub const SUPPORTED_RATES: [u32; 2] = [44_100, 48_000];

pub struct ConvolutionEngine {
    kernel: Vec<f32x4>,
    history: Vec<f32>,
    period_size: usize,
    sample_rate: u32,
}

impl ConvolutionEngine {
    /// Build the engine from a decoded impulse response.
    ///
    /// The IR must be mono and recorded at 44.1 or 48 kHz. IRs longer than
    /// `max_len` are cut down and the returned [`Truncated`] says so.
    pub fn new(
        ir: &ImpulseResponse,
        period_size: usize,
        max_len: usize,
    ) -> Result<(Self, Option<Truncated>)> {
        if max_len == 0 || max_len % LANES != 0 {
            return Err(DspError::InvalidIrLength(max_len));
        }
        if period_size == 0 || period_size % LANES != 0 {
            return Err(DspError::InvalidPeriodSize(period_size));
        }
        if !SUPPORTED_RATES.contains(&ir.sample_rate) {
            return Err(DspError::UnsupportedSource(format!(
                "unsupported sample rate {} Hz",
                ir.sample_rate
            )));
        }
        if ir.channels != 1 {
            return Err(DspError::UnsupportedSource(
                "only mono files are supported as impulse responses".to_string(),
            ));
        }
        if ir.samples.is_empty() {
            return Err(DspError::UnsupportedSource(
                "impulse response contains no samples".to_string(),
            ));
        }

        let truncated = (ir.samples.len() > max_len).then(|| Truncated {
            max_len,
            source_len: ir.samples.len(),
        });

        let taps = &ir.samples[..ir.samples.len().min(max_len)];
        let n = taps.len().next_multiple_of(LANES);

        let mut kernel = Vec::new();
        kernel
            .try_reserve_exact(n)
            .map_err(|_| DspError::ResourceExhaustion { requested: n })?;
        // reversed: zero padding first, then h[len-1] .. h[0]
        kernel.extend((taps.len()..n).map(|_| f32x4::ZERO));
        kernel.extend(taps.iter().rev().map(|&h| f32x4::splat(h)));

        let history = zeroed_buffer(n + period_size - 1)?;

        debug!(
            "convolution kernel: {} taps, history {} samples",
            n,
            history.len()
        );

        Ok((
            Self {
                kernel,
                history,
                period_size,
                sample_rate: ir.sample_rate,
            },
            truncated,
        ))
    }

    /// Kernel length in taps (a multiple of four).
    pub fn taps(&self) -> usize {
        self.kernel.len()
    }

    pub fn period_size(&self) -> usize {
        self.period_size
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Writable slots for the next period of raw input, `period_size` long.
    ///
    /// Fill this before every call to [`apply`](Self::apply).
    pub fn input_mut(&mut self) -> &mut [f32] {
        let start = self.kernel.len() - 1;
        &mut self.history[start..start + self.period_size]
    }

    /// Convolve the pending input period into `output` (`period_size` long)
    /// and slide the history.
    pub fn apply(&mut self, output: &mut [f32]) {
        debug_assert_eq!(output.len(), self.period_size);

        let n = self.kernel.len();
        for (i, out) in output.chunks_exact_mut(LANES).enumerate() {
            let window = &self.history[i * LANES..i * LANES + n + LANES - 1];
            let mut acc = f32x4::ZERO;
            for (k, tap) in self.kernel.iter().enumerate() {
                acc = load4(&window[k..]).mul_add(*tap, acc);
            }
            out.copy_from_slice(&acc.to_array());
        }

        self.history.copy_within(self.period_size.., 0);
    }
}

#[inline(always)]
fn load4(s: &[f32]) -> f32x4 {
    f32x4::new([s[0], s[1], s[2], s[3]])
}
