//! Circular delay line with integer and interpolated taps.

use crate::error::{zeroed_buffer, DspError, Result};

/*
Circular Delay Line
===================

A delay of D samples needs D + 1 slots: the sample being written now plus the
D that came before it. Instead of shifting the whole buffer every sample, a
cursor walks backwards through a fixed ring.

    slots:   [ s3 | s2 | s1 | s0 | s6 | s5 | s4 ]      D = 6
                                  ^
                                cursor (next slot to overwrite)

    tap(0)   = slot at cursor              (oldest, D + 1 writes ago)
    tap(1)   = slot after cursor           (most recent write)
    tap(i)   = slot (cursor + i) mod (D + 1)

Writing stores at the cursor and then steps the cursor back by one, wrapping
from the start of the ring to its end. Because the cursor retreats, "further
ahead of the cursor" means "further back in time".


Fractional Taps
---------------

Chorus and flange need delays that are not whole samples. Reading between
two neighbouring taps with linear interpolation

    tap(d) = tap(i) + (d - i) * (tap(i + 1) - tap(i)),   i = floor(d)

lets the delay glide continuously. A continuously changing delay is heard as
a small Doppler pitch bend, which is the whole trick behind those effects.
*/

/// Bring a cursor that has stepped one slot outside `0..=max_delay` back
/// into the ring.
///
/// Handles both directions so the same function restores a cursor that was
/// retreated below zero or advanced past the end.
#[inline]
pub fn wrap(max_delay: usize, cursor: isize) -> usize {
    let len = max_delay as isize + 1;
    let mut cursor = cursor;
    if cursor > max_delay as isize {
        cursor -= len;
    }
    if cursor < 0 {
        cursor += len;
    }
    cursor as usize
}

pub struct DelayLine {
    buffer: Vec<f32>,
    cursor: usize,
}

impl DelayLine {
    /// Allocate a ring able to hold `max_delay` samples of delay.
    pub fn new(max_delay: usize) -> Result<Self> {
        let len = max_delay
            .checked_add(1)
            .ok_or(DspError::ResourceExhaustion {
                requested: max_delay,
            })?;

        Ok(Self {
            buffer: zeroed_buffer(len)?,
            cursor: 0,
        })
    }

    /// Ring sized for `delay_ms` milliseconds at `sample_rate`.
    pub fn from_time(delay_ms: f32, sample_rate: u32) -> Result<Self> {
        Self::new(delay_samples(delay_ms, sample_rate))
    }

    /// The largest whole-sample delay this line can represent (D).
    pub fn max_delay(&self) -> usize {
        self.buffer.len() - 1
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Store `sample` at the cursor and retreat the cursor by one slot.
    #[inline]
    pub fn write(&mut self, sample: f32) {
        self.buffer[self.cursor] = sample;
        self.cursor = wrap(self.max_delay(), self.cursor as isize - 1);
    }

    #[inline]
    pub fn tap(&self, offset: usize) -> f32 {
        self.tap_from(self.cursor, offset)
    }

    /// Linearly interpolated tap for `0 <= delay <= D`.
    #[inline]
    pub fn tap_interpolated(&self, delay: f32) -> f32 {
        self.tap_interpolated_from(self.cursor, delay)
    }

    /// Integer tap relative to an arbitrary `origin` slot instead of the cursor.
    #[inline]
    pub fn tap_from(&self, origin: usize, offset: usize) -> f32 {
        self.buffer[(origin + offset) % self.buffer.len()]
    }

    /// Interpolated tap relative to an arbitrary `origin` slot.
    ///
    /// The upper neighbour wraps as `(i + 1) % (D + 1)`, the same as the
    /// cursor-relative tap.
    #[inline]
    pub fn tap_interpolated_from(&self, origin: usize, delay: f32) -> f32 {
        let i = delay as usize;
        let j = (i + 1) % self.buffer.len();
        let si = self.tap_from(origin, i);
        let sj = self.tap_from(origin, j);
        si + (delay - i as f32) * (sj - si)
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.cursor = 0;
    }
}

/// Milliseconds to a whole number of samples (rounded).
#[inline]
pub fn delay_samples(delay_ms: f32, sample_rate: u32) -> usize {
    (f64::from(delay_ms) * f64::from(sample_rate) / 1000.0).round() as usize
}
