//! Benchmarks for delay line operations.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use guitar_dsp::dsp::delay::DelayLine;
use guitar_dsp::dsp::echo::FeedbackDelay;

use crate::BLOCK_SIZES;

pub fn bench_delay(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/delay");

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.1).sin()).collect();

        // Interpolated read (fractional delay - used in chorus/flanger)
        let mut line = DelayLine::from_time(10.0, 48_000).unwrap();
        for &sample in &input {
            line.write(sample);
        }
        group.bench_with_input(BenchmarkId::new("tap_interpolated", size), &size, |b, _| {
            b.iter(|| {
                let mut sum = 0.0f32;
                for i in 0..size {
                    // Simulate modulated delay time (chorus-like)
                    let d = 240.0 + (i as f32 * 0.1).sin() * 48.0;
                    sum += line.tap_interpolated(black_box(d));
                }
                sum
            })
        });

        for &delay_ms in &[10.0f32, 250.0, 1000.0] {
            let mut echo = FeedbackDelay::new(0.3, 0.3, 48_000, delay_ms).unwrap();
            let mut buffer = input.clone();
            group.bench_with_input(
                BenchmarkId::new(format!("echo_{}ms", delay_ms as u32), size),
                &size,
                |b, _| {
                    b.iter(|| {
                        buffer.copy_from_slice(&input);
                        for sample in buffer.iter_mut() {
                            *sample = echo.apply(black_box(*sample));
                        }
                    })
                },
            );
        }
    }

    group.finish();
}
