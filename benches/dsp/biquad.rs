//! Benchmarks for biquad filters.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use guitar_dsp::dsp::biquad::{BiquadFilter, BiquadType};

use crate::BLOCK_SIZES;

pub fn bench_biquad(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/biquad");

    for &size in BLOCK_SIZES {
        // Generate a test signal (sawtooth-like ramp)
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32) * 2.0 - 1.0)
            .collect();

        for (name, kind, cutoff) in [
            ("lowpass", BiquadType::LowPass, 2_000.0),
            ("highpass", BiquadType::HighPass, 150.0),
            ("bandpass", BiquadType::BandPass, 800.0),
            ("notch", BiquadType::Notch, 60.0),
        ] {
            let mut filter = BiquadFilter::new(kind, cutoff, 48_000.0, 0.707);
            let mut buffer = input.clone();
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    buffer.copy_from_slice(&input);
                    filter.render(black_box(&mut buffer));
                })
            });
        }
    }

    group.finish();
}
