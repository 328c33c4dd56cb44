//! Benchmarks for LFO-driven effects.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use guitar_dsp::dsp::biquad::BiquadFilter;
use guitar_dsp::dsp::lfo::Lfo;
use guitar_dsp::dsp::modulation::TimeModulation;
use guitar_dsp::dsp::tremolo::Tremolo;

use crate::BLOCK_SIZES;

pub fn bench_modulation(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/modulation");

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.05).sin()).collect();
        let mut buffer = input.clone();

        let mut tremolo = Tremolo::new(0.4, Lfo::new(48_000, 3.5)).unwrap();
        group.bench_with_input(BenchmarkId::new("tremolo", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                for sample in buffer.iter_mut() {
                    *sample = tremolo.apply(black_box(*sample));
                }
            })
        });

        let mut chorus =
            TimeModulation::new(48_000, 1.0, 0.2, 0.0, 5.0, Lfo::new(48_000, 1.0)).unwrap();
        group.bench_with_input(BenchmarkId::new("chorus", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                for sample in buffer.iter_mut() {
                    *sample = chorus.apply(black_box(*sample));
                }
            })
        });

        let mut lowpass = BiquadFilter::lowpass(2_000.0, 48_000.0, 0.707);
        let mut flanger =
            TimeModulation::new(48_000, 1.0, 1.0, 0.5, 3.0, Lfo::new(48_000, 0.25))
                .unwrap()
                .with_filter(&mut lowpass);
        group.bench_with_input(BenchmarkId::new("flanger_filtered", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                for sample in buffer.iter_mut() {
                    *sample = flanger.apply(black_box(*sample));
                }
            })
        });
    }

    group.finish();
}
