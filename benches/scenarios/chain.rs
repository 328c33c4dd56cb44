//! Benchmarks for complete effect chains.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use guitar_dsp::config::{ChorusSettings, DelaySettings, FilterSettings, TremoloSettings};
use guitar_dsp::io::ImpulseResponse;
use guitar_dsp::{ChainFilters, EffectChain, EngineConfig, DEFAULT_IR_LENGTH};

use crate::BLOCK_SIZES;

pub fn bench_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/chain");

    let ir = ImpulseResponse::mono(
        48_000,
        (0..DEFAULT_IR_LENGTH)
            .map(|j| (-(j as f32) / 200.0).exp() * if j % 2 == 0 { 1.0 } else { -0.5 })
            .collect(),
    );

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.03).sin() * 0.5).collect();
        let base = EngineConfig::default()
            .with_sample_rate(48_000)
            .with_period_size(size)
            .with_gain(0.7);

        // === CABINET ONLY: convolution + gain ===
        let mut filters = ChainFilters::default();
        let mut chain = EffectChain::new(&base, Some(&ir), &mut filters).unwrap();
        group.bench_with_input(BenchmarkId::new("cabinet", size), &size, |b, _| {
            b.iter(|| black_box(chain.process_block(black_box(&input))).len())
        });

        // === EVERYTHING: convolution + every sample-wise effect ===
        let full = base
            .clone()
            .with_highpass(FilterSettings::lowcut())
            .with_tremolo(TremoloSettings::default())
            .with_chorus(ChorusSettings::default())
            .with_delay(DelaySettings::default());
        let mut filters = ChainFilters::default();
        let mut chain = EffectChain::new(&full, Some(&ir), &mut filters).unwrap();
        group.bench_with_input(BenchmarkId::new("full", size), &size, |b, _| {
            b.iter(|| black_box(chain.process_block(black_box(&input))).len())
        });
    }

    group.finish();
}
