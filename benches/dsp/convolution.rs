//! Benchmarks for block convolution.
//!
//! This is the dominant per-period cost: every output sample is a dot product
//! over the whole impulse response.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use guitar_dsp::dsp::convolution::ConvolutionEngine;
use guitar_dsp::io::ImpulseResponse;

use crate::BLOCK_SIZES;

pub fn bench_convolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/convolution");

    for &taps in &[256usize, 1440, 4096] {
        // Decaying noise-like cabinet response
        let samples: Vec<f32> = (0..taps)
            .map(|j| ((j * 7919 % 211) as f32 / 105.5 - 1.0) * (-(j as f32) / 300.0).exp())
            .collect();
        let ir = ImpulseResponse::mono(48_000, samples);

        for &size in BLOCK_SIZES {
            let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.1).sin()).collect();
            let mut output = vec![0.0f32; size];
            let (mut engine, _) = ConvolutionEngine::new(&ir, size, taps).unwrap();

            group.bench_with_input(
                BenchmarkId::new(format!("{taps}_taps"), size),
                &size,
                |b, _| {
                    b.iter(|| {
                        engine.input_mut().copy_from_slice(&input);
                        engine.apply(black_box(&mut output));
                    })
                },
            );
        }
    }

    group.finish();
}
