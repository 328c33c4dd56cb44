//! cpal duplex device wired to the processing thread through `RingIo`.

use std::time::Duration;

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use log::{debug, error, info};

use guitar_dsp::io::ring::RingIo;
use guitar_dsp::EngineConfig;

/// Keeps both device streams alive. Dropping it stops audio.
pub struct Duplex {
    _input: cpal::Stream,
    _output: cpal::Stream,
}

/// Open the default input and output devices at the configured sample rate
/// with one period per callback.
///
/// The guitar is taken from the first input channel; the processed signal is
/// copied to every output channel.
pub fn open(config: &EngineConfig) -> EyreResult<(RingIo, Duplex)> {
    let (sample_rate, period_size) = (config.sample_rate, config.period_size);
    let host = cpal::default_host();
    let input_device = host
        .default_input_device()
        .ok_or_else(|| eyre!("no default input device available"))?;
    let output_device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no default output device available"))?;

    let input_channels = input_device
        .default_input_config()
        .wrap_err("failed to fetch default input config")?
        .channels();
    let output_channels = output_device
        .default_output_config()
        .wrap_err("failed to fetch default output config")?
        .channels();

    let stream_config = |channels: u16| cpal::StreamConfig {
        channels,
        sample_rate: cpal::SampleRate(sample_rate),
        buffer_size: cpal::BufferSize::Fixed(period_size as u32),
    };

    debug!(
        "input: {:?} ({} ch), output: {:?} ({} ch)",
        input_device.name().ok(),
        input_channels,
        output_device.name().ok(),
        output_channels
    );

    // A period's worth of wall-clock time, with generous slack for scheduling.
    let period = Duration::from_secs_f64(config.period_seconds());
    let (io, mut capture, mut playback) = RingIo::new(period_size, config.periods, period * 50);

    let in_stride = usize::from(input_channels.max(1));
    let input = input_device
        .build_input_stream(
            &stream_config(input_channels),
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                for frame in data.chunks(in_stride) {
                    capture.push(frame[0]);
                }
            },
            |err| error!("input stream error: {err}"),
            None,
        )
        .wrap_err("failed to build input stream")?;

    let out_stride = usize::from(output_channels.max(1));
    let output = output_device
        .build_output_stream(
            &stream_config(output_channels),
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                for frame in data.chunks_mut(out_stride) {
                    frame.fill(playback.pop());
                }
            },
            |err| error!("output stream error: {err}"),
            None,
        )
        .wrap_err("failed to build output stream")?;

    output.play().wrap_err("failed to start playback")?;
    input.play().wrap_err("failed to start capture")?;

    info!(
        "audio device open: {} Hz, {} samples x {} periods",
        sample_rate, period_size, config.periods
    );

    Ok((
        io,
        Duplex {
            _input: input,
            _output: output,
        },
    ))
}
