//! WAV file collaborator: impulse-response loading and offline render files.

use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use log::debug;

use crate::error::{DspError, Result};
use crate::io::ImpulseResponse;

/// Decode any PCM or float WAV file to `f32` in -1.0..=1.0, keeping the
/// interleaved channel layout.
pub fn read_wav<P: AsRef<Path>>(path: P) -> Result<ImpulseResponse> {
    let mut reader = WavReader::open(path.as_ref())?;
    let spec = reader.spec();

    let samples = match spec.sample_format {
        SampleFormat::Float => reader.samples::<f32>().collect::<std::result::Result<Vec<_>, _>>()?,
        SampleFormat::Int => {
            let scale = 1.0 / (1u64 << (spec.bits_per_sample.clamp(1, 32) - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
    };

    debug!(
        "decoded {:?}: {} Hz, {} ch, {} bit {:?}, {} samples",
        path.as_ref(),
        spec.sample_rate,
        spec.channels,
        spec.bits_per_sample,
        spec.sample_format,
        samples.len()
    );

    Ok(ImpulseResponse {
        sample_rate: spec.sample_rate,
        channels: spec.channels,
        samples,
    })
}

/// Load an impulse response for the convolution engine.
///
/// Unreadable or undecodable files are reported as
/// [`DspError::UnsupportedSource`]. Channel count and sample rate are checked
/// when the engine is built.
pub fn load_impulse_response<P: AsRef<Path>>(path: P) -> Result<ImpulseResponse> {
    read_wav(path.as_ref()).map_err(|err| match err {
        DspError::Decode(inner) => DspError::UnsupportedSource(format!(
            "could not read '{}': {inner}",
            path.as_ref().display()
        )),
        other => other,
    })
}

/// Read a WAV file as a single channel. Multi-channel files keep their first
/// (left) channel, where the guitar is plugged in.
pub fn read_mono<P: AsRef<Path>>(path: P) -> Result<(u32, Vec<f32>)> {
    let audio = read_wav(path)?;
    let channels = usize::from(audio.channels.max(1));
    let samples = if channels == 1 {
        audio.samples
    } else {
        audio.samples.iter().step_by(channels).copied().collect()
    };
    Ok((audio.sample_rate, samples))
}

/// Write mono 32-bit float WAV.
pub fn write_mono<P: AsRef<Path>>(path: P, sample_rate: u32, samples: &[f32]) -> Result<()> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };

    let mut writer = WavWriter::create(path, spec)?;
    for &sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;
    Ok(())
}
