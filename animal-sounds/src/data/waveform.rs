use std::path::Path;

use anyhow::Context;
use hound::{SampleFormat, WavReader};

use crate::config::SAMPLE_RATE;

/// Loads a WAV file as a mono waveform of exactly `target_length` samples.
///
/// Multi-channel files keep their first channel only, the others are dropped.
/// No resampling is done.
pub fn load_waveform(path: &Path, target_length: usize) -> anyhow::Result<Vec<f32>> {
    let samples = read_first_channel(path)
        .with_context(|| format!("Loading audio from {}", path.display()))?;
    Ok(fix_length(samples, target_length))
}

/// Right-pads with zeros or truncates, so the output is always `target_length` long.
pub fn fix_length(mut samples: Vec<f32>, target_length: usize) -> Vec<f32> {
    samples.resize(target_length, 0.0);
    samples
}

fn read_first_channel(path: &Path) -> anyhow::Result<Vec<f32>> {
    let mut reader = WavReader::open(path)?;
    let spec = reader.spec();

    if spec.sample_rate != SAMPLE_RATE {
        log::debug!(
            "Sample rate mismatch, file={}, rate={}, expected={SAMPLE_RATE}",
            path.display(),
            spec.sample_rate
        );
    }

    let channels = usize::from(spec.channels.max(1));

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
        SampleFormat::Int => {
            let scale = int_scale(spec.bits_per_sample)?;
            reader
                .samples::<i32>()
                .map(|s| s.map(|s| s as f32 / scale))
                .collect::<Result<_, _>>()?
        }
    };

    Ok(interleaved.into_iter().step_by(channels).collect())
}

/// hound widens every integer sample to i32 without shifting, so the full scale depends on the bit depth.
fn int_scale(bits_per_sample: u16) -> anyhow::Result<f32> {
    anyhow::ensure!(
        (1..=32).contains(&bits_per_sample),
        "Unsupported bits per sample: {bits_per_sample}"
    );
    Ok((1u64 << (bits_per_sample - 1)) as f32)
}
