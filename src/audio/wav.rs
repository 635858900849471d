//! WAV encoding and decoding.
//!
//! Everything voxclip plays is held in memory as mono 16-bit PCM. Recordings are
//! written as WAV so they can be copied and reloaded without transcoding.

use super::ffmpeg::decode_to_wav;
use anyhow::{anyhow, Context, Result};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::path::Path;

/// Mono PCM samples with their sample rate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonoClip {
    pub samples: Vec<i16>,
    pub sample_rate: u32,
}

impl MonoClip {
    pub fn duration_ms(&self) -> u64 {
        samples_to_ms(self.samples.len(), self.sample_rate)
    }
}

/// Converts a mono sample count into milliseconds.
pub fn samples_to_ms(sample_count: usize, sample_rate: u32) -> u64 {
    if sample_rate == 0 {
        return 0;
    }
    sample_count as u64 * 1000 / sample_rate as u64
}

/// Averages interleaved frames down to one channel.
pub fn downmix_to_mono(data: &[i16], channels: usize) -> Vec<i16> {
    match channels {
        0 | 1 => data.to_vec(),
        2 => data
            .chunks_exact(2)
            .map(|chunk| ((chunk[0] as i32 + chunk[1] as i32) / 2) as i16)
            .collect(),
        _ => data
            .chunks_exact(channels)
            .map(|chunk| {
                let sum: i32 = chunk.iter().map(|&s| s as i32).sum();
                (sum / channels as i32) as i16
            })
            .collect(),
    }
}

/// Converts a float sample in [-1.0, 1.0] to 16-bit PCM.
pub fn f32_to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

/// Writes mono samples as a 16-bit PCM WAV file.
pub fn write_wav(path: &Path, samples: &[i16], sample_rate: u32) -> Result<()> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    for &sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;

    tracing::debug!("WAV written: {} ({} samples)", path.display(), samples.len());
    Ok(())
}

/// Reads a WAV file of any common PCM layout into a mono clip.
pub fn read_wav(path: &Path) -> Result<MonoClip> {
    let reader = WavReader::open(path)
        .with_context(|| format!("Failed to open WAV file {}", path.display()))?;
    let spec = reader.spec();

    let interleaved: Vec<i16> = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Int, 16) => reader
            .into_samples::<i16>()
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to read audio samples")?,
        (SampleFormat::Int, bits @ (8 | 24 | 32)) => {
            let shift = bits as i32 - 16;
            reader
                .into_samples::<i32>()
                .map(|s| {
                    s.map(|v| {
                        if shift >= 0 {
                            (v >> shift) as i16
                        } else {
                            (v << -shift) as i16
                        }
                    })
                })
                .collect::<Result<Vec<_>, _>>()
                .context("Failed to read audio samples")?
        }
        (SampleFormat::Float, 32) => reader
            .into_samples::<f32>()
            .map(|s| s.map(f32_to_i16))
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to read audio samples")?,
        (format, bits) => {
            return Err(anyhow!(
                "Unsupported WAV layout: {bits}-bit {format:?} in {}",
                path.display()
            ))
        }
    };

    let samples = downmix_to_mono(&interleaved, spec.channels as usize);
    tracing::debug!(
        "Audio file loaded: {} ({}Hz, {} channels, {} mono samples)",
        path.display(),
        spec.sample_rate,
        spec.channels,
        samples.len()
    );

    Ok(MonoClip {
        samples,
        sample_rate: spec.sample_rate,
    })
}

/// Loads any supported audio file. Non-WAV files are decoded through ffmpeg.
pub fn load_clip(path: &Path) -> Result<MonoClip> {
    let is_wav = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("wav"))
        .unwrap_or(false);
    if is_wav {
        return read_wav(path);
    }

    let temp_wav = std::env::temp_dir().join(format!("voxclip_decode_{}.wav", std::process::id()));
    decode_to_wav(path, &temp_wav)?;
    let clip = read_wav(&temp_wav);

    if let Err(e) = std::fs::remove_file(&temp_wav) {
        tracing::debug!("Failed to remove temp file: {}", e);
    }

    clip
}
