//! Microphone capture through cpal.
//!
//! Audio is captured from the configured input device at its native sample rate,
//! mixed down to mono and buffered in memory. Stopping the capture writes the
//! buffer to a WAV file at the session's temporary location.

use super::device::{resolve_device, suppress_alsa_warnings, Direction};
use super::wav::{downmix_to_mono, f32_to_i16, samples_to_ms, write_wav};
use super::{CaptureSession, CapturedClip};
use anyhow::{anyhow, Result};
use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::SampleFormat;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// A running capture from an input device.
pub struct CpalCapture {
    /// Actual recording sample rate from device
    sample_rate: u32,
    /// Recorded audio samples (i16 PCM mono)
    samples: Arc<Mutex<Vec<i16>>>,
    /// Active input stream, dropped on stop
    stream: Option<cpal::Stream>,
    /// Where the clip is written on stop
    location: PathBuf,
}

impl CpalCapture {
    /// Opens the input device and starts streaming samples into memory.
    ///
    /// # Arguments
    /// * `device_spec` - "default", a device index, or a device name
    /// * `requested_sample_rate` - Only used to warn when the device runs at a different rate
    /// * `location` - Temporary file the clip is written to on stop
    ///
    /// # Errors
    /// - If the device is not available
    /// - If the device uses a sample format other than i16 or f32
    /// - If the stream cannot be built or started
    pub fn start(device_spec: &str, requested_sample_rate: u32, location: PathBuf) -> Result<Self> {
        let device = resolve_device(Direction::Input, device_spec)?;
        let device_name = device
            .name()
            .unwrap_or_else(|_| "Unknown device".to_string());
        tracing::info!("Recording device: {}", device_name);

        let supported = device.default_input_config()?;
        let sample_rate = supported.sample_rate().0;
        let channels = supported.channels() as usize;

        if sample_rate != requested_sample_rate {
            tracing::warn!(
                "Requested sample rate {}Hz but device uses {}Hz. Recording at device rate.",
                requested_sample_rate,
                sample_rate
            );
        }
        tracing::debug!("Device configuration: {}Hz, {} channels", sample_rate, channels);

        let samples = Arc::new(Mutex::new(Vec::new()));
        let config: cpal::StreamConfig = supported.config();

        let stream = suppress_alsa_warnings(|| {
            let stream = match supported.sample_format() {
                SampleFormat::I16 => {
                    let samples = Arc::clone(&samples);
                    device.build_input_stream(
                        &config,
                        move |data: &[i16], _: &cpal::InputCallbackInfo| {
                            append_mono(&samples, downmix_to_mono(data, channels));
                        },
                        stream_error,
                        None,
                    )?
                }
                SampleFormat::F32 => {
                    let samples = Arc::clone(&samples);
                    device.build_input_stream(
                        &config,
                        move |data: &[f32], _: &cpal::InputCallbackInfo| {
                            let converted: Vec<i16> = data.iter().map(|&s| f32_to_i16(s)).collect();
                            append_mono(&samples, downmix_to_mono(&converted, channels));
                        },
                        stream_error,
                        None,
                    )?
                }
                other => return Err(anyhow!("Unsupported input sample format: {other:?}")),
            };
            stream.play()?;
            Ok(stream)
        })?;

        tracing::debug!("Audio input stream started");
        Ok(Self {
            sample_rate,
            samples,
            stream: Some(stream),
            location,
        })
    }

    fn sample_count(&self) -> usize {
        self.samples.lock().map(|s| s.len()).unwrap_or(0)
    }
}

impl CaptureSession for CpalCapture {
    fn elapsed_ms(&self) -> u64 {
        samples_to_ms(self.sample_count(), self.sample_rate)
    }

    fn stop(mut self: Box<Self>) -> Result<CapturedClip> {
        // Dropping the stream stops the device callback
        self.stream = None;

        let samples = self
            .samples
            .lock()
            .map_err(|_| anyhow!("Capture buffer lock poisoned"))?
            .clone();

        if samples.is_empty() {
            tracing::warn!("Recording stopped with no samples captured");
            return Err(anyhow!("No audio was captured"));
        }

        let duration_ms = samples_to_ms(samples.len(), self.sample_rate);
        tracing::info!(
            "Recording stopped: {:.2}s ({} samples at {}Hz)",
            duration_ms as f64 / 1000.0,
            samples.len(),
            self.sample_rate
        );

        if let Some(parent) = self.location.parent() {
            std::fs::create_dir_all(parent)?;
        }
        write_wav(&self.location, &samples, self.sample_rate)?;

        Ok(CapturedClip {
            location: self.location.clone(),
            duration_ms,
        })
    }
}

fn append_mono(buffer: &Arc<Mutex<Vec<i16>>>, mono: Vec<i16>) {
    if let Ok(mut samples) = buffer.lock() {
        samples.extend_from_slice(&mono);
    }
}

pub(super) fn stream_error(err: cpal::StreamError) {
    tracing::error!("Audio stream error: {}", err);
}
