//! Playback of in-memory mono clips through a cpal output stream.
//!
//! The output stream is opened lazily on the first `play` and kept until
//! `unload`. The audio callback and the UI share a [`Playhead`]; the callback
//! advances it and marks the clip finished when it runs out of samples.

use super::capture::stream_error;
use super::device::{resolve_device, suppress_alsa_warnings, Direction};
use super::wav::{samples_to_ms, MonoClip};
use super::{PlayableHandle, PlaybackStatus};
use anyhow::{anyhow, Result};
use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::SampleFormat;
use std::sync::{Arc, Mutex};

/// Read position shared with the output callback.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Playhead {
    /// Position in source samples (fractional when the output rate differs)
    pub position: f64,
    pub playing: bool,
    pub finished: bool,
}

impl Playhead {
    /// Produces the next output sample and advances by `step` source samples.
    ///
    /// Returns `None` when paused or past the end of the clip. Running off the end
    /// stops playback and marks the clip finished.
    pub fn next_sample(&mut self, samples: &[i16], step: f64) -> Option<i16> {
        if !self.playing {
            return None;
        }
        let index = self.position as usize;
        match samples.get(index) {
            Some(&sample) => {
                self.position += step;
                Some(sample)
            }
            None => {
                self.playing = false;
                self.finished = true;
                self.position = samples.len() as f64;
                None
            }
        }
    }
}

/// A loaded clip that plays on an output device.
pub struct CpalSound {
    clip: Arc<MonoClip>,
    playhead: Arc<Mutex<Playhead>>,
    stream: Option<cpal::Stream>,
    /// "default", a device index, or a device name
    device_spec: String,
}

impl CpalSound {
    pub fn new(clip: MonoClip, device_spec: String) -> Self {
        Self {
            clip: Arc::new(clip),
            playhead: Arc::new(Mutex::new(Playhead::default())),
            stream: None,
            device_spec,
        }
    }

    fn open_stream(&self) -> Result<cpal::Stream> {
        let device = resolve_device(Direction::Output, &self.device_spec)?;
        let supported = device.default_output_config()?;
        let output_rate = supported.sample_rate().0;
        let channels = supported.channels() as usize;
        let step = self.clip.sample_rate as f64 / output_rate as f64;
        let config: cpal::StreamConfig = supported.config();

        tracing::debug!(
            "Output stream: {}Hz, {} channels (clip at {}Hz)",
            output_rate,
            channels,
            self.clip.sample_rate
        );

        suppress_alsa_warnings(|| {
            let clip = Arc::clone(&self.clip);
            let playhead = Arc::clone(&self.playhead);
            let stream = match supported.sample_format() {
                SampleFormat::F32 => device.build_output_stream(
                    &config,
                    move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                        fill_output(data, channels, &clip.samples, step, &playhead, 0.0, |s| {
                            s as f32 / i16::MAX as f32
                        });
                    },
                    stream_error,
                    None,
                )?,
                SampleFormat::I16 => device.build_output_stream(
                    &config,
                    move |data: &mut [i16], _: &cpal::OutputCallbackInfo| {
                        fill_output(data, channels, &clip.samples, step, &playhead, 0, |s| s);
                    },
                    stream_error,
                    None,
                )?,
                other => return Err(anyhow!("Unsupported output sample format: {other:?}")),
            };
            stream.play()?;
            Ok(stream)
        })
    }

    fn with_playhead<T>(&self, f: impl FnOnce(&mut Playhead) -> T) -> Result<T> {
        let mut playhead = self
            .playhead
            .lock()
            .map_err(|_| anyhow!("Playhead lock poisoned"))?;
        Ok(f(&mut playhead))
    }
}

impl PlayableHandle for CpalSound {
    fn play(&mut self) -> Result<()> {
        if self.stream.is_none() {
            self.stream = Some(self.open_stream()?);
        }
        self.with_playhead(|head| {
            if head.finished {
                head.position = 0.0;
                head.finished = false;
            }
            head.playing = true;
        })
    }

    fn pause(&mut self) -> Result<()> {
        self.with_playhead(|head| head.playing = false)
    }

    fn status(&self) -> PlaybackStatus {
        let head = self.playhead.lock().map(|h| *h).unwrap_or_default();
        let position_ms = samples_to_ms(head.position as usize, self.clip.sample_rate);
        PlaybackStatus {
            position_ms: position_ms.min(self.duration_ms()),
            is_playing: head.playing,
            finished: head.finished,
        }
    }

    fn duration_ms(&self) -> u64 {
        self.clip.duration_ms()
    }

    fn unload(&mut self) -> Result<()> {
        self.with_playhead(|head| *head = Playhead::default())?;
        if self.stream.take().is_some() {
            tracing::debug!("Output stream released");
        }
        Ok(())
    }
}

/// Writes one block of interleaved output, duplicating the mono sample across channels.
fn fill_output<T: Copy>(
    data: &mut [T],
    channels: usize,
    samples: &[i16],
    step: f64,
    playhead: &Mutex<Playhead>,
    silence: T,
    convert: impl Fn(i16) -> T,
) {
    let Ok(mut head) = playhead.lock() else {
        data.fill(silence);
        return;
    };
    for frame in data.chunks_mut(channels.max(1)) {
        let value = head.next_sample(samples, step).map(&convert).unwrap_or(silence);
        frame.fill(value);
    }
}
