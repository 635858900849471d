//! cpal-backed implementation of [`AudioBackend`].

use super::capture::CpalCapture;
use super::device::{resolve_device, Direction};
use super::playback::CpalSound;
use super::wav::load_clip;
use super::{AudioBackend, CaptureSession, Permission, PlayableHandle};
use crate::config::AudioConfig;
use anyhow::Result;
use chrono::Local;
use cpal::traits::DeviceTrait;
use std::path::{Path, PathBuf};

/// Audio backend using the system's default cpal host.
pub struct CpalBackend {
    input_device: String,
    output_device: String,
    sample_rate: u32,
    /// Directory for in-progress captures
    capture_dir: PathBuf,
}

impl CpalBackend {
    pub fn new(audio: &AudioConfig, capture_dir: PathBuf) -> Self {
        Self {
            input_device: audio.input_device.clone(),
            output_device: audio.output_device.clone(),
            sample_rate: audio.sample_rate,
            capture_dir,
        }
    }

    fn next_capture_path(&self) -> PathBuf {
        self.capture_dir.join(format!(
            "capture-{}-{}.wav",
            std::process::id(),
            Local::now().timestamp_millis()
        ))
    }
}

impl AudioBackend for CpalBackend {
    fn request_permission(&self) -> Result<Permission> {
        // Desktop platforms have no runtime prompt; access means a usable input device.
        let device = match resolve_device(Direction::Input, &self.input_device) {
            Ok(device) => device,
            Err(e) => {
                return Ok(Permission::Denied {
                    reason: e.to_string(),
                })
            }
        };

        match device.default_input_config() {
            Ok(_) => Ok(Permission::Granted),
            Err(e) => Ok(Permission::Denied {
                reason: format!("Input device cannot be opened: {e}"),
            }),
        }
    }

    fn start_capture(&self) -> Result<Box<dyn CaptureSession>> {
        let capture = CpalCapture::start(
            &self.input_device,
            self.sample_rate,
            self.next_capture_path(),
        )?;
        Ok(Box::new(capture))
    }

    fn load(&self, location: &Path) -> Result<Box<dyn PlayableHandle>> {
        let clip = load_clip(location)?;
        tracing::debug!(
            "Loaded {} ({} ms)",
            location.display(),
            clip.duration_ms()
        );
        Ok(Box::new(CpalSound::new(clip, self.output_device.clone())))
    }
}
