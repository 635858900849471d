//! Audio capture and playback layer.
//!
//! Screens talk to audio hardware only through the traits defined here:
//! [`AudioBackend`] creates capture sessions and playable handles,
//! [`CaptureSession`] reports elapsed time and finalizes a clip on stop, and
//! [`PlayableHandle`] plays, pauses and reports its position. The production
//! implementation is [`CpalBackend`].

pub mod backend;
pub mod capture;
pub mod device;
pub mod ffmpeg;
pub mod playback;
pub mod wav;

#[cfg(test)]
pub mod fake;

use anyhow::Result;
use std::path::{Path, PathBuf};

pub use backend::CpalBackend;

/// Outcome of a microphone permission request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied { reason: String },
}

/// A clip finalized by [`CaptureSession::stop`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedClip {
    /// Temporary file holding the encoded clip
    pub location: PathBuf,
    /// Total length of the clip in milliseconds
    pub duration_ms: u64,
}

/// Snapshot of a playable handle, read on every status tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlaybackStatus {
    pub position_ms: u64,
    pub is_playing: bool,
    /// Set once playback ran to the end of the clip
    pub finished: bool,
}

/// Entry point to the platform audio capability.
pub trait AudioBackend {
    /// Checks that an input device is available for recording.
    fn request_permission(&self) -> Result<Permission>;

    /// Begins capturing from the configured input device.
    fn start_capture(&self) -> Result<Box<dyn CaptureSession>>;

    /// Loads the audio file at `location` into a playable handle.
    fn load(&self, location: &Path) -> Result<Box<dyn PlayableHandle>>;
}

/// An active recording.
pub trait CaptureSession {
    /// Length of audio captured so far.
    fn elapsed_ms(&self) -> u64;

    /// Stops capturing and writes the clip to its temporary location.
    fn stop(self: Box<Self>) -> Result<CapturedClip>;
}

/// A loaded audio resource.
pub trait PlayableHandle {
    /// Starts or continues playback. Playing a finished clip starts it over.
    fn play(&mut self) -> Result<()>;

    /// Pauses playback, keeping the current position.
    fn pause(&mut self) -> Result<()>;

    fn status(&self) -> PlaybackStatus;

    fn duration_ms(&self) -> u64;

    /// Releases the output stream and rewinds. The handle can be played again afterwards.
    fn unload(&mut self) -> Result<()>;
}
