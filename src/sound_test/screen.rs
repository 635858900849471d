//! State and operations behind the sound test screen.

use crate::audio::{AudioBackend, Permission, PlayableHandle};
use crate::error::{ClipError, Operation, Result};
use crate::state::{PlaybackEvent, PlaybackState};
use crate::ui::PERMISSION_NOTICE;
use std::path::{Path, PathBuf};

/// The loaded sound, if any. Playback state only exists alongside a handle.
enum Slot {
    Empty,
    Loaded {
        handle: Box<dyn PlayableHandle>,
        state: PlaybackState,
    },
}

pub struct SoundTestScreen<B: AudioBackend> {
    backend: B,
    asset: PathBuf,
    slot: Slot,
    notice: Option<String>,
}

impl<B: AudioBackend> SoundTestScreen<B> {
    pub fn new(backend: B, asset: PathBuf) -> Self {
        Self {
            backend,
            asset,
            slot: Slot::Empty,
            notice: None,
        }
    }

    /// Asks for microphone access, raising a notice on refusal.
    pub fn request_permission(&mut self) -> Result<()> {
        match self.backend.request_permission() {
            Ok(Permission::Granted) => Ok(()),
            Ok(Permission::Denied { reason }) => {
                self.notice = Some(PERMISSION_NOTICE.to_string());
                Err(ClipError::PermissionDenied { reason })
            }
            Err(e) => Err(ClipError::failed(Operation::RequestPermission, e)),
        }
    }

    /// Loads the sound asset, releasing any previously loaded sound first.
    pub fn load_sound(&mut self) -> Result<()> {
        self.release();

        let handle = self
            .backend
            .load(&self.asset)
            .map_err(|e| ClipError::failed(Operation::LoadSound, e))?;
        tracing::info!(
            "Sound loaded: {} ({} ms)",
            self.asset.display(),
            handle.duration_ms()
        );
        self.slot = Slot::Loaded {
            handle,
            state: PlaybackState::Stopped,
        };
        Ok(())
    }

    pub fn play_sound(&mut self) -> Result<()> {
        self.transition(Operation::PlaySound, PlaybackEvent::Play, |h| h.play())
    }

    pub fn pause_sound(&mut self) -> Result<()> {
        self.transition(Operation::PauseSound, PlaybackEvent::Pause, |h| h.pause())
    }

    pub fn resume_sound(&mut self) -> Result<()> {
        self.transition(Operation::ResumeSound, PlaybackEvent::Play, |h| h.play())
    }

    fn transition(
        &mut self,
        operation: Operation,
        event: PlaybackEvent,
        call: impl FnOnce(&mut dyn PlayableHandle) -> anyhow::Result<()>,
    ) -> Result<()> {
        match &mut self.slot {
            Slot::Empty => {
                tracing::info!("Sound not loaded yet");
                Err(ClipError::unmet(operation, "sound not loaded yet"))
            }
            Slot::Loaded { handle, state } => {
                call(handle.as_mut()).map_err(|e| ClipError::failed(operation, e))?;
                *state = state.reduce(event);
                tracing::debug!("{operation}: now {}", state.label());
                Ok(())
            }
        }
    }

    /// Applies the loaded handle's position and completion status.
    pub fn tick(&mut self) {
        if let Slot::Loaded { handle, state } = &mut self.slot {
            if let Some(event) = PlaybackEvent::from_status(handle.status(), handle.duration_ms()) {
                *state = state.reduce(event);
            }
        }
    }

    /// Releases the loaded sound when the screen is left.
    pub fn teardown(&mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Slot::Loaded { mut handle, .. } = std::mem::replace(&mut self.slot, Slot::Empty) {
            match handle.unload() {
                Ok(()) => tracing::debug!("Sound released"),
                Err(e) => ClipError::failed(Operation::UnloadSound, e).log(),
            }
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.slot, Slot::Loaded { .. })
    }

    /// Playback state of the loaded sound, absent when nothing is loaded.
    pub fn state(&self) -> Option<PlaybackState> {
        match &self.slot {
            Slot::Loaded { state, .. } => Some(*state),
            Slot::Empty => None,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.state().map(|s| s.is_playing()).unwrap_or(false)
    }

    pub fn duration_ms(&self) -> Option<u64> {
        match &self.slot {
            Slot::Loaded { handle, .. } => Some(handle.duration_ms()),
            Slot::Empty => None,
        }
    }

    pub fn asset(&self) -> &Path {
        &self.asset
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }
}

impl<B: AudioBackend> Drop for SoundTestScreen<B> {
    fn drop(&mut self) {
        self.release();
    }
}
