//! State and operations behind the recorder screen.

use super::entries::{RecordingEntry, RecordingList};
use crate::audio::{AudioBackend, CaptureSession, Permission};
use crate::error::{ClipError, Operation, Result};
use crate::state::{CaptureEvent, CaptureState, PlaybackEvent, PlaybackState};
use crate::ui::{format_duration, PERMISSION_NOTICE};
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// The recording most recently chosen for playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NowPlaying {
    pub entry: usize,
    pub state: PlaybackState,
}

/// State and operations behind the recorder view.
pub struct RecorderScreen<B: AudioBackend> {
    backend: B,
    capture: CaptureState,
    session: Option<Box<dyn CaptureSession>>,
    recordings: RecordingList,
    now_playing: Option<NowPlaying>,
    save_dir: PathBuf,
    extension: String,
    notice: Option<String>,
}

impl<B: AudioBackend> RecorderScreen<B> {
    pub fn new(backend: B, save_dir: PathBuf, extension: String) -> Self {
        Self {
            backend,
            capture: CaptureState::Idle,
            session: None,
            recordings: RecordingList::default(),
            now_playing: None,
            save_dir,
            extension,
            notice: None,
        }
    }

    /// Asks for microphone access. A refusal raises a notice but does not lock the screen.
    pub fn request_permission(&mut self) -> Result<()> {
        match self.backend.request_permission() {
            Ok(Permission::Granted) => {
                tracing::debug!("Microphone permission granted");
                Ok(())
            }
            Ok(Permission::Denied { reason }) => {
                self.notice = Some(PERMISSION_NOTICE.to_string());
                Err(ClipError::PermissionDenied { reason })
            }
            Err(e) => Err(ClipError::failed(Operation::RequestPermission, e)),
        }
    }

    /// Begins a new recording.
    ///
    /// # Errors
    /// - `PreconditionUnmet` if a recording is already in progress
    /// - `OperationFailed` if the input device cannot be started
    pub fn start_recording(&mut self) -> Result<()> {
        if self.capture.is_recording() {
            return Err(ClipError::unmet(
                Operation::StartRecording,
                "a recording is already in progress",
            ));
        }

        let session = self
            .backend
            .start_capture()
            .map_err(|e| ClipError::failed(Operation::StartRecording, e))?;
        self.session = Some(session);
        self.capture = self.capture.reduce(CaptureEvent::Started);
        tracing::info!("Recording started");
        Ok(())
    }

    /// Finishes the current recording and appends it to the list.
    ///
    /// Returns the index of the new entry. The screen is idle afterwards even if
    /// finalizing the clip fails; the failed capture is discarded.
    pub fn stop_recording(&mut self) -> Result<usize> {
        let Some(session) = self.session.take() else {
            return Err(ClipError::unmet(
                Operation::StopRecording,
                "no recording in progress",
            ));
        };
        self.capture = self.capture.reduce(CaptureEvent::Stopped);

        let clip = session
            .stop()
            .map_err(|e| ClipError::failed(Operation::StopRecording, e))?;
        let handle = match self.backend.load(&clip.location) {
            Ok(handle) => handle,
            Err(e) => {
                remove_capture(&clip.location);
                return Err(ClipError::failed(Operation::StopRecording, e));
            }
        };

        let index = self.recordings.push(RecordingEntry::new(
            handle,
            clip.duration_ms,
            clip.location,
        ));
        tracing::info!(
            "Recording {} stored ({})",
            index + 1,
            format_duration(clip.duration_ms)
        );
        Ok(index)
    }

    /// Starts or stops recording depending on the current state.
    ///
    /// Returns the index of the finished entry when a recording was stopped.
    pub fn toggle_recording(&mut self) -> Result<Option<usize>> {
        if self.capture.is_recording() {
            self.stop_recording().map(Some)
        } else {
            self.start_recording().map(|_| None)
        }
    }

    /// Plays a recording from the list. Another recording that is playing is released first.
    pub fn play_recording(&mut self, index: usize) -> Result<()> {
        if self.recordings.get(index).is_none() {
            return Err(ClipError::unmet(Operation::PlayRecording, "no such recording"));
        }

        if let Some(previous) = self.now_playing.filter(|p| p.entry != index) {
            if let Some(entry) = self.recordings.get_mut(previous.entry) {
                if let Err(e) = entry.handle_mut().unload() {
                    tracing::warn!("Failed to release recording {}: {}", previous.entry + 1, e);
                }
            }
        }

        let entry = self
            .recordings
            .get_mut(index)
            .ok_or_else(|| ClipError::unmet(Operation::PlayRecording, "no such recording"))?;
        tracing::debug!("Attempting to play recording {}", index + 1);
        entry
            .handle_mut()
            .play()
            .map_err(|e| ClipError::failed(Operation::PlayRecording, e))?;

        let state = match self.now_playing {
            Some(playing) if playing.entry == index => playing.state,
            _ => PlaybackState::Stopped,
        };
        self.now_playing = Some(NowPlaying {
            entry: index,
            state: state.reduce(PlaybackEvent::Play),
        });
        tracing::info!("Playback started for recording {}", index + 1);
        Ok(())
    }

    /// Copies a recording's file verbatim into the save directory.
    ///
    /// Returns the destination path. An existing file is never overwritten.
    pub async fn save_recording(&self, index: usize) -> Result<PathBuf> {
        self.save_recording_at(index, Local::now()).await
    }

    async fn save_recording_at(&self, index: usize, now: DateTime<Local>) -> Result<PathBuf> {
        let entry = self
            .recordings
            .get(index)
            .ok_or_else(|| ClipError::unmet(Operation::SaveRecording, "no such recording"))?;
        let mut source = tokio::fs::File::open(entry.source())
            .await
            .map_err(|e| ClipError::failed(Operation::SaveRecording, e))?;

        tokio::fs::create_dir_all(&self.save_dir)
            .await
            .map_err(|e| ClipError::failed(Operation::SaveRecording, e))?;
        let (destination, mut file) = self.create_destination(now).await?;
        tokio::io::copy(&mut source, &mut file)
            .await
            .map_err(|e| ClipError::failed(Operation::SaveRecording, e))?;
        file.flush()
            .await
            .map_err(|e| ClipError::failed(Operation::SaveRecording, e))?;

        tracing::info!("File saved to: {}", destination.display());
        Ok(destination)
    }

    /// Creates the first free destination for `now`, adding a counter on collision.
    async fn create_destination(&self, now: DateTime<Local>) -> Result<(PathBuf, tokio::fs::File)> {
        let mut attempt = 0;
        loop {
            let path = self.save_path(now, attempt);
            match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => return Ok((path, file)),
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    tracing::debug!("{} already exists", path.display());
                    attempt += 1;
                }
                Err(e) => return Err(ClipError::failed(Operation::SaveRecording, e)),
            }
        }
    }

    /// Destination for a recording saved at `now`. Attempts after the first get a counter suffix.
    pub fn save_path(&self, now: DateTime<Local>, attempt: u32) -> PathBuf {
        let stem = match attempt {
            0 => format!("recording-{}", now.timestamp_millis()),
            n => format!("recording-{}-{}", now.timestamp_millis(), n),
        };
        self.save_dir.join(format!("{}.{}", stem, self.extension))
    }

    /// Polls the capture session and the playing handle and applies their status.
    pub fn tick(&mut self) {
        if let Some(session) = &self.session {
            self.capture = self.capture.reduce(CaptureEvent::Tick {
                elapsed_ms: session.elapsed_ms(),
            });
        }

        if let Some(playing) = &mut self.now_playing {
            if let Some(entry) = self.recordings.get(playing.entry) {
                let status = entry.handle().status();
                if let Some(event) = PlaybackEvent::from_status(status, entry.duration_ms()) {
                    playing.state = playing.state.reduce(event);
                }
            }
        }
    }

    /// Discards an unfinished recording, releases every loaded recording and
    /// deletes their capture files. Saved copies are left alone.
    pub fn shutdown(&mut self) {
        if self.session.take().is_some() {
            tracing::info!("Discarding unfinished recording");
        }
        self.capture = self.capture.reduce(CaptureEvent::Stopped);

        for entry in self.recordings.iter_mut() {
            if let Err(e) = entry.handle_mut().unload() {
                tracing::warn!("Failed to release recording: {}", e);
            }
            remove_capture(entry.source());
        }
        self.now_playing = None;
    }

    pub fn capture(&self) -> CaptureState {
        self.capture
    }

    pub fn recordings(&self) -> &RecordingList {
        &self.recordings
    }

    pub fn now_playing(&self) -> Option<NowPlaying> {
        self.now_playing
    }

    /// Live duration of the recording in progress.
    pub fn recording_duration_text(&self) -> Option<String> {
        self.capture.elapsed_ms().map(format_duration)
    }

    /// Live position of the playing recording, absent unless something is playing.
    pub fn playback_position_text(&self) -> Option<String> {
        self.now_playing
            .filter(|playing| playing.state.is_playing())
            .and_then(|playing| playing.state.position_ms())
            .map(format_duration)
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }
}

fn remove_capture(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        tracing::warn!("Failed to remove capture file {}: {}", path.display(), e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::fake::FakeBackend;
    use tempfile::TempDir;

    fn screen() -> (RecorderScreen<FakeBackend>, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let backend = FakeBackend::new(dir.path());
        let screen = RecorderScreen::new(backend, dir.path().join("saved"), "wav".to_string());
        (screen, dir)
    }

    fn record(screen: &mut RecorderScreen<FakeBackend>, elapsed_ms: u64) -> usize {
        screen.start_recording().unwrap();
        screen.backend.set_elapsed(elapsed_ms);
        screen.tick();
        screen.stop_recording().unwrap()
    }

    #[test]
    fn test_record_once_creates_one_entry() {
        let (mut screen, _dir) = screen();

        screen.start_recording().unwrap();
        assert!(screen.capture().is_recording());
        screen.backend.set_elapsed(1200);
        screen.tick();
        assert_eq!(screen.recording_duration_text().as_deref(), Some("0:01"));

        let index = screen.stop_recording().unwrap();

        assert_eq!(index, 0);
        assert_eq!(screen.recordings().len(), 1);
        let entry = screen.recordings().get(0).unwrap();
        assert!(entry.duration_ms() > 0);
        assert!(!entry.source().as_os_str().is_empty());
        assert!(entry.source().exists());
        assert_eq!(screen.recording_duration_text(), None);
        assert_eq!(screen.capture(), CaptureState::Idle);
    }

    #[test]
    fn test_entries_follow_recording_order() {
        let (mut screen, _dir) = screen();
        let durations = [300, 1500, 800, 2500];
        for duration in durations {
            record(&mut screen, duration);
        }

        let recorded: Vec<u64> = screen.recordings().iter().map(|e| e.duration_ms()).collect();
        assert_eq!(recorded, durations);
    }

    #[test]
    fn test_duration_display_never_decreases() {
        let (mut screen, _dir) = screen();
        screen.start_recording().unwrap();

        let mut last = 0;
        for elapsed in [100, 900, 600, 2000] {
            screen.backend.set_elapsed(elapsed);
            screen.tick();
            let shown = screen.capture().elapsed_ms().unwrap();
            assert!(shown >= last);
            last = shown;
        }
        assert_eq!(last, 2000);
    }

    #[test]
    fn test_second_start_rejected() {
        let (mut screen, _dir) = screen();
        screen.start_recording().unwrap();

        let err = screen.start_recording().unwrap_err();
        assert!(err.is_precondition());
        assert_eq!(screen.backend.control.borrow().captures_started, 1);
    }

    #[test]
    fn test_stop_without_recording_rejected() {
        let (mut screen, _dir) = screen();
        assert!(screen.stop_recording().unwrap_err().is_precondition());
        assert!(screen.recordings().is_empty());
    }

    #[test]
    fn test_start_failure_leaves_idle() {
        let (mut screen, _dir) = screen();
        screen.backend.control.borrow_mut().fail_start = true;

        let err = screen.start_recording().unwrap_err();
        assert!(matches!(
            err,
            ClipError::OperationFailed {
                operation: Operation::StartRecording,
                ..
            }
        ));
        assert_eq!(screen.capture(), CaptureState::Idle);
    }

    #[test]
    fn test_stop_failure_discards_capture() {
        let (mut screen, _dir) = screen();
        screen.start_recording().unwrap();
        screen.backend.control.borrow_mut().fail_stop = true;

        assert!(screen.stop_recording().is_err());
        assert_eq!(screen.capture(), CaptureState::Idle);
        assert!(screen.recordings().is_empty());

        // A new recording can be started afterwards
        screen.start_recording().unwrap();
    }

    #[test]
    fn test_load_failure_removes_capture_file() {
        let (mut screen, dir) = screen();
        screen.start_recording().unwrap();
        screen.backend.set_elapsed(300);
        screen.backend.control.borrow_mut().fail_load = true;

        assert!(screen.stop_recording().is_err());
        assert!(screen.recordings().is_empty());
        assert!(!dir.path().join("capture-1.wav").exists());
    }

    #[test]
    fn test_playback_completes_at_entry_duration() {
        let (mut screen, _dir) = screen();
        let index = record(&mut screen, 2400);

        screen.play_recording(index).unwrap();
        let handle = screen.backend.handle(0);
        handle.borrow_mut().status.position_ms = 700;
        screen.tick();
        assert_eq!(screen.playback_position_text().as_deref(), Some("0:01"));
        assert_eq!(
            screen.now_playing().unwrap().state,
            PlaybackState::Playing { position_ms: 700 }
        );

        handle.borrow_mut().finish();
        screen.tick();

        let playing = screen.now_playing().unwrap();
        assert_eq!(playing.state, PlaybackState::Finished { position_ms: 2400 });
        assert!(!playing.state.is_playing());
        assert_eq!(screen.playback_position_text(), None);
    }

    #[test]
    fn test_playing_another_entry_releases_previous() {
        let (mut screen, _dir) = screen();
        record(&mut screen, 500);
        record(&mut screen, 700);

        screen.play_recording(0).unwrap();
        screen.play_recording(1).unwrap();

        assert!(screen.backend.handle(0).borrow().unloaded);
        assert!(screen.backend.handle(1).borrow().status.is_playing);
        assert_eq!(screen.now_playing().unwrap().entry, 1);
    }

    #[test]
    fn test_play_unknown_entry_rejected() {
        let (mut screen, _dir) = screen();
        assert!(screen.play_recording(3).unwrap_err().is_precondition());
        assert_eq!(screen.now_playing(), None);
    }

    #[test]
    fn test_play_failure_keeps_state() {
        let (mut screen, _dir) = screen();
        record(&mut screen, 500);
        screen.backend.control.borrow_mut().fail_play = true;

        assert!(screen.play_recording(0).is_err());
        assert_eq!(screen.now_playing(), None);
    }

    #[tokio::test]
    async fn test_save_copies_bytes_verbatim() {
        let (mut screen, _dir) = screen();
        let index = record(&mut screen, 900);

        let destination = screen.save_recording(index).await.unwrap();

        let source = std::fs::read(screen.recordings().get(index).unwrap().source()).unwrap();
        let saved = std::fs::read(&destination).unwrap();
        assert_eq!(source, saved);
        assert!(destination
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("recording-"));
        assert_eq!(destination.extension().unwrap(), "wav");
    }

    #[tokio::test]
    async fn test_save_missing_source_fails() {
        let (mut screen, _dir) = screen();
        let index = record(&mut screen, 900);
        std::fs::remove_file(screen.recordings().get(index).unwrap().source()).unwrap();

        let err = screen.save_recording(index).await.unwrap_err();
        assert!(matches!(
            err,
            ClipError::OperationFailed {
                operation: Operation::SaveRecording,
                ..
            }
        ));
    }

    #[test]
    fn test_save_path_uses_timestamp() {
        let (screen, dir) = screen();
        let now = DateTime::parse_from_rfc3339("2024-05-01T12:00:00+00:00")
            .unwrap()
            .with_timezone(&Local);

        assert_eq!(
            screen.save_path(now, 0),
            dir.path().join("saved").join("recording-1714564800000.wav")
        );
        assert_eq!(
            screen.save_path(now, 2),
            dir.path().join("saved").join("recording-1714564800000-2.wav")
        );
    }

    #[tokio::test]
    async fn test_saves_in_same_millisecond_do_not_overwrite() {
        let (mut screen, _dir) = screen();
        let first = record(&mut screen, 300);
        let second = record(&mut screen, 900);
        let now = DateTime::parse_from_rfc3339("2024-05-01T12:00:00+00:00")
            .unwrap()
            .with_timezone(&Local);

        let first_path = screen.save_recording_at(first, now).await.unwrap();
        let second_path = screen.save_recording_at(second, now).await.unwrap();

        assert_ne!(first_path, second_path);
        assert!(second_path.to_string_lossy().ends_with("recording-1714564800000-1.wav"));
        let first_source = std::fs::read(screen.recordings().get(first).unwrap().source()).unwrap();
        let second_source =
            std::fs::read(screen.recordings().get(second).unwrap().source()).unwrap();
        assert_eq!(std::fs::read(&first_path).unwrap(), first_source);
        assert_eq!(std::fs::read(&second_path).unwrap(), second_source);
    }

    #[test]
    fn test_permission_denied_raises_notice() {
        let (mut screen, _dir) = screen();
        screen.backend.control.borrow_mut().permission = Permission::Denied {
            reason: "no input device".to_string(),
        };

        let err = screen.request_permission().unwrap_err();
        assert!(matches!(err, ClipError::PermissionDenied { .. }));
        assert_eq!(screen.notice(), Some(PERMISSION_NOTICE));

        // Recording is still allowed after the notice
        screen.dismiss_notice();
        assert_eq!(screen.notice(), None);
        screen.start_recording().unwrap();
    }

    #[test]
    fn test_shutdown_releases_everything() {
        let (mut screen, _dir) = screen();
        record(&mut screen, 400);
        record(&mut screen, 400);
        screen.start_recording().unwrap();

        screen.shutdown();

        assert_eq!(screen.capture(), CaptureState::Idle);
        assert_eq!(screen.backend.control.borrow().unloads, 2);
    }

    #[test]
    fn test_shutdown_removes_capture_files() {
        let (mut screen, _dir) = screen();
        record(&mut screen, 400);
        record(&mut screen, 600);
        let sources: Vec<PathBuf> = screen
            .recordings()
            .iter()
            .map(|entry| entry.source().to_path_buf())
            .collect();
        assert!(sources.iter().all(|source| source.exists()));

        screen.shutdown();

        assert_eq!(sources.len(), 2);
        assert!(sources.iter().all(|source| !source.exists()));
    }

    #[test]
    fn test_toggle_alternates() {
        let (mut screen, _dir) = screen();
        assert_eq!(screen.toggle_recording().unwrap(), None);
        screen.backend.set_elapsed(300);
        assert_eq!(screen.toggle_recording().unwrap(), Some(0));
        assert_eq!(screen.recordings().len(), 1);
    }
}
