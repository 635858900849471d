//! Interactive session hosting the recorder and sound test screens.
//!
//! Runs a single cooperative loop: poll each screen's status, draw the active
//! screen, then wait up to one tick interval for a key press. SIGUSR1 toggles
//! recording as an external trigger.

use crate::audio::{AudioBackend, CpalBackend};
use crate::config::VoxclipConfig;
use crate::error::ClipError;
use crate::recorder::{self, RecorderAction, RecorderScreen, RecorderView};
use crate::setup;
use crate::sound_test::{self, SoundTestAction, SoundTestScreen};
use crate::ui::{ErrorScreen, Notification, Screen, Tui};
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// What the loop does after a sound test key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    /// The sound test was left and the recorder is showing again
    ShowRecorder,
    Quit,
}

/// Everything needed to mount the sound test screen on demand.
struct SoundTestMount {
    config: VoxclipConfig,
    asset: PathBuf,
}

impl SoundTestMount {
    fn mount(&self, notification: &mut Option<Notification>) -> SoundTestScreen<CpalBackend> {
        tracing::info!("Opening sound test");
        let backend = CpalBackend::new(&self.config.audio, self.config.storage.capture_dir());
        let mut screen = SoundTestScreen::new(backend, self.asset.clone());
        report(notification, screen.request_permission());
        screen
    }
}

/// Runs the interactive session, starting on `start`.
///
/// # Errors
/// - If the configuration cannot be loaded (shown on an error screen first)
/// - If the terminal cannot be driven
pub async fn handle_session(start: Screen) -> anyhow::Result<()> {
    tracing::info!("=== voxclip session started ===");

    let config = match VoxclipConfig::load() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("Failed to load configuration: {err}");
            let message = format!(
                "{err}\n\nPlease check your ~/.config/voxclip/voxclip.toml file and try again."
            );
            ErrorScreen::new("Configuration Error", &message).show()?;
            return Err(anyhow::anyhow!("Configuration error: {err}"));
        }
    };

    tracing::info!(
        "Configuration loaded: input={}, output={}, sample_rate={}Hz, tick={}ms",
        config.audio.input_device,
        config.audio.output_device,
        config.audio.sample_rate,
        config.audio.tick_interval_ms
    );

    let save_dir = config.storage.save_dir()?;
    let asset = match &config.sound_test.asset {
        Some(asset) => asset.clone(),
        None => setup::bundled_sound_path()?,
    };
    let tick = Duration::from_millis(config.audio.tick_interval_ms);

    let toggle_requested = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(signal_hook::consts::SIGUSR1, Arc::clone(&toggle_requested))
        .map_err(|e| anyhow::anyhow!("Failed to register signal handler: {e}"))?;

    let backend = CpalBackend::new(&config.audio, config.storage.capture_dir());
    let mut recorder = RecorderScreen::new(backend, save_dir, config.storage.extension.clone());
    let mount = SoundTestMount { config, asset };

    let mut tui = Tui::new()?;
    let mut view = RecorderView::default();
    let mut notification: Option<Notification> = None;
    let mut permission_requested = false;

    let mut sound_screen = match start {
        Screen::SoundTest => Some(mount.mount(&mut notification)),
        Screen::Recorder => {
            show_recorder(&mut recorder, &mut permission_requested, &mut notification);
            None
        }
    };

    loop {
        recorder.tick();
        if let Some(screen) = sound_screen.as_mut() {
            screen.tick();
        }

        if toggle_requested.swap(false, Ordering::Relaxed) {
            tracing::info!("Received SIGUSR1: toggling recording");
            toggle_recording(&mut recorder, &mut view, &mut notification);
        }

        if notification.as_ref().is_some_and(Notification::is_expired) {
            notification = None;
        }

        tui.draw(|frame| match &sound_screen {
            Some(screen) => sound_test::draw(frame, screen, notification.as_ref()),
            None => view.draw(frame, &recorder, notification.as_ref()),
        })?;

        if !event::poll(tick)? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        if sound_screen.is_some() {
            match route_sound_test(&mut sound_screen, key, &mut notification) {
                Flow::Continue => {}
                Flow::ShowRecorder => {
                    show_recorder(&mut recorder, &mut permission_requested, &mut notification);
                }
                Flow::Quit => break,
            }
            continue;
        }

        if recorder.notice().is_some() {
            recorder.dismiss_notice();
            continue;
        }
        match recorder::action_for(key) {
            Some(RecorderAction::ToggleRecording) => {
                toggle_recording(&mut recorder, &mut view, &mut notification);
            }
            Some(RecorderAction::SelectPrevious) => view.select_previous(),
            Some(RecorderAction::SelectNext) => view.select_next(recorder.recordings().len()),
            Some(RecorderAction::Play) => {
                if let Some(index) = view.selected(recorder.recordings().len()) {
                    report(&mut notification, recorder.play_recording(index));
                }
            }
            Some(RecorderAction::Save) => {
                if let Some(index) = view.selected(recorder.recordings().len()) {
                    let saved = recorder.save_recording(index).await;
                    if let Some(path) = report(&mut notification, saved) {
                        notification =
                            Some(Notification::info(format!("Saved to {}", path.display())));
                    }
                }
            }
            Some(RecorderAction::OpenSoundTest) => {
                sound_screen = Some(mount.mount(&mut notification));
            }
            Some(RecorderAction::Quit) => break,
            None => {}
        }
    }

    if let Some(mut screen) = sound_screen.take() {
        screen.teardown();
    }
    recorder.shutdown();
    tui.cleanup()?;

    tracing::info!("=== voxclip session ended ===");
    Ok(())
}

/// Handles a key press on the sound test. Leaving it tears the screen down.
fn route_sound_test<B: AudioBackend>(
    slot: &mut Option<SoundTestScreen<B>>,
    key: KeyEvent,
    notification: &mut Option<Notification>,
) -> Flow {
    let Some(screen) = slot.as_mut() else {
        return Flow::ShowRecorder;
    };
    if screen.notice().is_some() {
        screen.dismiss_notice();
        return Flow::Continue;
    }

    match sound_test::action_for(key) {
        Some(SoundTestAction::Load) => {
            report(notification, screen.load_sound());
        }
        Some(SoundTestAction::Play) => {
            report(notification, screen.play_sound());
        }
        Some(SoundTestAction::Pause) => {
            report(notification, screen.pause_sound());
        }
        Some(SoundTestAction::Resume) => {
            report(notification, screen.resume_sound());
        }
        Some(SoundTestAction::Back) => {
            tracing::debug!("Leaving sound test");
            screen.teardown();
            *slot = None;
            return Flow::ShowRecorder;
        }
        Some(SoundTestAction::Quit) => return Flow::Quit,
        None => {}
    }
    Flow::Continue
}

/// Asks for microphone access the first time the recorder is shown.
fn show_recorder<B: AudioBackend>(
    recorder: &mut RecorderScreen<B>,
    permission_requested: &mut bool,
    notification: &mut Option<Notification>,
) {
    if !std::mem::replace(permission_requested, true) {
        report(notification, recorder.request_permission());
    }
}

fn toggle_recording(
    recorder: &mut RecorderScreen<CpalBackend>,
    view: &mut RecorderView,
    notification: &mut Option<Notification>,
) {
    if let Some(Some(index)) = report(notification, recorder.toggle_recording()) {
        view.select(index);
    }
}

/// Logs a failed operation and raises a notification for it.
///
/// Permission refusals already raise a blocking notice on the screen itself.
fn report<T>(notification: &mut Option<Notification>, result: Result<T, ClipError>) -> Option<T> {
    let err = match result {
        Ok(value) => return Some(value),
        Err(err) => err,
    };

    err.log();
    *notification = match err {
        ClipError::PermissionDenied { .. } => return None,
        _ if err.is_precondition() => Some(Notification::info(err.to_string())),
        _ => Some(Notification::error(err.to_string())),
    };
    None
}
