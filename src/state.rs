//! Screen state machines.
//!
//! Each screen keeps its display state in these records and changes it only by
//! reducing events, so combinations like "recording with no elapsed time" or
//! "paused without a position" cannot be expressed.

use crate::audio::PlaybackStatus;

/// Capture side of the recorder screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureState {
    #[default]
    Idle,
    Recording {
        elapsed_ms: u64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureEvent {
    Started,
    /// Status tick from the capture session
    Tick {
        elapsed_ms: u64,
    },
    Stopped,
}

impl CaptureState {
    pub fn reduce(self, event: CaptureEvent) -> Self {
        match (self, event) {
            (Self::Idle, CaptureEvent::Started) => Self::Recording { elapsed_ms: 0 },
            (Self::Recording { elapsed_ms }, CaptureEvent::Tick { elapsed_ms: tick }) => {
                Self::Recording {
                    elapsed_ms: elapsed_ms.max(tick),
                }
            }
            (_, CaptureEvent::Stopped) => Self::Idle,
            (state, _) => state,
        }
    }

    pub fn is_recording(&self) -> bool {
        matches!(self, Self::Recording { .. })
    }

    /// Elapsed time of the active recording, absent when idle.
    pub fn elapsed_ms(&self) -> Option<u64> {
        match self {
            Self::Recording { elapsed_ms } => Some(*elapsed_ms),
            Self::Idle => None,
        }
    }
}

/// Playback of a single handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing {
        position_ms: u64,
    },
    Paused {
        position_ms: u64,
    },
    /// Ran to the end; position is pinned to the clip duration
    Finished {
        position_ms: u64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEvent {
    /// Play or resume
    Play,
    Pause,
    /// Position tick while playing
    Position(u64),
    Completed {
        duration_ms: u64,
    },
}

impl PlaybackEvent {
    /// Translates a handle status into the event it implies, if any.
    pub fn from_status(status: PlaybackStatus, duration_ms: u64) -> Option<Self> {
        if status.finished {
            Some(Self::Completed { duration_ms })
        } else if status.is_playing {
            Some(Self::Position(status.position_ms))
        } else {
            None
        }
    }
}

impl PlaybackState {
    pub fn reduce(self, event: PlaybackEvent) -> Self {
        match (self, event) {
            (Self::Paused { position_ms }, PlaybackEvent::Play) => Self::Playing { position_ms },
            (Self::Playing { .. }, PlaybackEvent::Play) => self,
            (_, PlaybackEvent::Play) => Self::Playing { position_ms: 0 },
            (Self::Playing { position_ms }, PlaybackEvent::Pause) => Self::Paused { position_ms },
            (Self::Playing { .. }, PlaybackEvent::Position(position_ms)) => {
                Self::Playing { position_ms }
            }
            (Self::Playing { .. } | Self::Paused { .. }, PlaybackEvent::Completed { duration_ms }) => {
                Self::Finished {
                    position_ms: duration_ms,
                }
            }
            (state, _) => state,
        }
    }

    pub fn is_playing(&self) -> bool {
        matches!(self, Self::Playing { .. })
    }

    pub fn position_ms(&self) -> Option<u64> {
        match self {
            Self::Playing { position_ms }
            | Self::Paused { position_ms }
            | Self::Finished { position_ms } => Some(*position_ms),
            Self::Stopped => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Playing { .. } => "playing",
            Self::Paused { .. } => "paused",
            Self::Finished { .. } => "finished",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_elapsed_never_decreases() {
        let ticks = [0, 120, 80, 400, 400, 390, 1000];
        let mut state = CaptureState::Idle.reduce(CaptureEvent::Started);
        let mut last = 0;
        for tick in ticks {
            state = state.reduce(CaptureEvent::Tick { elapsed_ms: tick });
            let elapsed = state.elapsed_ms().unwrap();
            assert!(elapsed >= last);
            last = elapsed;
        }
        assert_eq!(last, 1000);
    }

    #[test]
    fn test_capture_stop_clears_elapsed() {
        let state = CaptureState::Idle
            .reduce(CaptureEvent::Started)
            .reduce(CaptureEvent::Tick { elapsed_ms: 750 })
            .reduce(CaptureEvent::Stopped);
        assert_eq!(state, CaptureState::Idle);
        assert_eq!(state.elapsed_ms(), None);
    }

    #[test]
    fn test_capture_tick_ignored_when_idle() {
        let state = CaptureState::Idle.reduce(CaptureEvent::Tick { elapsed_ms: 50 });
        assert_eq!(state, CaptureState::Idle);
    }

    #[test]
    fn test_second_start_keeps_elapsed() {
        let state = CaptureState::Recording { elapsed_ms: 300 }.reduce(CaptureEvent::Started);
        assert_eq!(state, CaptureState::Recording { elapsed_ms: 300 });
    }

    #[test]
    fn test_pause_resume_keeps_position() {
        let state = PlaybackState::Stopped
            .reduce(PlaybackEvent::Play)
            .reduce(PlaybackEvent::Position(640))
            .reduce(PlaybackEvent::Pause);
        assert_eq!(state, PlaybackState::Paused { position_ms: 640 });
        assert!(!state.is_playing());

        let state = state.reduce(PlaybackEvent::Play);
        assert_eq!(state, PlaybackState::Playing { position_ms: 640 });
    }

    #[test]
    fn test_completion_pins_position_to_duration() {
        let state = PlaybackState::Playing { position_ms: 2900 }
            .reduce(PlaybackEvent::Completed { duration_ms: 3000 });
        assert_eq!(state, PlaybackState::Finished { position_ms: 3000 });
        assert!(!state.is_playing());
    }

    #[test]
    fn test_play_after_finish_restarts() {
        let state = PlaybackState::Finished { position_ms: 3000 }.reduce(PlaybackEvent::Play);
        assert_eq!(state, PlaybackState::Playing { position_ms: 0 });
    }

    #[test]
    fn test_position_ignored_unless_playing() {
        let paused = PlaybackState::Paused { position_ms: 10 };
        assert_eq!(paused.reduce(PlaybackEvent::Position(99)), paused);
        assert_eq!(
            PlaybackState::Stopped.reduce(PlaybackEvent::Pause),
            PlaybackState::Stopped
        );
    }

    #[test]
    fn test_event_from_status() {
        let finished = PlaybackStatus {
            position_ms: 900,
            is_playing: false,
            finished: true,
        };
        assert_eq!(
            PlaybackEvent::from_status(finished, 1000),
            Some(PlaybackEvent::Completed { duration_ms: 1000 })
        );

        let playing = PlaybackStatus {
            position_ms: 250,
            is_playing: true,
            finished: false,
        };
        assert_eq!(
            PlaybackEvent::from_status(playing, 1000),
            Some(PlaybackEvent::Position(250))
        );
        assert_eq!(PlaybackEvent::from_status(PlaybackStatus::default(), 1000), None);
    }
}
