//! Scriptable in-memory backend used by screen tests.

use super::wav::write_wav;
use super::{AudioBackend, CaptureSession, CapturedClip, Permission, PlayableHandle, PlaybackStatus};
use anyhow::{anyhow, Result};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

const FAKE_SAMPLE_RATE: u32 = 8000;

/// Shared switches and counters for a [`FakeBackend`].
pub struct FakeControl {
    pub permission: Permission,
    pub fail_start: bool,
    pub fail_stop: bool,
    pub fail_load: bool,
    pub fail_play: bool,
    /// Elapsed time reported by the active capture
    pub elapsed_ms: u64,
    /// Duration reported by loaded handles
    pub load_duration_ms: u64,
    pub permission_requests: usize,
    pub captures_started: usize,
    pub loads: usize,
    pub unloads: usize,
    pub handles: Vec<Rc<RefCell<FakeHandleState>>>,
}

impl Default for FakeControl {
    fn default() -> Self {
        Self {
            permission: Permission::Granted,
            fail_start: false,
            fail_stop: false,
            fail_load: false,
            fail_play: false,
            elapsed_ms: 0,
            load_duration_ms: 1000,
            permission_requests: 0,
            captures_started: 0,
            loads: 0,
            unloads: 0,
            handles: Vec::new(),
        }
    }
}

#[derive(Debug, Default)]
pub struct FakeHandleState {
    pub status: PlaybackStatus,
    pub duration_ms: u64,
    pub play_calls: usize,
    pub pause_calls: usize,
    pub unloaded: bool,
}

impl FakeHandleState {
    /// Simulates the clip running to its end.
    pub fn finish(&mut self) {
        self.status = PlaybackStatus {
            position_ms: self.duration_ms,
            is_playing: false,
            finished: true,
        };
    }
}

pub struct FakeBackend {
    pub control: Rc<RefCell<FakeControl>>,
    capture_dir: PathBuf,
}

impl FakeBackend {
    pub fn new(capture_dir: &Path) -> Self {
        Self {
            control: Rc::new(RefCell::new(FakeControl::default())),
            capture_dir: capture_dir.to_path_buf(),
        }
    }

    pub fn set_elapsed(&self, elapsed_ms: u64) {
        self.control.borrow_mut().elapsed_ms = elapsed_ms;
    }

    pub fn handle(&self, index: usize) -> Rc<RefCell<FakeHandleState>> {
        Rc::clone(&self.control.borrow().handles[index])
    }
}

impl AudioBackend for FakeBackend {
    fn request_permission(&self) -> Result<Permission> {
        let mut control = self.control.borrow_mut();
        control.permission_requests += 1;
        Ok(control.permission.clone())
    }

    fn start_capture(&self) -> Result<Box<dyn CaptureSession>> {
        let mut control = self.control.borrow_mut();
        if control.fail_start {
            return Err(anyhow!("input device busy"));
        }
        control.captures_started += 1;
        let location = self
            .capture_dir
            .join(format!("capture-{}.wav", control.captures_started));
        Ok(Box::new(FakeCapture {
            control: Rc::clone(&self.control),
            location,
        }))
    }

    fn load(&self, location: &Path) -> Result<Box<dyn PlayableHandle>> {
        let mut control = self.control.borrow_mut();
        if control.fail_load {
            return Err(anyhow!("cannot decode {}", location.display()));
        }
        if !location.exists() {
            return Err(anyhow!("{} does not exist", location.display()));
        }
        control.loads += 1;
        let state = Rc::new(RefCell::new(FakeHandleState {
            duration_ms: control.load_duration_ms,
            ..FakeHandleState::default()
        }));
        control.handles.push(Rc::clone(&state));
        Ok(Box::new(FakeHandle {
            control: Rc::clone(&self.control),
            state,
        }))
    }
}

struct FakeCapture {
    control: Rc<RefCell<FakeControl>>,
    location: PathBuf,
}

impl CaptureSession for FakeCapture {
    fn elapsed_ms(&self) -> u64 {
        self.control.borrow().elapsed_ms
    }

    fn stop(self: Box<Self>) -> Result<CapturedClip> {
        let control = self.control.borrow();
        if control.fail_stop {
            return Err(anyhow!("encoder failed"));
        }
        let sample_count = (control.elapsed_ms * FAKE_SAMPLE_RATE as u64 / 1000) as usize;
        let samples: Vec<i16> = (0..sample_count).map(|i| (i % 64) as i16).collect();
        write_wav(&self.location, &samples, FAKE_SAMPLE_RATE)?;
        Ok(CapturedClip {
            location: self.location.clone(),
            duration_ms: control.elapsed_ms,
        })
    }
}

struct FakeHandle {
    control: Rc<RefCell<FakeControl>>,
    state: Rc<RefCell<FakeHandleState>>,
}

impl PlayableHandle for FakeHandle {
    fn play(&mut self) -> Result<()> {
        if self.control.borrow().fail_play {
            return Err(anyhow!("output device busy"));
        }
        let mut state = self.state.borrow_mut();
        state.play_calls += 1;
        if state.status.finished {
            state.status.position_ms = 0;
            state.status.finished = false;
        }
        state.status.is_playing = true;
        state.unloaded = false;
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.pause_calls += 1;
        state.status.is_playing = false;
        Ok(())
    }

    fn status(&self) -> PlaybackStatus {
        self.state.borrow().status
    }

    fn duration_ms(&self) -> u64 {
        self.state.borrow().duration_ms
    }

    fn unload(&mut self) -> Result<()> {
        self.control.borrow_mut().unloads += 1;
        let mut state = self.state.borrow_mut();
        state.status = PlaybackStatus::default();
        state.unloaded = true;
        Ok(())
    }
}
