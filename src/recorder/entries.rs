//! Recordings made during the current session.

use crate::audio::PlayableHandle;
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

/// A finished recording. Its duration and location never change after creation.
pub struct RecordingEntry {
    handle: Box<dyn PlayableHandle>,
    duration_ms: u64,
    source: PathBuf,
    recorded_at: DateTime<Local>,
}

impl RecordingEntry {
    pub fn new(handle: Box<dyn PlayableHandle>, duration_ms: u64, source: PathBuf) -> Self {
        Self {
            handle,
            duration_ms,
            source,
            recorded_at: Local::now(),
        }
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    /// Temporary file the capture was written to.
    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn recorded_at(&self) -> DateTime<Local> {
        self.recorded_at
    }

    pub(crate) fn handle(&self) -> &dyn PlayableHandle {
        self.handle.as_ref()
    }

    pub(crate) fn handle_mut(&mut self) -> &mut dyn PlayableHandle {
        self.handle.as_mut()
    }
}

/// Append-only list of recordings in the order they were made.
#[derive(Default)]
pub struct RecordingList {
    entries: Vec<RecordingEntry>,
}

impl RecordingList {
    /// Appends an entry and returns its index.
    pub fn push(&mut self, entry: RecordingEntry) -> usize {
        self.entries.push(entry);
        self.entries.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&RecordingEntry> {
        self.entries.get(index)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut RecordingEntry> {
        self.entries.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RecordingEntry> {
        self.entries.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut RecordingEntry> {
        self.entries.iter_mut()
    }
}
