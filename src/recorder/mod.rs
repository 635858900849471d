//! Recorder screen: capture clips from the microphone, list them, play them
//! back and save them to disk.

pub mod entries;
pub mod screen;
pub mod ui;

pub use screen::RecorderScreen;
pub use ui::{action_for, RecorderAction, RecorderView};
