//! Sound test screen: load the bundled sound and play, pause or resume it.

pub mod screen;
pub mod ui;

pub use screen::SoundTestScreen;
pub use ui::{action_for, draw, SoundTestAction};
