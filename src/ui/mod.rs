//! Shared terminal UI pieces: terminal lifecycle, notifications, and formatting
//! helpers used by both screens.

pub mod error;
pub mod terminal;

pub use error::ErrorScreen;
pub use terminal::Tui;

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};
use std::time::{Duration, Instant};

pub const BG: Color = Color::Rgb(0, 0, 0);
pub const FG: Color = Color::Rgb(255, 255, 255);
pub const DIM_FG: Color = Color::Rgb(100, 100, 100);
pub const HIGHLIGHT_BG: Color = Color::Rgb(20, 20, 20);
pub const ACCENT: Color = Color::Rgb(185, 207, 212);
pub const RECORDING: Color = Color::Rgb(220, 40, 40);

/// Message shown when microphone access is refused.
pub const PERMISSION_NOTICE: &str = "Permission to access audio is required!";

/// How long a transient notification stays on screen.
const NOTIFICATION_TTL: Duration = Duration::from_millis(1500);

/// Screens the navigator can show, addressed by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Recorder,
    SoundTest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Info,
    Error,
}

/// A short-lived message rendered as a modal over the current screen.
#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub kind: NotificationKind,
    shown_at: Instant,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: NotificationKind::Info,
            shown_at: Instant::now(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: NotificationKind::Error,
            shown_at: Instant::now(),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.shown_at.elapsed() >= NOTIFICATION_TTL
    }
}

/// Formats milliseconds as `m:ss`, rounding to the nearest second.
pub fn format_duration(ms: u64) -> String {
    let total_secs = (ms + 500) / 1000;
    format!("{}:{:02}", total_secs / 60, total_secs % 60)
}

/// Renders a centered notification modal.
pub fn render_notification(frame: &mut Frame, screen_area: Rect, notification: &Notification) {
    let bg = match notification.kind {
        NotificationKind::Info => Color::Green,
        NotificationKind::Error => Color::Red,
    };
    render_modal(frame, screen_area, &notification.message, bg);
}

/// Renders a notice that stays up until a key is pressed.
pub fn render_notice(frame: &mut Frame, screen_area: Rect, message: &str) {
    let text = format!("{message} (press any key)");
    render_modal(frame, screen_area, &text, Color::Yellow);
}

fn render_modal(frame: &mut Frame, screen_area: Rect, message: &str, bg: Color) {
    let modal_width = (message.chars().count() as u16).saturating_add(4);
    let modal_height = 3;

    let modal_area = Rect {
        x: screen_area.x + (screen_area.width.saturating_sub(modal_width)) / 2,
        y: screen_area.y + (screen_area.height.saturating_sub(modal_height)) / 2,
        width: modal_width.min(screen_area.width),
        height: modal_height.min(screen_area.height),
    };

    let style = Style::default().bg(bg).fg(Color::Black);
    let modal_block = Block::default().borders(Borders::ALL).style(style);
    frame.render_widget(&modal_block, modal_area);

    let inner_area = modal_block.inner(modal_area);
    let text = Paragraph::new(message)
        .style(style)
        .alignment(Alignment::Center);
    frame.render_widget(text, inner_area);
}

/// Flattens a rendered buffer into one string per row.
#[cfg(test)]
pub fn buffer_lines(buffer: &ratatui::buffer::Buffer) -> Vec<String> {
    let area = buffer.area;
    (area.y..area.y + area.height)
        .map(|y| {
            (area.x..area.x + area.width)
                .map(|x| buffer[(x, y)].symbol().to_string())
                .collect::<String>()
        })
        .collect()
}
