//! Rendering and key bindings for the sound test screen.

use super::SoundTestScreen;
use crate::audio::AudioBackend;
use crate::ui::{
    format_duration, render_notice, render_notification, Notification, ACCENT, BG, DIM_FG, FG,
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Padding, Paragraph},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundTestAction {
    Load,
    Play,
    Pause,
    Resume,
    /// Leave the screen and return to the recorder
    Back,
    Quit,
}

pub fn action_for(key: KeyEvent) -> Option<SoundTestAction> {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(SoundTestAction::Quit)
        }
        KeyCode::Char('l') => Some(SoundTestAction::Load),
        KeyCode::Char('p') | KeyCode::Enter => Some(SoundTestAction::Play),
        KeyCode::Char(' ') => Some(SoundTestAction::Pause),
        KeyCode::Char('r') => Some(SoundTestAction::Resume),
        KeyCode::Esc | KeyCode::Char('b') => Some(SoundTestAction::Back),
        KeyCode::Char('q') => Some(SoundTestAction::Quit),
        _ => None,
    }
}

pub fn draw<B: AudioBackend>(
    frame: &mut Frame,
    screen: &SoundTestScreen<B>,
    notification: Option<&Notification>,
) {
    let area = frame.area();

    let padding_block = Block::default()
        .padding(Padding::uniform(1))
        .style(Style::default().fg(FG).bg(BG));
    frame.render_widget(&padding_block, area);
    let inner_area = padding_block.inner(area);

    let [header_area, asset_area, status_area, controls_area, _, footer_area] =
        Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(2),
            Constraint::Length(4),
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .areas(inner_area);

    let header = Line::from(vec![
        Span::styled("voxclip", Style::default().fg(FG).add_modifier(Modifier::BOLD)),
        Span::styled(" sound test", Style::default().fg(DIM_FG)),
    ]);
    frame.render_widget(Paragraph::new(header), header_area);

    let asset = Line::from(vec![
        Span::styled("Sound: ", Style::default().fg(DIM_FG)),
        Span::raw(screen.asset().display().to_string()),
    ]);
    frame.render_widget(Paragraph::new(asset), asset_area);

    let status_lines = match (screen.state(), screen.duration_ms()) {
        (Some(state), Some(duration_ms)) => {
            let position = state.position_ms().unwrap_or(0);
            vec![
                Line::from(format!("State: {}", state.label())),
                Line::from(format!(
                    "Position: {} / {}",
                    format_duration(position),
                    format_duration(duration_ms)
                )),
            ]
        }
        _ => vec![Line::styled(
            "Sound not loaded yet. Press l to load it.",
            Style::default().fg(DIM_FG),
        )],
    };
    let status = Paragraph::new(status_lines).block(
        Block::default()
            .title(" Status ")
            .borders(Borders::ALL)
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(status, status_area);

    let buttons: [(&str, bool); 4] = [
        ("Load Sound", true),
        ("Play Sound", screen.is_loaded() && !screen.is_playing()),
        ("Pause Sound", screen.is_playing()),
        ("Resume Sound", screen.is_loaded() && !screen.is_playing()),
    ];
    let button_areas = Layout::horizontal([Constraint::Ratio(1, 4); 4]).split(controls_area);
    for ((label, enabled), button_area) in buttons.into_iter().zip(button_areas.iter()) {
        let style = if enabled {
            Style::default().fg(ACCENT)
        } else {
            Style::default().fg(DIM_FG)
        };
        let button = Paragraph::new(label)
            .alignment(Alignment::Center)
            .style(style)
            .block(Block::default().borders(Borders::ALL).border_style(style));
        frame.render_widget(button, *button_area);
    }

    let help = Paragraph::new("l load, p play, space pause, r resume, esc back, q quit")
        .alignment(Alignment::Center)
        .style(Style::default().fg(DIM_FG));
    frame.render_widget(help, footer_area);

    if let Some(notice) = screen.notice() {
        render_notice(frame, area, notice);
    } else if let Some(notification) = notification {
        render_notification(frame, area, notification);
    }
}
