//! Rendering and key bindings for the recorder screen.

use super::RecorderScreen;
use crate::audio::AudioBackend;
use crate::ui::{
    format_duration, render_notice, render_notification, Notification, ACCENT, BG, DIM_FG, FG,
    HIGHLIGHT_BG, RECORDING,
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, HighlightSpacing, List, ListItem, ListState, Padding, Paragraph},
};

/// What a key press asks the recorder to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderAction {
    ToggleRecording,
    SelectPrevious,
    SelectNext,
    Play,
    Save,
    OpenSoundTest,
    Quit,
}

pub fn action_for(key: KeyEvent) -> Option<RecorderAction> {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(RecorderAction::Quit)
        }
        KeyCode::Char(' ') | KeyCode::Char('r') => Some(RecorderAction::ToggleRecording),
        KeyCode::Up | KeyCode::Char('k') => Some(RecorderAction::SelectPrevious),
        KeyCode::Down | KeyCode::Char('j') => Some(RecorderAction::SelectNext),
        KeyCode::Enter | KeyCode::Char('p') => Some(RecorderAction::Play),
        KeyCode::Char('s') => Some(RecorderAction::Save),
        KeyCode::Char('t') => Some(RecorderAction::OpenSoundTest),
        KeyCode::Char('q') | KeyCode::Esc => Some(RecorderAction::Quit),
        _ => None,
    }
}

/// View state of the recorder that is not part of the screen itself.
#[derive(Default)]
pub struct RecorderView {
    list_state: ListState,
}

impl RecorderView {
    pub fn select(&mut self, index: usize) {
        self.list_state.select(Some(index));
    }

    pub fn select_previous(&mut self) {
        self.list_state.select_previous();
    }

    pub fn select_next(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        let next = match self.list_state.selected() {
            Some(index) => (index + 1).min(len - 1),
            None => 0,
        };
        self.list_state.select(Some(next));
    }

    /// Selected row, if it points at an existing recording.
    pub fn selected(&self, len: usize) -> Option<usize> {
        self.list_state.selected().filter(|&index| index < len)
    }

    pub fn draw<B: AudioBackend>(
        &mut self,
        frame: &mut Frame,
        screen: &RecorderScreen<B>,
        notification: Option<&Notification>,
    ) {
        let area = frame.area();

        let padding_block = Block::default()
            .padding(Padding::uniform(1))
            .style(Style::default().fg(FG).bg(BG));
        frame.render_widget(&padding_block, area);
        let inner_area = padding_block.inner(area);

        let [header_area, button_area, status_area, list_area, footer_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(2),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .areas(inner_area);

        let header = Line::from(vec![
            Span::styled("voxclip", Style::default().fg(FG).add_modifier(Modifier::BOLD)),
            Span::styled(" recorder", Style::default().fg(DIM_FG)),
        ]);
        frame.render_widget(Paragraph::new(header), header_area);

        let recording = screen.capture().is_recording();
        let (label, button_style) = if recording {
            ("Stop Recording", Style::default().fg(RECORDING))
        } else {
            ("Start Recording", Style::default().fg(ACCENT))
        };
        let button = Paragraph::new(label)
            .alignment(Alignment::Center)
            .style(button_style)
            .block(Block::default().borders(Borders::ALL).border_style(button_style));
        frame.render_widget(button, button_area);

        let mut status = Vec::new();
        if let Some(duration) = screen.recording_duration_text() {
            status.push(Line::from(vec![
                Span::styled("● ", Style::default().fg(RECORDING)),
                Span::raw(format!("Recording Duration: {duration}")),
            ]));
        }
        if let Some(position) = screen.playback_position_text() {
            status.push(Line::from(vec![
                Span::styled("▶ ", Style::default().fg(ACCENT)),
                Span::raw(format!("Playback Duration: {position}")),
            ]));
        }
        frame.render_widget(Paragraph::new(status), status_area);

        let list_block = Block::default()
            .title(" Recordings ")
            .borders(Borders::ALL)
            .padding(Padding::horizontal(1));

        if screen.recordings().is_empty() {
            let empty = Paragraph::new("No recordings yet. Press space to start one.")
                .style(Style::default().fg(DIM_FG))
                .block(list_block);
            frame.render_widget(empty, list_area);
        } else {
            let now_playing = screen.now_playing();
            let items: Vec<ListItem> = screen
                .recordings()
                .iter()
                .enumerate()
                .map(|(index, entry)| {
                    let mut spans = vec![
                        Span::styled(format!("Recording {}", index + 1), Style::default().fg(FG)),
                        Span::raw("  "),
                        Span::styled(format_duration(entry.duration_ms()), Style::default().fg(ACCENT)),
                        Span::raw("  "),
                        Span::styled(
                            entry.recorded_at().format("%H:%M:%S").to_string(),
                            Style::default().fg(DIM_FG),
                        ),
                    ];
                    if let Some(playing) = now_playing.filter(|p| p.entry == index) {
                        spans.push(Span::styled(
                            format!("  {}", playing.state.label()),
                            Style::default().fg(ACCENT),
                        ));
                    }
                    ListItem::new(Line::from(spans))
                })
                .collect();

            let list = List::new(items)
                .block(list_block)
                .highlight_style(Style::default().bg(HIGHLIGHT_BG))
                .highlight_symbol("> ")
                .highlight_spacing(HighlightSpacing::Always);
            frame.render_stateful_widget(list, list_area, &mut self.list_state);
        }

        let help_text = "space record, ↑↓ select, ↵ play, s save, t sound test, esc/q quit";
        let help = Paragraph::new(help_text)
            .alignment(Alignment::Center)
            .style(Style::default().fg(DIM_FG));
        frame.render_widget(help, footer_area);

        if let Some(notice) = screen.notice() {
            render_notice(frame, area, notice);
        } else if let Some(notification) = notification {
            render_notification(frame, area, notification);
        }
    }
}
