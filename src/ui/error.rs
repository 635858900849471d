//! Full-screen error display used when voxclip cannot start a session.

use super::Tui;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::{
    prelude::*,
    widgets::{Paragraph, Wrap},
};
use std::time::Duration;

const ERROR_BG: Color = Color::Rgb(255, 0, 0);
const ERROR_FG: Color = Color::Rgb(255, 255, 255);

/// Red full-screen message with a title, dismissed by any key.
pub struct ErrorScreen<'a> {
    title: &'a str,
    message: &'a str,
}

impl<'a> ErrorScreen<'a> {
    pub fn new(title: &'a str, message: &'a str) -> Self {
        Self { title, message }
    }

    /// Opens a terminal, shows the error until a key is pressed, then restores the terminal.
    ///
    /// # Errors
    /// - If the terminal cannot be initialized or drawn to
    pub fn show(&self) -> anyhow::Result<()> {
        let mut tui = Tui::new()?;
        loop {
            tui.draw(|frame| frame.render_widget(self, frame.area()))?;

            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        break;
                    }
                }
            }
        }
        tui.cleanup()
    }
}

impl Widget for &ErrorScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let style = Style::default().fg(ERROR_FG).bg(ERROR_BG);
        buf.set_style(area, style);

        let mut lines = vec![
            Line::from(Span::styled(self.title, style.add_modifier(Modifier::BOLD))),
            Line::default(),
        ];
        lines.extend(self.message.lines().map(|line| Line::from(line.to_string())));
        lines.push(Line::default());
        lines.push(Line::from("Press any key to exit"));

        // Message wraps to 80% of the width, starting a third of the way down
        let text_area = Rect {
            x: area.x + area.width / 10,
            y: area.y + area.height / 3,
            width: area.width * 8 / 10,
            height: area.height - area.height / 3,
        };

        Paragraph::new(lines)
            .style(style)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(text_area, buf);
    }
}
