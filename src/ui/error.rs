//! Full-screen error report.
//!
//! Used when the session cannot start: a broken configuration or a microphone
//! that could not be opened. The screen stays up until a key is pressed.

use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    text::{Line, Span},
    widgets::{Block, Paragraph, Wrap},
};
use std::io::{self, Stdout};
use std::time::Duration;

const BACKGROUND: Color = Color::Rgb(120, 0, 0);
const TEXT: Color = Color::Rgb(255, 255, 255);

/// Lines shown for an error: a bold title, the message and a dismissal hint.
fn error_lines<'a>(title: &'a str, message: &'a str) -> Vec<Line<'a>> {
    let mut lines = vec![
        Line::from(Span::styled(title, Style::default().fg(TEXT).bold())),
        Line::raw(""),
    ];
    lines.extend(message.lines().map(|line| Line::from(Span::styled(line, Style::default().fg(TEXT)))));
    lines.push(Line::raw(""));
    lines.push(Line::from(Span::styled(
        "Press any key to exit",
        Style::default().fg(Color::Rgb(220, 160, 160)),
    )));
    lines
}

/// Red full-screen panel with centred text.
pub struct ErrorScreen {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    active: bool,
}

impl ErrorScreen {
    /// Creates a new error screen and enters alternate screen mode.
    ///
    /// # Errors
    /// - If terminal cannot be initialized
    pub fn new() -> anyhow::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            terminal,
            active: true,
        })
    }

    /// Shows `title` and `message` until any key is pressed.
    ///
    /// # Errors
    /// - If terminal rendering or event polling fails
    pub fn show(&mut self, title: &str, message: &str) -> anyhow::Result<()> {
        loop {
            self.terminal.draw(|frame| {
                let area = frame.area();
                frame.render_widget(Block::default().style(Style::default().bg(BACKGROUND)), area);

                let lines = error_lines(title, message);
                let height = (lines.len() as u16).min(area.height);
                let width = area.width * 4 / 5;
                let centered = Rect::new(
                    area.x + (area.width - width) / 2,
                    area.y + (area.height - height) / 2,
                    width,
                    area.height - (area.height - height) / 2,
                );

                let paragraph = Paragraph::new(lines)
                    .alignment(Alignment::Center)
                    .style(Style::default().bg(BACKGROUND))
                    .wrap(Wrap { trim: true });
                frame.render_widget(paragraph, centered);
            })?;

            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(_) = event::read()? {
                    break;
                }
            }
        }

        Ok(())
    }

    /// Cleans up terminal state and exits alternate screen mode.
    ///
    /// # Errors
    /// - If terminal mode cannot be disabled
    pub fn cleanup(&mut self) -> anyhow::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for ErrorScreen {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

/// Shows a blocking error screen and restores the terminal afterwards.
///
/// # Errors
/// - If the terminal cannot be driven
pub fn report(title: &str, message: &str) -> anyhow::Result<()> {
    let mut screen = ErrorScreen::new()?;
    screen.show(title, message)?;
    screen.cleanup()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_lines_layout() {
        let lines = error_lines("Microphone Error", "Permission denied\nCheck your settings");
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0].to_string(), "Microphone Error");
        assert_eq!(lines[2].to_string(), "Permission denied");
        assert_eq!(lines[3].to_string(), "Check your settings");
        assert_eq!(lines[5].to_string(), "Press any key to exit");
    }
}
