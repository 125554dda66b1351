//! Terminal view of a live spectrogram session.
//!
//! The canvas is drawn with upper half-block cells, so each terminal cell shows
//! two vertically stacked pixels. An optional controls panel lists every
//! adjustable parameter, and a footer line shows the render state.

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    buffer::Buffer,
    prelude::*,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use std::io::{stdout, Stdout};
use std::time::Duration;

use crate::audio::AnalysisEngine;
use crate::config::{control, Direction, ParamKey};
use crate::spectrogram::{Canvas, Session, Viewport};

/// Columns reserved for the controls panel when it is visible.
const PANEL_WIDTH: u16 = 38;
/// Narrowest canvas that still leaves room for the panel.
const MIN_CANVAS_COLUMNS: u16 = 16;

const FOREGROUND: Color = Color::Rgb(185, 207, 212);
const DIMMED: Color = Color::Rgb(70, 78, 80);
const HIGHLIGHT: Color = Color::Rgb(206, 224, 220);

/// Action requested by the user for this poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewCommand {
    /// Nothing to do (no key, or a key handled inside the view)
    Continue,
    /// Stop rendering and exit (q, Escape, Ctrl+C)
    Quit,
    /// Clear the canvas and move the cursor to the left edge (s)
    Sync,
    /// Step the selected parameter (Left / Right)
    Adjust(ParamKey, Direction),
    /// The panel was shown or hidden, so the canvas area changed (o)
    TogglePanel,
    /// The terminal was resized
    Resize,
}

/// Selection and visibility of the controls panel.
#[derive(Debug, Clone, Default)]
pub struct PanelState {
    selected: usize,
    visible: bool,
}

impl PanelState {
    pub fn new(visible: bool) -> Self {
        Self {
            selected: 0,
            visible,
        }
    }

    pub fn selected(&self) -> ParamKey {
        ParamKey::ALL[self.selected]
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Maps a key press onto a command, updating the selection as needed.
    pub fn handle_key(&mut self, key: KeyEvent) -> ViewCommand {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                tracing::debug!("Escape or 'q' pressed: quitting");
                ViewCommand::Quit
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                tracing::debug!("Ctrl+C pressed: quitting");
                ViewCommand::Quit
            }
            KeyCode::Char('s') => ViewCommand::Sync,
            KeyCode::Char('o') => {
                self.visible = !self.visible;
                ViewCommand::TogglePanel
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.checked_sub(1).unwrap_or(ParamKey::ALL.len() - 1);
                ViewCommand::Continue
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.selected = (self.selected + 1) % ParamKey::ALL.len();
                ViewCommand::Continue
            }
            KeyCode::Left | KeyCode::Char('h') => {
                ViewCommand::Adjust(self.selected(), Direction::Decrement)
            }
            KeyCode::Right | KeyCode::Char('l') => {
                ViewCommand::Adjust(self.selected(), Direction::Increment)
            }
            _ => ViewCommand::Continue,
        }
    }
}

/// Screen regions for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Regions {
    pub canvas: Rect,
    pub panel: Option<Rect>,
    pub footer: Rect,
}

/// Splits the terminal into canvas, optional panel and a one-line footer.
pub fn layout(area: Rect, show_panel: bool) -> Regions {
    let content_height = area.height.saturating_sub(1);
    let footer = Rect::new(area.x, area.y + content_height, area.width, area.height.min(1));

    let panel_fits = area.width >= PANEL_WIDTH + MIN_CANVAS_COLUMNS;
    if show_panel && panel_fits {
        let canvas_width = area.width - PANEL_WIDTH;
        Regions {
            canvas: Rect::new(area.x, area.y, canvas_width, content_height),
            panel: Some(Rect::new(area.x + canvas_width, area.y, PANEL_WIDTH, content_height)),
            footer,
        }
    } else {
        Regions {
            canvas: Rect::new(area.x, area.y, area.width, content_height),
            panel: None,
            footer,
        }
    }
}

/// Viewport for a canvas region: one layout pixel per column, two per row.
pub fn viewport_for(region: Rect, pixel_ratio: f64) -> Viewport {
    Viewport {
        width: region.width as f64,
        height: region.height as f64 * 2.0,
        pixel_ratio,
    }
}

/// Half-block rendering of a canvas, centred in its region.
struct CanvasView<'a> {
    canvas: &'a Canvas,
    box_width: f64,
    box_height: f64,
    pixel_ratio: f64,
}

impl CanvasView<'_> {
    fn sample(&self, x: u16, y: u16) -> Color {
        let px = (x as f64 * self.pixel_ratio).floor() as usize;
        let py = (y as f64 * self.pixel_ratio).floor() as usize;
        let [r, g, b] = self.canvas.pixel(px, py).unwrap_or_default();
        Color::Rgb(r, g, b)
    }
}

impl Widget for CanvasView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let columns = (self.box_width as u16).min(area.width);
        let rows = ((self.box_height / 2.0).ceil() as u16).min(area.height);
        let left = area.x + (area.width - columns) / 2;
        let top = area.y + (area.height - rows) / 2;

        for row in 0..rows {
            for column in 0..columns {
                let upper = self.sample(column, row * 2);
                let lower = self.sample(column, row * 2 + 1);
                if let Some(cell) = buf.cell_mut((left + column, top + row)) {
                    cell.set_symbol("▀").set_fg(upper).set_bg(lower);
                }
            }
        }
    }
}

fn panel_lines<E: AnalysisEngine>(session: &Session<E>, panel: &PanelState) -> Vec<Line<'static>> {
    let arrow = |blocked: bool, symbol: &'static str| {
        let color = if blocked { DIMMED } else { FOREGROUND };
        Span::styled(symbol, Style::default().fg(color))
    };

    let mut lines: Vec<Line> = ParamKey::ALL
        .iter()
        .map(|&key| {
            let control = control(key);
            let value = session.current_value(key);
            let label_style = if key == panel.selected() {
                Style::default().fg(Color::Black).bg(HIGHLIGHT)
            } else {
                Style::default().fg(FOREGROUND)
            };
            Line::from(vec![
                Span::styled(format!("{:<24}", control.label), label_style),
                arrow(session.is_at_bound(key, Direction::Decrement), "◀"),
                Span::raw(format!("{:>7.*}", control.precision as usize, value)),
                arrow(session.is_at_bound(key, Direction::Increment), "▶"),
            ])
        })
        .collect();

    lines.push(Line::raw(""));
    lines.push(Line::styled(
        "↑↓ select  ←→ adjust",
        Style::default().fg(DIMMED),
    ));
    lines.push(Line::styled(
        "s sync  o panel  q quit",
        Style::default().fg(DIMMED),
    ));
    lines
}

fn footer_line<E: AnalysisEngine>(session: &Session<E>, fps: Option<f64>) -> Line<'static> {
    let mut spans = vec![
        Span::styled("● ", Style::default().fg(Color::Red)),
        Span::raw(format!(
            "{} / fft {} / x {:.1}",
            session.policy_kind(),
            session.current_value(ParamKey::FftSize),
            session.cursor()
        )),
    ];
    if let Some(fps) = fps {
        spans.push(Span::raw(format!(" / {fps:.1} fps")));
    }
    Line::from(spans)
}

/// Terminal UI for a spectrogram session.
pub struct SpectrogramTui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    panel: PanelState,
    pixel_ratio: f64,
    active: bool,
}

impl SpectrogramTui {
    /// Creates a new TUI instance and enters alternate screen mode.
    ///
    /// # Errors
    /// - If terminal cannot be initialized
    /// - If raw mode cannot be enabled
    /// - If alternate screen cannot be entered
    pub fn new(pixel_ratio: f64, show_panel: bool) -> anyhow::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = stdout();
        execute!(stdout, EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.hide_cursor()?;

        Ok(Self {
            terminal,
            panel: PanelState::new(show_panel),
            pixel_ratio,
            active: true,
        })
    }

    /// Viewport available to the canvas at the current terminal size.
    pub fn viewport(&self) -> anyhow::Result<Viewport> {
        let size = self.terminal.size()?;
        let area = Rect::new(0, 0, size.width, size.height);
        let regions = layout(area, self.panel.is_visible());
        Ok(viewport_for(regions.canvas, self.pixel_ratio))
    }

    /// Draws the canvas, the panel and the footer.
    ///
    /// # Errors
    /// - If terminal rendering fails
    pub fn draw<E: AnalysisEngine>(&mut self, session: &Session<E>, fps: Option<f64>) -> anyhow::Result<()> {
        let panel = &self.panel;
        let pixel_ratio = self.pixel_ratio;

        self.terminal.draw(|frame| {
            let regions = layout(frame.area(), panel.is_visible());
            let geometry = session.geometry();

            frame.render_widget(
                CanvasView {
                    canvas: session.canvas(),
                    box_width: geometry.box_width,
                    box_height: geometry.box_height,
                    pixel_ratio,
                },
                regions.canvas,
            );

            if let Some(area) = regions.panel {
                let block = Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(DIMMED))
                    .title(" Controls ");
                frame.render_widget(Paragraph::new(panel_lines(session, panel)).block(block), area);
            }

            let footer = Paragraph::new(footer_line(session, fps)).style(
                Style::default()
                    .fg(FOREGROUND)
                    .bg(Color::Rgb(0, 0, 0)),
            );
            frame.render_widget(footer, regions.footer);
        })?;

        Ok(())
    }

    /// Waits up to `timeout` for input and returns the resulting command.
    ///
    /// # Errors
    /// - If event polling fails
    pub fn handle_input(&mut self, timeout: Duration) -> anyhow::Result<ViewCommand> {
        if event::poll(timeout)? {
            return Ok(match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => self.panel.handle_key(key),
                Event::Resize(width, height) => {
                    tracing::trace!("Terminal resized to {}x{}", width, height);
                    ViewCommand::Resize
                }
                _ => ViewCommand::Continue,
            });
        }
        Ok(ViewCommand::Continue)
    }

    /// Cleans up terminal state and exits alternate screen mode.
    ///
    /// # Errors
    /// - If terminal mode cannot be disabled
    /// - If cursor cannot be shown
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

impl Drop for SpectrogramTui {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}
