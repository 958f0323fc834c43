//! The surface the field is drawn on and the notifications it delivers.

use crate::color::Color;
use crate::graphics::Framebuffer;
use anyhow::{Context, Result};
use crossterm::{
    cursor,
    event::{
        self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture,
        Event, KeyCode, KeyEventKind, KeyModifiers, MouseEventKind,
    },
    execute, queue,
    style::{Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, BeginSynchronizedUpdate, ClearType, EndSynchronizedUpdate, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::io::{stdout, IsTerminal, Stdout, Write};
use std::time::Duration;

/// Each terminal cell shows two pixels stacked vertically
pub const PIXELS_PER_ROW: usize = 2;

/// Kinds of notification the simulator can ask the host for
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Subscription {
    PointerMove,
    Resize,
    Visibility,
}

/// User commands, always delivered
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Quit,
    TogglePause,
    ToggleDebug,
    Reset,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostEvent {
    /// Pointer over the given cell of the surface
    PointerMove { column: u16, row: u16 },
    /// New surface size in cells
    Resize { columns: u16, rows: u16 },
    /// Whether the surface is currently shown
    Visibility(bool),
    Command(Command),
}

/// Text drawn over the frame at a cell position
#[derive(Clone, Debug, PartialEq)]
pub struct Label {
    pub column: u16,
    pub row: u16,
    pub text: String,
}

/// The environment the simulator runs in
pub trait Host {
    /// Surface size in cells (columns, rows)
    fn size(&self) -> (u16, u16);

    fn subscribe(&mut self, subscription: Subscription) -> Result<()>;

    fn unsubscribe(&mut self, subscription: Subscription) -> Result<()>;

    /// Waits up to `timeout` for notifications and returns every one pending
    fn poll(&mut self, timeout: Duration) -> Result<Vec<HostEvent>>;

    /// Shows a finished frame with labels on top
    fn present(&mut self, frame: &Framebuffer, labels: &[Label]) -> Result<()>;
}

/// Maps a surface size in cells to a framebuffer size in pixels
pub fn pixel_size(columns: u16, rows: u16) -> (usize, usize) {
    (usize::from(columns), usize::from(rows) * PIXELS_PER_ROW)
}

/// Terminal surface in raw mode on the alternate screen
pub struct TerminalHost {
    out: Stdout,
    columns: u16,
    rows: u16,
    subscriptions: Vec<Subscription>,
    /// Colors last written to each cell; `None` forces a redraw
    shown: Vec<Option<(Color, Color)>>,
}

impl TerminalHost {
    /// Probes for a usable terminal.
    ///
    /// Returns `None` when stdout is not a terminal or its size is unknown.
    pub fn probe() -> Option<(u16, u16)> {
        if !stdout().is_terminal() {
            return None;
        }
        let size = termsize::get()?;
        if size.cols == 0 || size.rows == 0 {
            return None;
        }
        Some((size.cols, size.rows))
    }

    /// Takes over the terminal. Restored when the host is dropped.
    pub fn begin(columns: u16, rows: u16) -> Result<Self> {
        let mut out = stdout();
        terminal::enable_raw_mode().context("could not enable raw mode")?;
        execute!(out, EnterAlternateScreen, terminal::Clear(ClearType::All), cursor::Hide)
            .context("could not enter the alternate screen")?;
        Ok(TerminalHost {
            out,
            columns,
            rows,
            subscriptions: Vec::new(),
            shown: vec![None; usize::from(columns) * usize::from(rows)],
        })
    }

    fn is_subscribed(&self, subscription: Subscription) -> bool {
        self.subscriptions.contains(&subscription)
    }

    fn translate(&mut self, event: Event) -> Option<HostEvent> {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                let command = match (key.code, key.modifiers) {
                    (KeyCode::Char('c'), KeyModifiers::CONTROL) => Command::Quit,
                    (KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc, _) => Command::Quit,
                    (KeyCode::Char('p') | KeyCode::Char('P') | KeyCode::Char(' '), _) => {
                        Command::TogglePause
                    }
                    (KeyCode::Char('d') | KeyCode::Char('D'), _) => Command::ToggleDebug,
                    (KeyCode::Char('r') | KeyCode::Char('R'), _) => Command::Reset,
                    _ => return None,
                };
                Some(HostEvent::Command(command))
            }
            Event::Mouse(mouse) if self.is_subscribed(Subscription::PointerMove) => match mouse.kind {
                MouseEventKind::Moved | MouseEventKind::Drag(_) | MouseEventKind::Down(_) => {
                    Some(HostEvent::PointerMove {
                        column: mouse.column,
                        row: mouse.row,
                    })
                }
                _ => None,
            },
            Event::Resize(columns, rows) if self.is_subscribed(Subscription::Resize) => {
                self.columns = columns;
                self.rows = rows;
                self.shown = vec![None; usize::from(columns) * usize::from(rows)];
                Some(HostEvent::Resize { columns, rows })
            }
            Event::FocusGained if self.is_subscribed(Subscription::Visibility) => {
                Some(HostEvent::Visibility(true))
            }
            Event::FocusLost if self.is_subscribed(Subscription::Visibility) => {
                Some(HostEvent::Visibility(false))
            }
            _ => None,
        }
    }
}

impl Host for TerminalHost {
    fn size(&self) -> (u16, u16) {
        (self.columns, self.rows)
    }

    fn subscribe(&mut self, subscription: Subscription) -> Result<()> {
        if self.is_subscribed(subscription) {
            return Ok(());
        }
        match subscription {
            Subscription::PointerMove => execute!(self.out, EnableMouseCapture)?,
            Subscription::Visibility => execute!(self.out, EnableFocusChange)?,
            Subscription::Resize => {}
        }
        self.subscriptions.push(subscription);
        Ok(())
    }

    fn unsubscribe(&mut self, subscription: Subscription) -> Result<()> {
        if !self.is_subscribed(subscription) {
            return Ok(());
        }
        match subscription {
            Subscription::PointerMove => execute!(self.out, DisableMouseCapture)?,
            Subscription::Visibility => execute!(self.out, DisableFocusChange)?,
            Subscription::Resize => {}
        }
        self.subscriptions.retain(|s| *s != subscription);
        Ok(())
    }

    fn poll(&mut self, timeout: Duration) -> Result<Vec<HostEvent>> {
        let mut events = Vec::new();
        let mut wait = timeout;
        while event::poll(wait)? {
            if let Some(event) = self.translate(event::read()?) {
                events.push(event);
            }
            wait = Duration::ZERO;
        }
        Ok(events)
    }

    fn present(&mut self, frame: &Framebuffer, labels: &[Label]) -> Result<()> {
        let columns = usize::from(self.columns).min(frame.width());
        let rows = usize::from(self.rows).min(frame.height() / PIXELS_PER_ROW);

        queue!(self.out, BeginSynchronizedUpdate)?;
        for row in 0..rows {
            let mut cursor_at: Option<usize> = None;
            let mut colors: Option<(Color, Color)> = None;
            for column in 0..columns {
                let top = frame.pixel(column, row * PIXELS_PER_ROW);
                let bottom = frame.pixel(column, row * PIXELS_PER_ROW + 1);
                let cell = (top, bottom);
                let index = row * usize::from(self.columns) + column;
                let same = self.shown[index]
                    .map(|(t, b)| t.to_rgb8() == top.to_rgb8() && b.to_rgb8() == bottom.to_rgb8())
                    .unwrap_or(false);
                if same {
                    continue;
                }

                if cursor_at != Some(column) {
                    queue!(self.out, cursor::MoveTo(column as u16, row as u16))?;
                }
                if colors != Some(cell) {
                    queue!(
                        self.out,
                        SetForegroundColor(top.into()),
                        SetBackgroundColor(bottom.into())
                    )?;
                    colors = Some(cell);
                }
                queue!(self.out, Print('▀'))?;
                cursor_at = Some(column + 1);
                self.shown[index] = Some(cell);
            }
        }

        queue!(self.out, ResetColor)?;
        for label in labels {
            if label.row >= self.rows || label.column >= self.columns {
                continue;
            }
            let room = usize::from(self.columns - label.column);
            let text: String = label.text.chars().take(room).collect();
            queue!(
                self.out,
                cursor::MoveTo(label.column, label.row),
                SetForegroundColor(Color::WHITE.into()),
                SetBackgroundColor(Color::BLACK.into()),
                Print(&text),
                ResetColor
            )?;
            // Labels overwrite cells; redraw them next frame.
            let start = usize::from(label.row) * usize::from(self.columns) + usize::from(label.column);
            let end = start + text.chars().count();
            for shown in &mut self.shown[start..end] {
                *shown = None;
            }
        }
        queue!(self.out, EndSynchronizedUpdate)?;
        self.out.flush()?;
        Ok(())
    }
}

impl Drop for TerminalHost {
    fn drop(&mut self) {
        for subscription in self.subscriptions.clone() {
            let _ = self.unsubscribe(subscription);
        }
        let _ = execute!(self.out, ResetColor, cursor::Show, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

/// Host with no terminal behind it, fed from a script of events
#[cfg(test)]
pub struct HeadlessHost {
    pub columns: u16,
    pub rows: u16,
    pub subscriptions: Vec<Subscription>,
    /// Events returned by successive polls; an exhausted script quits
    pub script: std::collections::VecDeque<Vec<HostEvent>>,
    pub presented: usize,
    /// Timeout passed to each poll, in call order
    pub timeouts: Vec<Duration>,
    pub last_labels: Vec<Label>,
    pub last_frame_size: (usize, usize),
}

#[cfg(test)]
impl HeadlessHost {
    pub fn new(columns: u16, rows: u16) -> Self {
        HeadlessHost {
            columns,
            rows,
            subscriptions: Vec::new(),
            script: std::collections::VecDeque::new(),
            presented: 0,
            timeouts: Vec::new(),
            last_labels: Vec::new(),
            last_frame_size: (0, 0),
        }
    }

    pub fn then(mut self, events: Vec<HostEvent>) -> Self {
        self.script.push_back(events);
        self
    }
}

#[cfg(test)]
impl Host for HeadlessHost {
    fn size(&self) -> (u16, u16) {
        (self.columns, self.rows)
    }

    fn subscribe(&mut self, subscription: Subscription) -> Result<()> {
        if !self.subscriptions.contains(&subscription) {
            self.subscriptions.push(subscription);
        }
        Ok(())
    }

    fn unsubscribe(&mut self, subscription: Subscription) -> Result<()> {
        self.subscriptions.retain(|s| *s != subscription);
        Ok(())
    }

    fn poll(&mut self, timeout: Duration) -> Result<Vec<HostEvent>> {
        self.timeouts.push(timeout);
        let events = self
            .script
            .pop_front()
            .unwrap_or_else(|| vec![HostEvent::Command(Command::Quit)]);
        for event in &events {
            if let HostEvent::Resize { columns, rows } = *event {
                self.columns = columns;
                self.rows = rows;
            }
        }
        Ok(events)
    }

    fn present(&mut self, frame: &Framebuffer, labels: &[Label]) -> Result<()> {
        self.presented += 1;
        self.last_labels = labels.to_vec();
        self.last_frame_size = (frame.width(), frame.height());
        Ok(())
    }
}
