//! Crossterm terminal backend.
//!
//! Creating a [`TerminalBackend`] takes over the terminal: raw mode, the
//! alternate screen, mouse capture and a hidden cursor. Dropping it gives the
//! terminal back. Color strings from [`CellStyle`] are parsed here and nowhere
//! else.

use std::io::{self, BufWriter, Stdout, Write};
use std::time::Duration;

use crossterm::{
    cursor,
    event::{self, DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen, SetTitle},
};
use tracing::{debug, error};

use crate::error::GuiError;
use crate::event::{from_crossterm, InputEvent};
use crate::geometry::Size;
use crate::render::{CellStyle, CellUpdate};

use super::backend::Backend;

/// The real terminal, driven through crossterm.
pub struct TerminalBackend {
    writer: BufWriter<Stdout>,
    active: bool,
}

impl TerminalBackend {
    /// Take over the terminal.
    pub fn new(title: Option<&str>) -> Result<Self, GuiError> {
        let mut backend = Self {
            writer: BufWriter::new(io::stdout()),
            active: false,
        };
        terminal::enable_raw_mode()?;
        backend.active = true;
        execute!(
            backend.writer,
            EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide
        )?;
        if let Some(title) = title {
            execute!(backend.writer, SetTitle(title))?;
        }
        debug!("terminal backend started");
        Ok(backend)
    }

    /// Give the terminal back. Called on drop; safe to call twice.
    pub fn restore(&mut self) -> Result<(), GuiError> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        execute!(
            self.writer,
            cursor::Show,
            DisableMouseCapture,
            LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    fn queue_style(&mut self, style: &CellStyle) -> io::Result<()> {
        if let Some(fg) = style.fg.as_deref().and_then(parse_color) {
            queue!(self.writer, SetForegroundColor(fg))?;
        }
        if let Some(bg) = style.bg.as_deref().and_then(parse_color) {
            queue!(self.writer, SetBackgroundColor(bg))?;
        }
        let attributes = [
            (style.bold, Attribute::Bold),
            (style.dim, Attribute::Dim),
            (style.italic, Attribute::Italic),
            (style.underline, Attribute::Underlined),
            (style.reverse, Attribute::Reverse),
        ];
        for (on, attribute) in attributes {
            if on {
                queue!(self.writer, SetAttribute(attribute))?;
            }
        }
        Ok(())
    }
}

impl Backend for TerminalBackend {
    fn poll_events(&mut self, timeout: Duration) -> Result<Vec<InputEvent>, GuiError> {
        let mut events = Vec::new();
        if !event::poll(timeout)? {
            return Ok(events);
        }
        loop {
            events.extend(from_crossterm(event::read()?));
            if !event::poll(Duration::ZERO)? {
                return Ok(events);
            }
        }
    }

    fn window_size(&self) -> Result<Size, GuiError> {
        let (width, height) = terminal::size()?;
        Ok(Size::new(i32::from(width), i32::from(height)))
    }

    fn present(&mut self, updates: &[CellUpdate]) -> Result<(), GuiError> {
        // The glyph to the left already covers continuation cells.
        for update in updates.iter().filter(|u| !u.cell.is_continuation()) {
            queue!(self.writer, cursor::MoveTo(update.x, update.y))?;
            self.queue_style(&update.cell.style)?;
            queue!(
                self.writer,
                Print(update.cell.ch),
                SetAttribute(Attribute::Reset),
                ResetColor
            )?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

impl Drop for TerminalBackend {
    fn drop(&mut self) {
        if let Err(err) = self.restore() {
            error!(%err, "failed to restore the terminal");
        }
    }
}

// ---------------------------------------------------------------------------
// Color parsing
// ---------------------------------------------------------------------------

/// Parse `#rrggbb`, `#rgb` or a crossterm color name (case-insensitive,
/// `dark_` prefix optional underscore, `grey`/`gray` both accepted).
pub fn parse_color(s: &str) -> Option<Color> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex);
    }
    let name = s.to_ascii_lowercase().replace('_', "").replace("gray", "grey");
    Some(match name.as_str() {
        "black" => Color::Black,
        "red" => Color::Red,
        "green" => Color::Green,
        "yellow" => Color::Yellow,
        "blue" => Color::Blue,
        "magenta" => Color::Magenta,
        "cyan" => Color::Cyan,
        "white" => Color::White,
        "grey" => Color::Grey,
        "darkred" => Color::DarkRed,
        "darkgreen" => Color::DarkGreen,
        "darkyellow" => Color::DarkYellow,
        "darkblue" => Color::DarkBlue,
        "darkmagenta" => Color::DarkMagenta,
        "darkcyan" => Color::DarkCyan,
        "darkgrey" => Color::DarkGrey,
        _ => return None,
    })
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.is_ascii() {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    let (r, g, b) = match hex.len() {
        6 => (channel(0..2)?, channel(2..4)?, channel(4..6)?),
        // #abc is #aabbcc
        3 => {
            let (r, g, b) = (channel(0..1)?, channel(1..2)?, channel(2..3)?);
            (r * 17, g * 17, b * 17)
        }
        _ => return None,
    };
    Some(Color::Rgb { r, g, b })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colors() {
        assert_eq!(parse_color("#FF8000"), Some(Color::Rgb { r: 255, g: 128, b: 0 }));
        assert_eq!(parse_color("#f0a"), Some(Color::Rgb { r: 255, g: 0, b: 170 }));
        assert_eq!(parse_color("#12345"), None);
        assert_eq!(parse_color("#gggggg"), None);
        assert_eq!(parse_color("#ééé"), None);
    }

    #[test]
    fn named_colors() {
        assert_eq!(parse_color("red"), Some(Color::Red));
        assert_eq!(parse_color(" Blue "), Some(Color::Blue));
        assert_eq!(parse_color("dark_grey"), Some(Color::DarkGrey));
        assert_eq!(parse_color("DarkGray"), Some(Color::DarkGrey));
        assert_eq!(parse_color("gray"), Some(Color::Grey));
        assert_eq!(parse_color("chartreuse"), None);
    }
}
