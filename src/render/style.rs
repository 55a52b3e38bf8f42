//! Cell styles and the widget theme.
//!
//! Colors are stored as strings (named colors or `#rrggbb`) and only parsed
//! by the terminal backend, so nothing above the platform layer depends on
//! crossterm.

// ---------------------------------------------------------------------------
// CellStyle
// ---------------------------------------------------------------------------

/// Visual style for a single terminal cell.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CellStyle {
    pub fg: Option<String>,
    pub bg: Option<String>,
    pub bold: bool,
    pub dim: bool,
    pub italic: bool,
    pub underline: bool,
    pub reverse: bool,
}

impl CellStyle {
    /// A style with every attribute unset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the foreground color (builder).
    pub fn fg(mut self, color: impl Into<String>) -> Self {
        self.fg = Some(color.into());
        self
    }

    /// Set the background color (builder).
    pub fn bg(mut self, color: impl Into<String>) -> Self {
        self.bg = Some(color.into());
        self
    }

    /// Enable bold (builder).
    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// Enable dim (builder).
    pub fn dim(mut self) -> Self {
        self.dim = true;
        self
    }

    /// Enable underline (builder).
    pub fn underline(mut self) -> Self {
        self.underline = true;
        self
    }

    /// Enable reverse video (builder).
    pub fn reverse(mut self) -> Self {
        self.reverse = true;
        self
    }

    /// Overlay `other` on top of `self`: colors set in `other` win, flags are OR-ed.
    pub fn patch(&self, other: &CellStyle) -> CellStyle {
        CellStyle {
            fg: other.fg.clone().or_else(|| self.fg.clone()),
            bg: other.bg.clone().or_else(|| self.bg.clone()),
            bold: self.bold || other.bold,
            dim: self.dim || other.dim,
            italic: self.italic || other.italic,
            underline: self.underline || other.underline,
            reverse: self.reverse || other.reverse,
        }
    }
}

// ---------------------------------------------------------------------------
// StyledCell
// ---------------------------------------------------------------------------

/// One character with its style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledCell {
    pub ch: char,
    pub style: CellStyle,
}

impl StyledCell {
    /// Create a new styled cell.
    pub fn new(ch: char, style: CellStyle) -> Self {
        Self { ch, style }
    }

    /// A blank cell with the default style.
    pub fn blank() -> Self {
        Self {
            ch: ' ',
            style: CellStyle::default(),
        }
    }

    /// The cell to the right of a two-cell glyph. The glyph covers it, so
    /// it is neither printed nor read back as text.
    pub fn continuation(style: CellStyle) -> Self {
        Self { ch: '\0', style }
    }

    pub fn is_continuation(&self) -> bool {
        self.ch == '\0'
    }
}

impl Default for StyledCell {
    fn default() -> Self {
        Self::blank()
    }
}

// ---------------------------------------------------------------------------
// Theme
// ---------------------------------------------------------------------------

/// Styles used by the built-in element systems.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    /// Plain text.
    pub text: CellStyle,
    /// Buttons, checkboxes and dropdown headers at rest.
    pub control: CellStyle,
    /// Any control under the mouse.
    pub hovered: CellStyle,
    /// The control holding keyboard focus.
    pub focused: CellStyle,
    /// Text input fields.
    pub input: CellStyle,
    /// Placeholder or otherwise de-emphasised text.
    pub muted: CellStyle,
    /// Invalid input (text that does not parse).
    pub invalid: CellStyle,
    /// Highlighted row of an open dropdown.
    pub selection: CellStyle,
    /// Borders of series and floating windows.
    pub border: CellStyle,
    /// Background of floating windows and dropdown lists.
    pub overlay: CellStyle,
    /// Scrollbar thumb.
    pub scrollbar: CellStyle,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            text: CellStyle::new(),
            control: CellStyle::new().bold(),
            hovered: CellStyle::new().underline(),
            focused: CellStyle::new().reverse(),
            input: CellStyle::new().underline(),
            muted: CellStyle::new().dim(),
            invalid: CellStyle::new().fg("red"),
            selection: CellStyle::new().reverse(),
            border: CellStyle::new().fg("grey"),
            overlay: CellStyle::new().bg("dark_grey"),
            scrollbar: CellStyle::new().fg("grey"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_attributes() {
        let s = CellStyle::new().fg("red").bg("#000000").bold().reverse();
        assert_eq!(s.fg.as_deref(), Some("red"));
        assert_eq!(s.bg.as_deref(), Some("#000000"));
        assert!(s.bold && s.reverse);
        assert!(!s.dim);
    }

    #[test]
    fn patch_prefers_overlay_colors_and_merges_flags() {
        let base = CellStyle::new().fg("white").bg("blue").bold();
        let top = CellStyle::new().fg("red").underline();
        let merged = base.patch(&top);
        assert_eq!(merged.fg.as_deref(), Some("red"));
        assert_eq!(merged.bg.as_deref(), Some("blue"));
        assert!(merged.bold && merged.underline);
    }

    #[test]
    fn blank_cell_is_space() {
        assert_eq!(StyledCell::default().ch, ' ');
    }
}
