//! Draw primitives: the contract element systems render through.
//!
//! Systems never touch the screen buffer. They enqueue boxes and text runs on
//! a [`Renderer`]; the [`Compositor`](super::Compositor) is the terminal
//! implementation, tests may supply their own.

use crate::geometry::{Offset, Region};

use super::style::CellStyle;

/// Characters used to draw a box border.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorderGlyphs {
    pub horizontal: char,
    pub vertical: char,
    pub top_left: char,
    pub top_right: char,
    pub bottom_left: char,
    pub bottom_right: char,
}

impl BorderGlyphs {
    /// Single-line box drawing characters.
    pub const LIGHT: BorderGlyphs = BorderGlyphs {
        horizontal: '─',
        vertical: '│',
        top_left: '┌',
        top_right: '┐',
        bottom_left: '└',
        bottom_right: '┘',
    };

    /// Plain ASCII fallback.
    pub const ASCII: BorderGlyphs = BorderGlyphs {
        horizontal: '-',
        vertical: '|',
        top_left: '+',
        top_right: '+',
        bottom_left: '+',
        bottom_right: '+',
    };
}

/// A filled and/or bordered rectangle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BoxPrimitive {
    /// Fill every cell of the box with a blank of this style.
    pub fill: Option<CellStyle>,
    /// Draw a one-cell border inside the box edges.
    pub border: Option<(BorderGlyphs, CellStyle)>,
}

/// Sink for draw primitives. Everything is clipped to `clip`.
pub trait Renderer {
    /// Enqueue a box covering `region`.
    fn queue_box(&mut self, region: Region, primitive: &BoxPrimitive, clip: Region);

    /// Enqueue a single line of text starting at `origin`.
    fn queue_text(&mut self, origin: Offset, text: &str, style: &CellStyle, clip: Region);
}
