//! Double-buffered cell grid with frame diffing.
//!
//! The `Compositor` is the terminal-side [`Renderer`]. A render pass clears the
//! back buffer, systems draw into it, and [`Compositor::present`] compares it
//! against the front buffer and returns only the [`CellUpdate`]s needed to
//! bring the terminal up to date.

use crate::geometry::{Offset, Region, Size};
use crate::text::glyphs;

use super::primitive::{BoxPrimitive, Renderer};
use super::style::{CellStyle, StyledCell};

// ---------------------------------------------------------------------------
// CellUpdate
// ---------------------------------------------------------------------------

/// A single cell that changed between frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellUpdate {
    pub x: u16,
    pub y: u16,
    pub cell: StyledCell,
}

// ---------------------------------------------------------------------------
// Compositor
// ---------------------------------------------------------------------------

/// Screen buffer pair: `back` is drawn into, `front` mirrors the terminal.
#[derive(Debug, Clone)]
pub struct Compositor {
    back: Vec<Vec<StyledCell>>,
    front: Vec<Vec<StyledCell>>,
    width: u16,
    height: u16,
    /// When set, the next `present` sends every cell.
    full_redraw: bool,
}

impl Compositor {
    /// Create a compositor with blank buffers of the given dimensions.
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            back: blank_screen(width, height),
            front: blank_screen(width, height),
            width,
            height,
            full_redraw: true,
        }
    }

    /// Screen width in cells.
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Screen height in cells.
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Screen dimensions.
    pub fn size(&self) -> Size {
        Size::new(i32::from(self.width), i32::from(self.height))
    }

    /// The whole screen as a region.
    pub fn bounds(&self) -> Region {
        self.size().to_region()
    }

    /// Resize both buffers. Everything is redrawn on the next `present`.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.back = blank_screen(width, height);
        self.front = blank_screen(width, height);
        self.full_redraw = true;
    }

    /// Reset the back buffer to blanks before a render pass.
    pub fn clear(&mut self) {
        for row in &mut self.back {
            row.fill(StyledCell::blank());
        }
    }

    /// Cell at (x, y) of the back buffer.
    pub fn get_cell(&self, x: u16, y: u16) -> Option<&StyledCell> {
        self.back.get(y as usize).and_then(|row| row.get(x as usize))
    }

    /// One row of the back buffer as text, trailing spaces trimmed.
    pub fn row_text(&self, y: u16) -> String {
        self.back
            .get(y as usize)
            .map(|row| {
                let line: String = row
                    .iter()
                    .filter(|c| !c.is_continuation())
                    .map(|c| c.ch)
                    .collect();
                line.trim_end().to_owned()
            })
            .unwrap_or_default()
    }

    /// The back buffer as text: rows joined with `'\n'`, trailing blank rows dropped.
    pub fn to_text(&self) -> String {
        let mut rows: Vec<String> = (0..self.height).map(|y| self.row_text(y)).collect();
        while rows.last().is_some_and(String::is_empty) {
            rows.pop();
        }
        rows.join("\n")
    }

    /// Diff back against front, then make back the new front.
    pub fn present(&mut self) -> Vec<CellUpdate> {
        let mut updates = Vec::new();
        for (y, (back_row, front_row)) in self.back.iter().zip(&self.front).enumerate() {
            for (x, (cell, old)) in back_row.iter().zip(front_row).enumerate() {
                if self.full_redraw || cell != old {
                    updates.push(CellUpdate {
                        x: x as u16,
                        y: y as u16,
                        cell: cell.clone(),
                    });
                }
            }
        }
        self.front.clone_from(&self.back);
        self.full_redraw = false;
        updates
    }

    fn style_at(&self, x: i32, y: i32) -> CellStyle {
        if x < 0 || y < 0 {
            return CellStyle::default();
        }
        self.get_cell(x as u16, y as u16)
            .map(|c| c.style.clone())
            .unwrap_or_default()
    }

    fn put(&mut self, x: i32, y: i32, cell: StyledCell) {
        if x < 0 || y < 0 {
            return;
        }
        let Some(row) = self.back.get_mut(y as usize) else { return };
        let x = x as usize;
        if x >= row.len() {
            return;
        }
        // A wide glyph losing either of its cells is blanked.
        if !row[x].is_continuation() {
            if let Some(next) = row.get_mut(x + 1).filter(|c| c.is_continuation()) {
                next.ch = ' ';
            }
        } else if !cell.is_continuation() && x > 0 {
            row[x - 1].ch = ' ';
        }
        row[x] = cell;
    }
}

impl Renderer for Compositor {
    fn queue_box(&mut self, region: Region, primitive: &BoxPrimitive, clip: Region) {
        let visible = region.intersection(clip).intersection(self.bounds());
        if visible.is_empty() {
            return;
        }
        if let Some(fill) = &primitive.fill {
            for y in visible.y..visible.bottom() {
                for x in visible.x..visible.right() {
                    self.put(x, y, StyledCell::new(' ', fill.clone()));
                }
            }
        }
        if let Some((glyphs, style)) = &primitive.border {
            if region.width < 2 || region.height < 2 {
                return;
            }
            let (left, right) = (region.x, region.right() - 1);
            let (top, bottom) = (region.y, region.bottom() - 1);
            let mut edge = |x: i32, y: i32, ch: char| {
                if visible.contains(Offset::new(x, y)) {
                    let base = self
                        .get_cell(x as u16, y as u16)
                        .map(|c| c.style.clone())
                        .unwrap_or_default();
                    self.put(x, y, StyledCell::new(ch, base.patch(style)));
                }
            };
            for x in left + 1..right {
                edge(x, top, glyphs.horizontal);
                edge(x, bottom, glyphs.horizontal);
            }
            for y in top + 1..bottom {
                edge(left, y, glyphs.vertical);
                edge(right, y, glyphs.vertical);
            }
            edge(left, top, glyphs.top_left);
            edge(right, top, glyphs.top_right);
            edge(left, bottom, glyphs.bottom_left);
            edge(right, bottom, glyphs.bottom_right);
        }
    }

    fn queue_text(&mut self, origin: Offset, text: &str, style: &CellStyle, clip: Region) {
        let visible = clip.intersection(self.bounds());
        let mut x = origin.x;
        for (glyph, width) in glyphs(text) {
            // Cells hold one char: a cluster is drawn by its base character.
            let Some(ch) = glyph.chars().next() else { continue };
            if width == 0 {
                continue;
            }
            let point = Offset::new(x, origin.y);
            x += width as i32;
            let tail = Offset::new(point.x + width as i32 - 1, point.y);
            if !visible.contains(point) || !visible.contains(tail) {
                // Half a wide glyph is shown as a blank.
                for cx in point.x..=tail.x {
                    if visible.contains(Offset::new(cx, point.y)) {
                        let base = self.style_at(cx, point.y);
                        self.put(cx, point.y, StyledCell::new(' ', base.patch(style)));
                    }
                }
                continue;
            }
            // Text keeps the background already painted underneath it.
            let base = self.style_at(point.x, point.y).patch(style);
            self.put(point.x, point.y, StyledCell::new(ch, base.clone()));
            for cx in point.x + 1..=tail.x {
                self.put(cx, point.y, StyledCell::continuation(base.clone()));
            }
        }
    }
}

fn blank_screen(width: u16, height: u16) -> Vec<Vec<StyledCell>> {
    vec![vec![StyledCell::blank(); width as usize]; height as usize]
}

// ===========================================================================
// Tests
// ===========================================================================
