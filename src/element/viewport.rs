//! Viewport: a fixed-size cell canvas painted by caller code.
//!
//! The canvas is retained between frames. The caller's paint function runs
//! only when the node is re-evaluated; other frames redraw the retained cells.

use crate::event::MouseEvent;
use crate::geometry::{Offset, Size};
use crate::render::{CellStyle, StyledCell};
use crate::storage::SlotStorage;
use crate::text::{glyphs, TextMeasure};
use crate::tree::{NodeId, Tree};

use super::layout::DynamicWeight;
use super::system::{ElementSystem, EventOutcome, RenderContext};

// ---------------------------------------------------------------------------
// Canvas
// ---------------------------------------------------------------------------

/// A grid of styled cells. Writes outside the grid are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    size: Size,
    cells: Vec<StyledCell>,
}

impl Canvas {
    pub fn new(size: Size) -> Self {
        let size = Size::new(size.width.max(0), size.height.max(0));
        Self {
            size,
            cells: vec![StyledCell::blank(); (size.width * size.height) as usize],
        }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    /// Reset every cell to a blank.
    pub fn clear(&mut self) {
        self.cells.fill(StyledCell::blank());
    }

    /// Blank every cell with `style`.
    pub fn fill(&mut self, style: &CellStyle) {
        self.cells.fill(StyledCell::new(' ', style.clone()));
    }

    pub fn get(&self, x: i32, y: i32) -> Option<&StyledCell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    pub fn put(&mut self, x: i32, y: i32, ch: char, style: &CellStyle) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = StyledCell::new(ch, style.clone());
        }
    }

    /// Write `text` left to right from `(x, y)` without wrapping.
    pub fn text(&mut self, x: i32, y: i32, text: &str, style: &CellStyle) {
        let mut at = x;
        for (glyph, width) in glyphs(text) {
            let Some(ch) = glyph.chars().next().filter(|_| width > 0) else { continue };
            self.put(at, y, ch, style);
            for tail in at + 1..at + width as i32 {
                if let Some(i) = self.index(tail, y) {
                    self.cells[i] = StyledCell::continuation(style.clone());
                }
            }
            at += width as i32;
        }
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        (x >= 0 && y >= 0 && x < self.size.width && y < self.size.height)
            .then(|| (y * self.size.width + x) as usize)
    }

    /// Row `y` split into runs of equally styled cells.
    fn runs(&self, y: i32) -> Vec<(i32, String, &CellStyle)> {
        let width = self.size.width as usize;
        let row = &self.cells[y as usize * width..(y as usize + 1) * width];
        let mut runs: Vec<(i32, String, &CellStyle)> = Vec::new();
        for (x, cell) in row.iter().enumerate() {
            if cell.is_continuation() {
                continue;
            }
            match runs.last_mut() {
                Some((_, text, style)) if *style == &cell.style => text.push(cell.ch),
                _ => runs.push((x as i32, cell.ch.to_string(), &cell.style)),
            }
        }
        runs
    }
}

// ---------------------------------------------------------------------------
// ViewportSystem
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewportState {
    pub canvas: Canvas,
    /// Local position of a click not yet reported to the caller.
    clicked: Option<Offset>,
}

/// System for [`ElementKind::Viewport`](crate::tree::ElementKind::Viewport) nodes.
#[derive(Debug, Default)]
pub struct ViewportSystem {
    states: SlotStorage<ViewportState>,
}

impl ViewportSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, size: Size) -> usize {
        self.states.emplace(ViewportState {
            canvas: Canvas::new(size),
            clicked: None,
        })
    }

    /// Resize the canvas, clearing it. Returns whether the size differs.
    pub fn resize(&mut self, state: usize, size: Size) -> bool {
        let current = &mut self.states[state];
        if current.canvas.size() == size {
            return false;
        }
        current.canvas = Canvas::new(size);
        true
    }

    pub fn canvas(&self, state: usize) -> &Canvas {
        &self.states[state].canvas
    }

    pub fn canvas_mut(&mut self, state: usize) -> &mut Canvas {
        &mut self.states[state].canvas
    }

    /// Report and clear a pending click.
    pub fn take_clicked(&mut self, state: usize) -> Option<Offset> {
        self.states[state].clicked.take()
    }
}

impl ElementSystem for ViewportSystem {
    fn len(&self) -> usize {
        self.states.len()
    }

    fn pop(&mut self, state: usize) {
        self.states.pop(state);
    }

    fn set_layout_input(&mut self, tree: &mut Tree, node: NodeId, _metrics: &dyn TextMeasure) {
        let size = self.states[tree[node].state].canvas.size();
        let layout = &mut tree[node].layout;
        layout.fixed_size = size;
        layout.dynamic = DynamicWeight::NONE;
    }

    fn render(&self, tree: &Tree, node: NodeId, ctx: &mut RenderContext<'_>) {
        let canvas = &self.states[tree[node].state].canvas;
        let origin = tree[node].layout.region.origin();
        for y in 0..canvas.size().height {
            for (x, text, style) in canvas.runs(y) {
                ctx.text(origin + Offset::new(x, y), &text, style);
            }
        }
    }

    fn mouse_event(
        &mut self,
        tree: &Tree,
        node: NodeId,
        event: &MouseEvent,
        local: Offset,
    ) -> EventOutcome {
        if !event.is_left_down() {
            return EventOutcome::Ignored;
        }
        self.states[tree[node].state].clicked = Some(local);
        EventOutcome::Changed
    }
}
