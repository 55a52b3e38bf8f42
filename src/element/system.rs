//! The ElementSystem trait: one implementation per element kind.

use crate::event::{KeyEvent, MouseEvent, ScrollEvent};
use crate::geometry::{Offset, Region};
use crate::render::{CellStyle, Renderer, Theme};
use crate::text::TextMeasure;
use crate::tree::{NodeId, Tree};

// ---------------------------------------------------------------------------
// EventOutcome
// ---------------------------------------------------------------------------

/// What an element did with an input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    /// Not interested; the event may go elsewhere.
    Ignored,
    /// Consumed without any visible effect.
    Handled,
    /// Consumed; the element looks different now.
    Redraw,
    /// Consumed; the element's value changed and must be reported.
    Changed,
    /// Consumed; the element asks to be closed.
    Dismiss,
}

impl EventOutcome {
    /// Whether the event was consumed.
    pub fn is_handled(self) -> bool {
        self != EventOutcome::Ignored
    }

    /// Whether the screen must be redrawn.
    pub fn needs_redraw(self) -> bool {
        matches!(
            self,
            EventOutcome::Redraw | EventOutcome::Changed | EventOutcome::Dismiss
        )
    }
}

// ---------------------------------------------------------------------------
// RenderContext
// ---------------------------------------------------------------------------

/// Everything a system needs to draw one node.
pub struct RenderContext<'a> {
    pub renderer: &'a mut dyn Renderer,
    pub theme: &'a Theme,
    /// Scroll displacement accumulated from enclosing containers.
    pub offset: Offset,
    /// Drawing outside this region is discarded.
    pub clip: Region,
    pub focused: Option<NodeId>,
    pub hovered: Option<NodeId>,
}

impl RenderContext<'_> {
    /// Where a layout region ends up on screen.
    pub fn visible(&self, region: Region) -> Region {
        region.translate(self.offset)
    }

    /// Whether `node` holds keyboard focus.
    pub fn is_focused(&self, node: NodeId) -> bool {
        self.focused == Some(node)
    }

    /// Whether `node` is under the pointer.
    pub fn is_hovered(&self, node: NodeId) -> bool {
        self.hovered == Some(node)
    }

    /// The control style for `node`: focus wins over hover.
    pub fn control_style(&self, node: NodeId) -> CellStyle {
        if self.is_focused(node) {
            self.theme.control.patch(&self.theme.focused)
        } else if self.is_hovered(node) {
            self.theme.control.patch(&self.theme.hovered)
        } else {
            self.theme.control.clone()
        }
    }

    /// Draw one line of text at a layout-space position.
    pub fn text(&mut self, at: Offset, text: &str, style: &CellStyle) {
        let origin = at + self.offset;
        self.renderer.queue_text(origin, text, style, self.clip);
    }
}

// ---------------------------------------------------------------------------
// ElementSystem
// ---------------------------------------------------------------------------

/// Per-kind behaviour over per-kind state.
///
/// A system owns the state of every node of its kind in a slot storage; the
/// node's `state` field indexes into it. Creation takes kind-specific
/// arguments and is therefore an inherent `create` on each system.
pub trait ElementSystem {
    /// Number of live states.
    fn len(&self) -> usize;

    /// Whether no states are live.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Release the state of a destroyed node.
    fn pop(&mut self, state: usize);

    /// Compute the node's fixed size and dynamic weights. Containers read
    /// their children's already computed sizes.
    fn set_layout_input(&mut self, tree: &mut Tree, node: NodeId, metrics: &dyn TextMeasure);

    /// Containers: place in-flow children inside the node's resolved box.
    fn set_child_layout_output(&mut self, _tree: &Tree, _node: NodeId) -> Vec<(NodeId, Region)> {
        Vec::new()
    }

    /// Draw the node before its children.
    fn render(&self, tree: &Tree, node: NodeId, ctx: &mut RenderContext<'_>);

    /// Draw on top of the node's children (scrollbars).
    fn render_after(&self, _tree: &Tree, _node: NodeId, _ctx: &mut RenderContext<'_>) {}

    /// Draw in the overlay layer, above everything in the main layer.
    fn render_overlay(&self, _tree: &Tree, _node: NodeId, _ctx: &mut RenderContext<'_>) {}

    /// Layout-space region the node occupies in the overlay layer.
    fn overlay_region(&self, _tree: &Tree, _node: NodeId) -> Option<Region> {
        None
    }

    /// Extra displacement applied to the node's children (scrolling).
    fn child_offset(&self, _tree: &Tree, _node: NodeId) -> Offset {
        Offset::ZERO
    }

    /// Clip applied to the node's children, in layout space.
    fn child_clip(&self, _tree: &Tree, _node: NodeId) -> Option<Region> {
        None
    }

    /// A mouse event hit this node; `local` is relative to its visible origin.
    fn mouse_event(
        &mut self,
        _tree: &Tree,
        _node: NodeId,
        _event: &MouseEvent,
        _local: Offset,
    ) -> EventOutcome {
        EventOutcome::Ignored
    }

    /// A key event while this node is focused.
    fn key_event(&mut self, _tree: &Tree, _node: NodeId, _event: &KeyEvent) -> EventOutcome {
        EventOutcome::Ignored
    }

    /// A wheel event over this node or one of its descendants.
    fn scroll_event(&mut self, _tree: &Tree, _node: NodeId, _event: &ScrollEvent) -> EventOutcome {
        EventOutcome::Ignored
    }

    /// Whether the node takes keyboard focus.
    fn focusable(&self, _state: usize) -> bool {
        false
    }

    fn focus_enter(&mut self, _state: usize) {}

    fn focus_leave(&mut self, _state: usize) {}
}
