//! The dispatch table from [`ElementKind`] to its system.

use crate::event::{KeyEvent, MouseEvent, ScrollEvent};
use crate::geometry::{Offset, Region};
use crate::text::TextMeasure;
use crate::tree::{ElementKind, NodeId, Tree};

use super::button::ButtonSystem;
use super::checkbox::CheckboxSystem;
use super::dropdown::DropdownSystem;
use super::floating::FloatingSystem;
use super::optional::OptionalSystem;
use super::series::SeriesSystem;
use super::system::{ElementSystem, EventOutcome, RenderContext};
use super::text::TextSystem;
use super::text_box::TextBoxSystem;
use super::text_input::TextInputSystem;
use super::viewport::ViewportSystem;

/// One system per element kind.
///
/// Kind-specific operations (creation, declaration updates, reporting) go
/// through the public fields; everything the frame driver does uniformly is
/// dispatched on the node's kind.
#[derive(Debug)]
pub struct Systems {
    pub series: SeriesSystem,
    pub text: TextSystem,
    pub text_box: TextBoxSystem,
    pub button: ButtonSystem,
    pub checkbox: CheckboxSystem,
    pub text_input: TextInputSystem,
    pub dropdown: DropdownSystem,
    pub optional: OptionalSystem,
    pub floating: FloatingSystem,
    pub viewport: ViewportSystem,
}

impl Systems {
    pub fn new(scroll_step: i32) -> Self {
        Self {
            series: SeriesSystem::new(scroll_step),
            text: TextSystem::new(),
            text_box: TextBoxSystem::new(),
            button: ButtonSystem::new(),
            checkbox: CheckboxSystem::new(),
            text_input: TextInputSystem::new(),
            dropdown: DropdownSystem::new(),
            optional: OptionalSystem::new(),
            floating: FloatingSystem::new(),
            viewport: ViewportSystem::new(),
        }
    }

    pub fn system(&self, kind: ElementKind) -> &dyn ElementSystem {
        match kind {
            ElementKind::Series => &self.series,
            ElementKind::Text => &self.text,
            ElementKind::TextBox => &self.text_box,
            ElementKind::Button => &self.button,
            ElementKind::Checkbox => &self.checkbox,
            ElementKind::TextInput => &self.text_input,
            ElementKind::Dropdown => &self.dropdown,
            ElementKind::Optional => &self.optional,
            ElementKind::Floating => &self.floating,
            ElementKind::Viewport => &self.viewport,
        }
    }

    pub fn system_mut(&mut self, kind: ElementKind) -> &mut dyn ElementSystem {
        match kind {
            ElementKind::Series => &mut self.series,
            ElementKind::Text => &mut self.text,
            ElementKind::TextBox => &mut self.text_box,
            ElementKind::Button => &mut self.button,
            ElementKind::Checkbox => &mut self.checkbox,
            ElementKind::TextInput => &mut self.text_input,
            ElementKind::Dropdown => &mut self.dropdown,
            ElementKind::Optional => &mut self.optional,
            ElementKind::Floating => &mut self.floating,
            ElementKind::Viewport => &mut self.viewport,
        }
    }

    /// Live states across every system.
    pub fn live_states(&self) -> usize {
        ElementKind::ALL.iter().map(|&k| self.system(k).len()).sum()
    }

    pub fn pop(&mut self, kind: ElementKind, state: usize) {
        self.system_mut(kind).pop(state);
    }

    // -- layout ------------------------------------------------------------

    pub fn set_layout_input(&mut self, tree: &mut Tree, node: NodeId, metrics: &dyn TextMeasure) {
        let kind = tree[node].kind;
        self.system_mut(kind).set_layout_input(tree, node, metrics);
    }

    pub fn set_child_layout_output(&mut self, tree: &Tree, node: NodeId) -> Vec<(NodeId, Region)> {
        self.system_mut(tree[node].kind)
            .set_child_layout_output(tree, node)
    }

    /// Box of a floating node inside `window`.
    pub fn floating_region(&self, tree: &Tree, node: NodeId, window: Region) -> Region {
        self.floating.placement(tree, node, window)
    }

    // -- painting ----------------------------------------------------------

    pub fn render(&self, tree: &Tree, node: NodeId, ctx: &mut RenderContext<'_>) {
        self.system(tree[node].kind).render(tree, node, ctx);
    }

    pub fn render_after(&self, tree: &Tree, node: NodeId, ctx: &mut RenderContext<'_>) {
        self.system(tree[node].kind).render_after(tree, node, ctx);
    }

    pub fn render_overlay(&self, tree: &Tree, node: NodeId, ctx: &mut RenderContext<'_>) {
        self.system(tree[node].kind).render_overlay(tree, node, ctx);
    }

    pub fn overlay_region(&self, tree: &Tree, node: NodeId) -> Option<Region> {
        self.system(tree[node].kind).overlay_region(tree, node)
    }

    pub fn child_offset(&self, tree: &Tree, node: NodeId) -> Offset {
        self.system(tree[node].kind).child_offset(tree, node)
    }

    pub fn child_clip(&self, tree: &Tree, node: NodeId) -> Option<Region> {
        self.system(tree[node].kind).child_clip(tree, node)
    }

    // -- input -------------------------------------------------------------

    pub fn mouse_event(
        &mut self,
        tree: &Tree,
        node: NodeId,
        event: &MouseEvent,
        local: Offset,
    ) -> EventOutcome {
        self.system_mut(tree[node].kind)
            .mouse_event(tree, node, event, local)
    }

    pub fn key_event(&mut self, tree: &Tree, node: NodeId, event: &KeyEvent) -> EventOutcome {
        self.system_mut(tree[node].kind).key_event(tree, node, event)
    }

    pub fn scroll_event(&mut self, tree: &Tree, node: NodeId, event: &ScrollEvent) -> EventOutcome {
        self.system_mut(tree[node].kind)
            .scroll_event(tree, node, event)
    }

    pub fn focusable(&self, tree: &Tree, node: NodeId) -> bool {
        let node = &tree[node];
        self.system(node.kind).focusable(node.state)
    }

    pub fn focus_enter(&mut self, tree: &Tree, node: NodeId) {
        let node = &tree[node];
        self.system_mut(node.kind).focus_enter(node.state);
    }

    pub fn focus_leave(&mut self, tree: &Tree, node: NodeId) {
        let node = &tree[node];
        self.system_mut(node.kind).focus_leave(node.state);
    }
}
