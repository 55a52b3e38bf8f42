//! Floating: a popup window outside its parent's flow.
//!
//! A floating node is declared like any other container but its parent's
//! layout skips it. The layout driver asks [`FloatingSystem::placement`] for
//! its box, and it is painted after the main layer.

use crate::data::Variable;
use crate::event::{Key, KeyEvent, MouseEvent};
use crate::geometry::{Offset, Region, Size};
use crate::render::{BorderGlyphs, BoxPrimitive};
use crate::storage::SlotStorage;
use crate::text::{clip_to_width, TextMeasure};
use crate::tree::{NodeId, Tree};

use super::layout::{arrange_flow, measure_flow, DynamicWeight};
use super::series::SeriesConfig;
use super::system::{ElementSystem, EventOutcome, RenderContext};

/// Declaration of a floating window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FloatingConfig {
    /// Top-left corner in window coordinates; centred when `None`.
    pub position: Option<Offset>,
    /// Drawn into the top border.
    pub title: String,
    /// Flow of the window's content.
    pub body: SeriesConfig,
}

impl Default for FloatingConfig {
    fn default() -> Self {
        Self {
            position: None,
            title: String::new(),
            body: SeriesConfig::vertical().border(),
        }
    }
}

impl FloatingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place the window at `(x, y)` (builder).
    pub fn at(mut self, x: i32, y: i32) -> Self {
        self.position = Some(Offset::new(x, y));
        self
    }

    /// Set the title (builder).
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the content flow (builder).
    pub fn body(mut self, body: SeriesConfig) -> Self {
        self.body = body;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FloatingState {
    pub config: FloatingConfig,
    pub open: bool,
    /// Written `false` when the window is dismissed.
    pub bound: Option<Variable<bool>>,
}

/// System for [`ElementKind::Floating`](crate::tree::ElementKind::Floating) nodes.
#[derive(Debug, Default)]
pub struct FloatingSystem {
    states: SlotStorage<FloatingState>,
}

impl FloatingSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, config: &FloatingConfig, open: bool) -> usize {
        self.states.emplace(FloatingState {
            config: config.clone(),
            open,
            bound: None,
        })
    }

    /// Apply this frame's declaration. Returns whether config or visibility differ.
    pub fn update(
        &mut self,
        state: usize,
        config: &FloatingConfig,
        open: bool,
        bound: Variable<bool>,
    ) -> bool {
        let current = &mut self.states[state];
        current.bound = Some(bound);
        let flipped = std::mem::replace(&mut current.open, open) != open;
        if current.config == *config {
            return flipped;
        }
        current.config = config.clone();
        true
    }

    pub fn state(&self, state: usize) -> &FloatingState {
        &self.states[state]
    }

    /// The window's box inside `window`: its measured size, clamped to the
    /// window, at the configured position or centred.
    pub fn placement(&self, tree: &Tree, node: NodeId, window: Region) -> Region {
        let state = &self.states[tree[node].state];
        if !state.open {
            return Region::from_parts(window.origin(), Size::ZERO);
        }
        let wanted = tree[node].layout.fixed_size;
        let size = Size::new(wanted.width.min(window.width), wanted.height.min(window.height));
        let origin = match state.config.position {
            Some(at) => window.origin() + at,
            None => {
                window.origin()
                    + Offset::new((window.width - size.width) / 2, (window.height - size.height) / 2)
            }
        };
        Region::from_parts(origin, size)
    }
}

impl ElementSystem for FloatingSystem {
    fn len(&self) -> usize {
        self.states.len()
    }

    fn pop(&mut self, state: usize) {
        self.states.pop(state);
    }

    fn set_layout_input(&mut self, tree: &mut Tree, node: NodeId, _metrics: &dyn TextMeasure) {
        let state = &self.states[tree[node].state];
        let size = if state.open {
            measure_flow(tree, node, &state.config.body).0
        } else {
            Size::ZERO
        };
        let layout = &mut tree[node].layout;
        layout.fixed_size = size;
        // Never takes a share of its parent's space.
        layout.dynamic = DynamicWeight::NONE;
    }

    fn set_child_layout_output(&mut self, tree: &Tree, node: NodeId) -> Vec<(NodeId, Region)> {
        let body = &self.states[tree[node].state].config.body;
        let inner = tree[node].layout.region.shrink(body.insets());
        arrange_flow(tree, node, body, inner).placements
    }

    fn render(&self, tree: &Tree, node: NodeId, ctx: &mut RenderContext<'_>) {
        let state = &self.states[tree[node].state];
        if !state.open {
            return;
        }
        let region = ctx.visible(tree[node].layout.region);
        let border = state
            .config
            .body
            .border
            .then(|| (BorderGlyphs::LIGHT, ctx.theme.border.patch(&ctx.theme.overlay)));
        let primitive = BoxPrimitive {
            fill: Some(ctx.theme.overlay.clone()),
            border,
        };
        ctx.renderer.queue_box(region, &primitive, ctx.clip);
        if state.config.body.border && !state.config.title.is_empty() {
            let room = (region.width - 4).max(0) as usize;
            let title = clip_to_width(&state.config.title, room);
            let style = ctx.theme.overlay.patch(&ctx.theme.control);
            let at = tree[node].layout.region.origin() + Offset::new(2, 0);
            ctx.text(at, title, &style);
        }
    }

    fn child_clip(&self, tree: &Tree, node: NodeId) -> Option<Region> {
        let body = &self.states[tree[node].state].config.body;
        Some(tree[node].layout.region.shrink(body.insets()))
    }

    fn mouse_event(
        &mut self,
        tree: &Tree,
        node: NodeId,
        event: &MouseEvent,
        _local: Offset,
    ) -> EventOutcome {
        // Clicks on the window itself never fall through to what lies below.
        if self.states[tree[node].state].open && event.is_left_down() {
            EventOutcome::Handled
        } else {
            EventOutcome::Ignored
        }
    }

    fn key_event(&mut self, tree: &Tree, node: NodeId, event: &KeyEvent) -> EventOutcome {
        let state = &self.states[tree[node].state];
        if state.open && event.code == Key::Escape {
            EventOutcome::Dismiss
        } else {
            EventOutcome::Ignored
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::CellMetrics;
    use crate::tree::ElementKind;
    use pretty_assertions::assert_eq;

    fn setup(config: FloatingConfig, open: bool) -> (Tree, FloatingSystem, NodeId) {
        let mut system = FloatingSystem::new();
        let mut tree = Tree::new(ElementKind::Series, 0);
        tree.begin();
        let id = tree
            .advance(ElementKind::Floating, || system.create(&config, open))
            .id;
        tree.descend();
        let child = tree.advance(ElementKind::Text, || 0).id;
        tree[child].layout.fixed_size = Size::new(10, 2);
        tree.ascend();
        tree.finish();
        (tree, system, id)
    }

    #[test]
    fn centred_in_window() {
        let (mut tree, mut system, id) = setup(FloatingConfig::new(), true);
        system.set_layout_input(&mut tree, id, &CellMetrics);
        assert_eq!(tree[id].layout.fixed_size, Size::new(12, 4));
        let placed = system.placement(&tree, id, Region::new(0, 0, 40, 10));
        assert_eq!(placed, Region::new(14, 3, 12, 4));
    }

    #[test]
    fn explicit_position_and_clamped_size() {
        let (mut tree, mut system, id) = setup(FloatingConfig::new().at(5, 1), true);
        system.set_layout_input(&mut tree, id, &CellMetrics);
        let placed = system.placement(&tree, id, Region::new(0, 0, 8, 3));
        assert_eq!(placed, Region::new(5, 1, 8, 3));
    }

    #[test]
    fn closed_window_is_empty() {
        let (mut tree, mut system, id) = setup(FloatingConfig::new(), false);
        system.set_layout_input(&mut tree, id, &CellMetrics);
        assert_eq!(tree[id].layout.fixed_size, Size::ZERO);
        assert!(system.placement(&tree, id, Region::new(0, 0, 40, 10)).is_empty());
    }

    #[test]
    fn escape_dismisses() {
        let (tree, mut system, id) = setup(FloatingConfig::new(), true);
        let escape = KeyEvent::plain(Key::Escape);
        assert_eq!(system.key_event(&tree, id, &escape), EventOutcome::Dismiss);
        let other = KeyEvent::plain(Key::Char('q'));
        assert_eq!(system.key_event(&tree, id, &other), EventOutcome::Ignored);
    }
}
