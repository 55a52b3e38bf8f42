//! Series: a vertical or horizontal flow container with optional scrolling.

use crate::event::ScrollEvent;
use crate::geometry::{Axis, Offset, Region, Spacing};
use crate::render::{BorderGlyphs, BoxPrimitive};
use crate::storage::SlotStorage;
use crate::text::TextMeasure;
use crate::tree::{NodeId, Tree};

use super::layout::{arrange_flow, insets, measure_flow, Alignment, Length};
use super::system::{ElementSystem, EventOutcome, RenderContext};

// ---------------------------------------------------------------------------
// SeriesConfig
// ---------------------------------------------------------------------------

/// Declaration of a series container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesConfig {
    /// Main axis: children are stacked along it.
    pub axis: Axis,
    pub width: Length,
    pub height: Length,
    /// Cross-axis placement of children narrower than the series.
    pub align: Alignment,
    pub padding: Spacing,
    /// Cells between consecutive children.
    pub spacing: i32,
    pub border: bool,
    /// Scroll along the main axis when the content overruns.
    pub scroll: bool,
}

impl Default for SeriesConfig {
    fn default() -> Self {
        Self::vertical()
    }
}

impl SeriesConfig {
    /// Top-to-bottom, wrapping its content.
    pub fn vertical() -> Self {
        Self {
            axis: Axis::Vertical,
            width: Length::Wrap,
            height: Length::Wrap,
            align: Alignment::Min,
            padding: Spacing::ZERO,
            spacing: 0,
            border: false,
            scroll: false,
        }
    }

    /// Left-to-right, wrapping its content.
    pub fn horizontal() -> Self {
        Self {
            axis: Axis::Horizontal,
            ..Self::vertical()
        }
    }

    /// Set the width policy (builder).
    pub fn width(mut self, width: Length) -> Self {
        self.width = width;
        self
    }

    /// Set the height policy (builder).
    pub fn height(mut self, height: Length) -> Self {
        self.height = height;
        self
    }

    /// Take a share of leftover space on both axes (builder).
    pub fn fill(self, weight: u32) -> Self {
        self.width(Length::Dynamic(weight))
            .height(Length::Dynamic(weight))
    }

    /// Set cross-axis alignment (builder).
    pub fn align(mut self, align: Alignment) -> Self {
        self.align = align;
        self
    }

    /// Set padding (builder).
    pub fn padding(mut self, padding: Spacing) -> Self {
        self.padding = padding;
        self
    }

    /// Set the gap between children (builder).
    pub fn spacing(mut self, spacing: i32) -> Self {
        self.spacing = spacing;
        self
    }

    /// Draw a border (builder).
    pub fn border(mut self) -> Self {
        self.border = true;
        self
    }

    /// Enable scrolling along the main axis (builder).
    pub fn scrollable(mut self) -> Self {
        self.scroll = true;
        self
    }

    /// Padding plus border.
    pub fn insets(&self) -> Spacing {
        insets(self.padding, self.border)
    }
}

// ---------------------------------------------------------------------------
// SeriesSystem
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SeriesState {
    pub config: SeriesConfig,
    /// Content extent beyond the available main-axis space.
    pub overrun: i32,
    /// Always within `[0, overrun]`.
    pub scroll_pos: i32,
}

/// System for [`ElementKind::Series`](crate::tree::ElementKind::Series) nodes.
#[derive(Debug)]
pub struct SeriesSystem {
    states: SlotStorage<SeriesState>,
    scroll_step: i32,
}

impl SeriesSystem {
    pub fn new(scroll_step: i32) -> Self {
        Self {
            states: SlotStorage::new(),
            scroll_step: scroll_step.max(1),
        }
    }

    pub fn create(&mut self, config: SeriesConfig) -> usize {
        self.states.emplace(SeriesState {
            config,
            overrun: 0,
            scroll_pos: 0,
        })
    }

    /// Apply this frame's declaration. Returns whether it differs.
    pub fn update(&mut self, state: usize, config: &SeriesConfig) -> bool {
        let current = &mut self.states[state];
        if current.config == *config {
            return false;
        }
        current.config = config.clone();
        true
    }

    pub fn state(&self, state: usize) -> &SeriesState {
        &self.states[state]
    }

    /// Scroll to `pos`, clamped to `[0, overrun]`. Returns whether it moved.
    pub fn scroll_to(&mut self, state: usize, pos: i32) -> bool {
        let s = &mut self.states[state];
        let clamped = pos.clamp(0, s.overrun);
        if clamped == s.scroll_pos {
            return false;
        }
        s.scroll_pos = clamped;
        true
    }
}

impl ElementSystem for SeriesSystem {
    fn len(&self) -> usize {
        self.states.len()
    }

    fn pop(&mut self, state: usize) {
        self.states.pop(state);
    }

    fn set_layout_input(&mut self, tree: &mut Tree, node: NodeId, _metrics: &dyn TextMeasure) {
        let config = &self.states[tree[node].state].config;
        let (size, weight) = measure_flow(tree, node, config);
        let layout = &mut tree[node].layout;
        layout.fixed_size = size;
        layout.dynamic = weight;
    }

    fn set_child_layout_output(&mut self, tree: &Tree, node: NodeId) -> Vec<(NodeId, Region)> {
        let state = &mut self.states[tree[node].state];
        let inner = tree[node].layout.region.shrink(state.config.insets());
        let arrangement = arrange_flow(tree, node, &state.config, inner);
        state.overrun = if state.config.scroll {
            arrangement.overrun
        } else {
            0
        };
        state.scroll_pos = state.scroll_pos.clamp(0, state.overrun);
        arrangement.placements
    }

    fn render(&self, tree: &Tree, node: NodeId, ctx: &mut RenderContext<'_>) {
        let state = &self.states[tree[node].state];
        if !state.config.border {
            return;
        }
        let region = ctx.visible(tree[node].layout.region);
        let primitive = BoxPrimitive {
            fill: None,
            border: Some((BorderGlyphs::LIGHT, ctx.theme.border.clone())),
        };
        ctx.renderer.queue_box(region, &primitive, ctx.clip);
    }

    fn render_after(&self, tree: &Tree, node: NodeId, ctx: &mut RenderContext<'_>) {
        let state = &self.states[tree[node].state];
        if state.overrun == 0 {
            return;
        }
        let inner = ctx.visible(tree[node].layout.region.shrink(state.config.insets()));
        let axis = state.config.axis;
        let track = inner.size().along(axis);
        if track <= 0 {
            return;
        }
        let thumb = (track * track / (track + state.overrun)).max(1);
        let start = (track - thumb) * state.scroll_pos / state.overrun;
        let style = ctx.theme.scrollbar.clone();
        for i in start..start + thumb {
            let (at, glyph) = match axis {
                Axis::Vertical => (Offset::new(inner.right() - 1, inner.y + i), "┃"),
                Axis::Horizontal => (Offset::new(inner.x + i, inner.bottom() - 1), "━"),
            };
            ctx.renderer.queue_text(at, glyph, &style, ctx.clip);
        }
    }

    fn child_offset(&self, tree: &Tree, node: NodeId) -> Offset {
        let state = &self.states[tree[node].state];
        Offset::from_axes(state.config.axis, -state.scroll_pos, 0)
    }

    fn child_clip(&self, tree: &Tree, node: NodeId) -> Option<Region> {
        let state = &self.states[tree[node].state];
        (state.config.scroll || state.config.border)
            .then(|| tree[node].layout.region.shrink(state.config.insets()))
    }

    fn scroll_event(&mut self, tree: &Tree, node: NodeId, event: &ScrollEvent) -> EventOutcome {
        let index = tree[node].state;
        let state = &self.states[index];
        if !state.config.scroll || state.overrun == 0 {
            return EventOutcome::Ignored;
        }
        let lines = match state.config.axis {
            Axis::Vertical => event.delta.y,
            Axis::Horizontal if event.delta.x != 0 => event.delta.x,
            Axis::Horizontal => event.delta.y,
        };
        let target = state.scroll_pos + lines * self.scroll_step;
        if self.scroll_to(index, target) {
            EventOutcome::Redraw
        } else {
            // At the limit: let an enclosing series scroll instead.
            EventOutcome::Ignored
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Size;
    use crate::text::CellMetrics;
    use crate::tree::ElementKind;
    use pretty_assertions::assert_eq;

    /// A root series holding leaves with the given fixed sizes.
    fn setup(config: SeriesConfig, leaves: &[(Size, u32)]) -> (Tree, SeriesSystem, Vec<NodeId>) {
        let mut system = SeriesSystem::new(1);
        let state = system.create(config);
        let mut tree = Tree::new(ElementKind::Series, state);
        tree.begin();
        let ids = leaves
            .iter()
            .enumerate()
            .map(|(i, &(size, weight))| {
                let id = tree.advance(ElementKind::Text, || i).id;
                tree[id].layout.fixed_size = size;
                tree[id].layout.dynamic.horizontal = weight;
                tree[id].layout.dynamic.vertical = weight;
                id
            })
            .collect();
        tree.finish();
        (tree, system, ids)
    }

    #[test]
    fn vertical_wrap_sums_heights() {
        let config = SeriesConfig::vertical().spacing(1).padding(Spacing::all(1));
        let (mut tree, mut system, _) = setup(config, &[(Size::new(5, 1), 0), (Size::new(8, 2), 0)]);
        let root = tree.root();
        system.set_layout_input(&mut tree, root, &CellMetrics);
        assert_eq!(tree[root].layout.fixed_size, Size::new(10, 6));
    }

    #[test]
    fn dynamic_children_share_leftover() {
        let config = SeriesConfig::horizontal().fill(1);
        let (mut tree, mut system, ids) = setup(
            config,
            &[(Size::new(2, 1), 1), (Size::new(2, 1), 0), (Size::new(2, 1), 3)],
        );
        let root = tree.root();
        tree[root].layout.region = Region::new(0, 0, 14, 3);
        let placed = system.set_child_layout_output(&tree, root);
        assert_eq!(
            placed,
            vec![
                (ids[0], Region::new(0, 0, 4, 3)),
                (ids[1], Region::new(4, 0, 2, 1)),
                (ids[2], Region::new(6, 0, 8, 3)),
            ]
        );
    }

    #[test]
    fn cross_alignment() {
        let config = SeriesConfig::vertical().align(Alignment::Center);
        let (mut tree, mut system, ids) = setup(config, &[(Size::new(4, 1), 0)]);
        let root = tree.root();
        tree[root].layout.region = Region::new(0, 0, 10, 5);
        let placed = system.set_child_layout_output(&tree, root);
        assert_eq!(placed, vec![(ids[0], Region::new(3, 0, 4, 1))]);
    }

    #[test]
    fn scroll_is_clamped_to_overrun() {
        let config = SeriesConfig::vertical().height(Length::Fixed(3)).scrollable();
        let leaves = [(Size::new(3, 1), 0); 5];
        let (mut tree, mut system, _) = setup(config, &leaves);
        let root = tree.root();
        tree[root].layout.region = Region::new(0, 0, 3, 3);
        system.set_child_layout_output(&tree, root);

        let index = tree[root].state;
        assert_eq!(system.state(index).overrun, 2);
        let down = ScrollEvent::vertical(0, 0, 1);
        assert_eq!(system.scroll_event(&tree, root, &down), EventOutcome::Redraw);
        assert_eq!(system.scroll_event(&tree, root, &down), EventOutcome::Redraw);
        assert_eq!(system.scroll_event(&tree, root, &down), EventOutcome::Ignored);
        assert_eq!(system.state(index).scroll_pos, 2);
        assert_eq!(system.child_offset(&tree, root), Offset::new(0, -2));

        assert!(system.scroll_to(index, -10));
        assert_eq!(system.state(index).scroll_pos, 0);
    }

    #[test]
    fn scrollbar_column_is_kept_free() {
        let config = SeriesConfig::vertical().height(Length::Fixed(2)).scrollable();
        let (mut tree, mut system, ids) = setup(config, &[(Size::new(4, 1), 1); 3]);
        let root = tree.root();
        system.set_layout_input(&mut tree, root, &CellMetrics);
        assert_eq!(tree[root].layout.fixed_size, Size::new(5, 2));

        // Overrunning content stops short of the scrollbar.
        tree[root].layout.region = Region::new(0, 0, 8, 2);
        let placed = system.set_child_layout_output(&tree, root);
        assert_eq!(placed[0], (ids[0], Region::new(0, 0, 7, 1)));

        // Content that fits keeps the full width.
        tree.remove_subtree(ids[2]);
        let placed = system.set_child_layout_output(&tree, root);
        assert_eq!(placed[0], (ids[0], Region::new(0, 0, 8, 1)));
    }

    #[test]
    fn shrinking_content_reclamps_scroll() {
        let config = SeriesConfig::vertical().height(Length::Fixed(2)).scrollable();
        let (mut tree, mut system, ids) = setup(config, &[(Size::new(1, 1), 0); 4]);
        let root = tree.root();
        tree[root].layout.region = Region::new(0, 0, 1, 2);
        system.set_child_layout_output(&tree, root);
        let index = tree[root].state;
        system.scroll_to(index, 2);

        tree.remove_subtree(ids[3]);
        tree.remove_subtree(ids[2]);
        system.set_child_layout_output(&tree, root);
        assert_eq!(system.state(index).overrun, 0);
        assert_eq!(system.state(index).scroll_pos, 0);
    }

    #[test]
    fn non_scrolling_series_ignores_wheel() {
        let (tree, mut system, _) = setup(SeriesConfig::vertical(), &[]);
        let root = tree.root();
        let wheel = ScrollEvent::vertical(0, 0, 1);
        assert_eq!(system.scroll_event(&tree, root, &wheel), EventOutcome::Ignored);
    }

    #[test]
    fn update_reports_changes() {
        let mut system = SeriesSystem::new(1);
        let s = system.create(SeriesConfig::vertical());
        assert!(!system.update(s, &SeriesConfig::vertical()));
        assert!(system.update(s, &SeriesConfig::horizontal()));
        assert_eq!(system.state(s).config.axis, Axis::Horizontal);
    }
}
