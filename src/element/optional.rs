//! Optional: a placeholder that keeps its sibling slot whether or not its
//! content is shown.
//!
//! When hidden it has no children (the cursor pruned them) and takes no space.

use crate::geometry::Region;
use crate::storage::SlotStorage;
use crate::text::TextMeasure;
use crate::tree::{NodeId, Tree};

use super::layout::{arrange_flow, measure_flow};
use super::series::SeriesConfig;
use super::system::{ElementSystem, RenderContext};

/// System for [`ElementKind::Optional`](crate::tree::ElementKind::Optional) nodes.
#[derive(Debug, Default)]
pub struct OptionalSystem {
    /// Whether each node's content is shown.
    states: SlotStorage<bool>,
    flow: SeriesConfig,
}

impl OptionalSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, shown: bool) -> usize {
        self.states.emplace(shown)
    }

    /// Returns whether visibility flipped.
    pub fn update(&mut self, state: usize, shown: bool) -> bool {
        std::mem::replace(&mut self.states[state], shown) != shown
    }

    pub fn is_shown(&self, state: usize) -> bool {
        self.states[state]
    }
}

impl ElementSystem for OptionalSystem {
    fn len(&self) -> usize {
        self.states.len()
    }

    fn pop(&mut self, state: usize) {
        self.states.pop(state);
    }

    fn set_layout_input(&mut self, tree: &mut Tree, node: NodeId, _metrics: &dyn TextMeasure) {
        let (size, weight) = measure_flow(tree, node, &self.flow);
        let layout = &mut tree[node].layout;
        layout.fixed_size = size;
        layout.dynamic = weight;
    }

    fn set_child_layout_output(&mut self, tree: &Tree, node: NodeId) -> Vec<(NodeId, Region)> {
        let region = tree[node].layout.region;
        arrange_flow(tree, node, &self.flow, region).placements
    }

    fn render(&self, _tree: &Tree, _node: NodeId, _ctx: &mut RenderContext<'_>) {}
}
