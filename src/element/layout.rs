//! Layout vocabulary and the two-pass layout driver.
//!
//! Pass one walks bottom-up over layout-dirty nodes and asks each system for
//! the node's fixed size and dynamic weights. Pass two walks top-down from the
//! root, asks containers to place their children inside their resolved box,
//! and only descends where a box changed or the subtree was layout-dirty.

use std::collections::HashSet;

use tracing::debug;

use crate::geometry::{Axis, Offset, Region, Size, Spacing};
use crate::text::TextMeasure;
use crate::tree::{Dirty, NodeId, Tree};

use super::registry::Systems;
use super::series::SeriesConfig;

// ---------------------------------------------------------------------------
// Length / Alignment / DynamicWeight
// ---------------------------------------------------------------------------

/// Sizing policy of a container along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Length {
    /// Exactly this many cells.
    Fixed(i32),
    /// Just large enough for the content.
    #[default]
    Wrap,
    /// Content size plus a share of the parent's leftover space.
    Dynamic(u32),
}

impl Length {
    /// Dynamic weight requested along the axis.
    pub const fn weight(self) -> u32 {
        match self {
            Length::Dynamic(w) => w,
            _ => 0,
        }
    }
}

/// Placement of a child along its parent's cross axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Min,
    Center,
    Max,
}

impl Alignment {
    /// Offset of a `size`-long item inside `available` cells.
    pub fn offset(self, available: i32, size: i32) -> i32 {
        let free = (available - size).max(0);
        match self {
            Alignment::Min => 0,
            Alignment::Center => free / 2,
            Alignment::Max => free,
        }
    }
}

/// Dynamic-size weights of a node along each axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DynamicWeight {
    pub horizontal: u32,
    pub vertical: u32,
}

impl DynamicWeight {
    pub const NONE: DynamicWeight = DynamicWeight {
        horizontal: 0,
        vertical: 0,
    };

    pub const fn new(horizontal: u32, vertical: u32) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    /// The weight along `axis`.
    pub const fn along(self, axis: Axis) -> u32 {
        match axis {
            Axis::Horizontal => self.horizontal,
            Axis::Vertical => self.vertical,
        }
    }
}

/// Split `leftover` cells between items proportionally to `weights`.
///
/// Shares always sum to exactly `leftover` when any weight is non-zero.
pub fn distribute(leftover: i32, weights: &[u32]) -> Vec<i32> {
    let total: u64 = weights.iter().map(|&w| u64::from(w)).sum();
    if total == 0 || leftover <= 0 {
        return vec![0; weights.len()];
    }
    let leftover = leftover as u64;
    let mut acc = 0u64;
    let mut given = 0u64;
    weights
        .iter()
        .map(|&w| {
            acc += u64::from(w);
            let upto = leftover * acc / total;
            let share = upto - given;
            given = upto;
            share as i32
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Flow layout shared by series-like containers
// ---------------------------------------------------------------------------

/// Result of placing a flow container's children.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Arrangement {
    pub placements: Vec<(NodeId, Region)>,
    /// Main-axis extent of the content.
    pub content: i32,
    /// How far the content exceeds the available main-axis space.
    pub overrun: i32,
}

fn resolve_length(length: Length, wrapped: i32, chrome: i32, scrolls: bool) -> i32 {
    match length {
        Length::Fixed(n) => n,
        Length::Wrap => wrapped,
        Length::Dynamic(_) if scrolls => chrome,
        Length::Dynamic(_) => wrapped,
    }
}

/// Fixed size and weights of a flow container from its in-flow children.
pub fn measure_flow(tree: &Tree, node: NodeId, config: &SeriesConfig) -> (Size, DynamicWeight) {
    let axis = config.axis;
    let mut main = 0;
    let mut cross = 0;
    let mut count = 0;
    for child in tree.children(node) {
        let child = &tree[child];
        if child.kind.is_floating() {
            continue;
        }
        let size = child.layout.fixed_size;
        main += size.along(axis);
        cross = cross.max(size.along(axis.cross()));
        count += 1;
    }
    if config.scroll {
        // Room for the scrollbar beside the content.
        cross += 1;
    }
    if count > 1 {
        main += config.spacing * (count - 1);
    }
    let chrome = config.insets().total();
    let content = Size::from_axes(axis, main, cross) + chrome;
    let size = Size::new(
        resolve_length(
            config.width,
            content.width,
            chrome.width,
            config.scroll && axis == Axis::Horizontal,
        ),
        resolve_length(
            config.height,
            content.height,
            chrome.height,
            config.scroll && axis == Axis::Vertical,
        ),
    );
    (size, DynamicWeight::new(config.width.weight(), config.height.weight()))
}

/// Place a flow container's in-flow children inside `inner`.
pub fn arrange_flow(tree: &Tree, node: NodeId, config: &SeriesConfig, inner: Region) -> Arrangement {
    let axis = config.axis;
    let items: Vec<(NodeId, Size, DynamicWeight)> = tree
        .children(node)
        .filter(|&c| !tree[c].kind.is_floating())
        .map(|c| (c, tree[c].layout.fixed_size, tree[c].layout.dynamic))
        .collect();
    if items.is_empty() {
        return Arrangement::default();
    }

    let avail_main = inner.size().along(axis);
    let arrangement = place_flow(&items, config, inner);
    let avail_cross = inner.size().along(axis.cross());
    if !config.scroll || arrangement.overrun == 0 || avail_cross <= 1 {
        return arrangement;
    }
    // The trailing cross-axis cell belongs to the scrollbar. The main axis is
    // unchanged, so the overrun stays the same.
    let narrowed = Region::from_parts(inner.origin(), Size::from_axes(axis, avail_main, avail_cross - 1));
    place_flow(&items, config, narrowed)
}

fn place_flow(items: &[(NodeId, Size, DynamicWeight)], config: &SeriesConfig, inner: Region) -> Arrangement {
    let axis = config.axis;
    let cross_axis = axis.cross();
    let avail_main = inner.size().along(axis);
    let avail_cross = inner.size().along(cross_axis);
    let spacing_total = config.spacing * (items.len() as i32 - 1);
    let fixed_total: i32 = items.iter().map(|(_, s, _)| s.along(axis)).sum::<i32>() + spacing_total;
    let weights: Vec<u32> = items.iter().map(|(_, _, w)| w.along(axis)).collect();
    let extra = distribute(avail_main - fixed_total, &weights);

    let mut pos = 0;
    let mut placements = Vec::with_capacity(items.len());
    for (&(id, size, weight), extra) in items.iter().zip(extra) {
        let main_size = size.along(axis) + extra;
        let cross_size = if weight.along(cross_axis) > 0 {
            avail_cross.max(size.along(cross_axis))
        } else {
            size.along(cross_axis)
        };
        let cross_pos = config.align.offset(avail_cross, cross_size);
        let origin = inner.origin() + Offset::from_axes(axis, pos, cross_pos);
        placements.push((
            id,
            Region::from_parts(origin, Size::from_axes(axis, main_size, cross_size)),
        ));
        pos += main_size + config.spacing;
    }
    let content = pos - config.spacing;
    Arrangement {
        placements,
        content,
        overrun: (content - avail_main).max(0),
    }
}

/// Padding plus a one-cell border when `border` is set.
pub fn insets(padding: Spacing, border: bool) -> Spacing {
    if border {
        padding + Spacing::all(1)
    } else {
        padding
    }
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

/// Work done by one [`run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayoutStats {
    /// Nodes whose layout input was recomputed.
    pub measured: usize,
    /// Nodes whose box was (re)assigned.
    pub placed: usize,
}

/// Run both layout passes over `tree`, fitting the root into `window`.
pub fn run(tree: &mut Tree, systems: &mut Systems, metrics: &dyn TextMeasure, window: Region) -> LayoutStats {
    let mut stats = LayoutStats::default();

    // Bottom-up over layout-dirty nodes. Ancestors of a dirty node are dirty
    // too, so clean subtrees are never entered.
    let dirty = collect_layout_dirty(tree);
    for &id in &dirty {
        systems.set_layout_input(tree, id, metrics);
        tree.clean(id, Dirty::LAYOUT);
        stats.measured += 1;
    }
    let relayout: HashSet<NodeId> = dirty.into_iter().collect();

    // Top-down where boxes changed.
    let root = tree.root();
    let mut queue = vec![(root, window)];
    while let Some((id, region)) = queue.pop() {
        let changed = tree[id].layout.region != region;
        if changed {
            tree[id].layout.region = region;
        }
        if !changed && !relayout.contains(&id) {
            continue;
        }
        stats.placed += 1;
        if !tree[id].kind.is_container() {
            continue;
        }
        queue.extend(systems.set_child_layout_output(tree, id));
        for child in tree.children(id) {
            if tree[child].kind.is_floating() {
                queue.push((child, systems.floating_region(tree, child, window)));
            }
        }
    }

    if stats.measured > 0 {
        debug!(measured = stats.measured, placed = stats.placed, "layout");
    }
    stats
}

/// Post-order list of layout-dirty nodes.
fn collect_layout_dirty(tree: &Tree) -> Vec<NodeId> {
    let root = tree.root();
    if !tree.is_dirty(root, Dirty::LAYOUT) {
        return Vec::new();
    }
    let mut out = Vec::new();
    // (node, children pushed)
    let mut stack = vec![(root, false)];
    while let Some((id, expanded)) = stack.pop() {
        if expanded {
            out.push(id);
            continue;
        }
        stack.push((id, true));
        let children: Vec<NodeId> = tree
            .children(id)
            .filter(|&c| tree.is_dirty(c, Dirty::LAYOUT))
            .collect();
        stack.extend(children.into_iter().rev().map(|c| (c, false)));
    }
    out
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn distribute_is_exact() {
        assert_eq!(distribute(10, &[1, 1, 1]), vec![3, 3, 4]);
        assert_eq!(distribute(7, &[0, 2, 0, 1]), vec![0, 4, 0, 3]);
        assert_eq!(distribute(5, &[0, 0]), vec![0, 0]);
        assert_eq!(distribute(-3, &[1]), vec![0]);
        assert_eq!(distribute(9, &[]), Vec::<i32>::new());
    }

    #[test]
    fn alignment_offsets() {
        assert_eq!(Alignment::Min.offset(10, 4), 0);
        assert_eq!(Alignment::Center.offset(10, 4), 3);
        assert_eq!(Alignment::Max.offset(10, 4), 6);
        assert_eq!(Alignment::Max.offset(3, 4), 0);
    }

    #[test]
    fn length_weights() {
        assert_eq!(Length::Dynamic(3).weight(), 3);
        assert_eq!(Length::Fixed(3).weight(), 0);
        assert_eq!(Length::default(), Length::Wrap);
    }

    #[test]
    fn resolve_length_policies() {
        assert_eq!(resolve_length(Length::Fixed(4), 9, 2, false), 4);
        assert_eq!(resolve_length(Length::Wrap, 9, 2, true), 9);
        assert_eq!(resolve_length(Length::Dynamic(1), 9, 2, false), 9);
        assert_eq!(resolve_length(Length::Dynamic(1), 9, 2, true), 2);
    }

    #[test]
    fn dirty_nodes_are_listed_children_first() {
        use crate::tree::ElementKind;

        let mut tree = Tree::new(ElementKind::Series, 0);
        tree.begin();
        let a = tree.advance(ElementKind::Series, || 1).id;
        tree.descend();
        let b = tree.advance(ElementKind::Text, || 0).id;
        tree.ascend();
        let c = tree.advance(ElementKind::Text, || 1).id;
        tree.finish();
        let root = tree.root();
        assert_eq!(collect_layout_dirty(&tree), vec![b, a, c, root]);

        tree.clean(c, Dirty::LAYOUT);
        assert_eq!(collect_layout_dirty(&tree), vec![b, a, root]);
        tree.clean(root, Dirty::LAYOUT);
        assert_eq!(collect_layout_dirty(&tree), Vec::<NodeId>::new());
    }

    #[test]
    fn insets_add_border() {
        assert_eq!(insets(Spacing::all(1), true), Spacing::all(2));
        assert_eq!(insets(Spacing::ZERO, false), Spacing::ZERO);
    }
}
