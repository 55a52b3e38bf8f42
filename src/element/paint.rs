//! Paint order: the single traversal both drawing and hit-testing follow.
//!
//! The main layer is the tree in depth-first order with floating subtrees
//! cut out. Floating subtrees follow in declaration order, then the overlays
//! (open dropdown lists). Anything later in the order is drawn on top, so
//! hit-testing walks the same order backwards.

use crate::geometry::{Offset, Region};
use crate::render::{Renderer, Theme};
use crate::tree::{NodeId, Tree};

use super::registry::Systems;
use super::system::RenderContext;

/// One step of the paint order. `offset` is the scroll displacement applied
/// to the node's layout region; `clip` is in window coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaintStep {
    /// Draw the node; its children follow.
    Enter { node: NodeId, offset: Offset, clip: Region },
    /// Draw on top of the node's children.
    Leave { node: NodeId, offset: Offset, clip: Region },
    /// Draw the node's overlay.
    Overlay { node: NodeId, offset: Offset, clip: Region },
}

/// Compute the paint order of `tree` inside `window`.
pub fn paint_order(tree: &Tree, systems: &Systems, window: Region) -> Vec<PaintStep> {
    let mut walk = Walk {
        tree,
        systems,
        steps: Vec::new(),
        floating: Vec::new(),
        overlays: Vec::new(),
    };
    walk.visit(tree.root(), Offset::ZERO, window);
    // Floating windows may declare floating windows of their own.
    let mut i = 0;
    while let Some(&node) = walk.floating.get(i) {
        walk.visit(node, Offset::ZERO, window);
        i += 1;
    }
    let mut steps = walk.steps;
    steps.extend(
        walk.overlays
            .into_iter()
            .map(|(node, offset)| PaintStep::Overlay {
                node,
                offset,
                clip: window,
            }),
    );
    steps
}

struct Walk<'a> {
    tree: &'a Tree,
    systems: &'a Systems,
    steps: Vec<PaintStep>,
    floating: Vec<NodeId>,
    overlays: Vec<(NodeId, Offset)>,
}

impl Walk<'_> {
    fn visit(&mut self, node: NodeId, offset: Offset, clip: Region) {
        let (tree, systems) = (self.tree, self.systems);
        self.steps.push(PaintStep::Enter { node, offset, clip });
        if systems.overlay_region(tree, node).is_some() {
            self.overlays.push((node, offset));
        }
        let child_offset = offset + systems.child_offset(tree, node);
        let child_clip = match systems.child_clip(tree, node) {
            Some(own) => own.translate(offset).intersection(clip),
            None => clip,
        };
        for child in tree.children(node) {
            if tree[child].kind.is_floating() {
                self.floating.push(child);
            } else if !child_clip.is_empty() {
                self.visit(child, child_offset, child_clip);
            }
        }
        self.steps.push(PaintStep::Leave { node, offset, clip });
    }
}

/// Draw every step through `renderer`.
pub fn paint(
    steps: &[PaintStep],
    tree: &Tree,
    systems: &Systems,
    renderer: &mut dyn Renderer,
    theme: &Theme,
    focused: Option<NodeId>,
    hovered: Option<NodeId>,
) {
    for step in steps {
        let (node, offset, clip) = match *step {
            PaintStep::Enter { node, offset, clip }
            | PaintStep::Leave { node, offset, clip }
            | PaintStep::Overlay { node, offset, clip } => (node, offset, clip),
        };
        let mut ctx = RenderContext {
            renderer: &mut *renderer,
            theme,
            offset,
            clip,
            focused,
            hovered,
        };
        match step {
            PaintStep::Enter { .. } => systems.render(tree, node, &mut ctx),
            PaintStep::Leave { .. } => systems.render_after(tree, node, &mut ctx),
            PaintStep::Overlay { .. } => systems.render_overlay(tree, node, &mut ctx),
        }
    }
}

/// A node under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub node: NodeId,
    /// Pointer position relative to the node's visible origin.
    pub local: Offset,
}

/// The topmost node whose visible area contains `point`.
pub fn hit_test(steps: &[PaintStep], tree: &Tree, systems: &Systems, point: Offset) -> Option<Hit> {
    steps.iter().rev().find_map(|step| {
        let (node, offset, clip, area) = match *step {
            PaintStep::Enter { node, offset, clip } => {
                (node, offset, clip, tree.get(node)?.layout.region)
            }
            PaintStep::Overlay { node, offset, clip } => {
                (node, offset, clip, systems.overlay_region(tree, node)?)
            }
            PaintStep::Leave { .. } => return None,
        };
        let visible = area.translate(offset).intersection(clip);
        visible.contains(point).then(|| Hit {
            node,
            local: point - (tree[node].layout.region.origin() + offset),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::floating::FloatingConfig;
    use crate::element::layout;
    use crate::element::series::SeriesConfig;
    use crate::element::Length;
    use crate::geometry::Size;
    use crate::render::Compositor;
    use crate::text::CellMetrics;
    use crate::tree::ElementKind;
    use pretty_assertions::assert_eq;

    const WINDOW: Region = Region::new(0, 0, 20, 6);

    struct Scene {
        tree: Tree,
        systems: Systems,
        list: NodeId,
        rows: Vec<NodeId>,
        popup: NodeId,
        popup_button: NodeId,
    }

    /// A scrollable list of five labels and a closed-or-open popup.
    fn scene(popup_open: bool) -> Scene {
        let mut systems = Systems::new(1);
        let root = systems.series.create(SeriesConfig::vertical().fill(1));
        let mut tree = Tree::new(ElementKind::Series, root);
        tree.begin();
        let config = SeriesConfig::vertical().height(Length::Fixed(3)).scrollable();
        let list = tree
            .advance(ElementKind::Series, || systems.series.create(config.clone()))
            .id;
        tree.descend();
        let rows = (0..5)
            .map(|i| {
                let label = format!("row {i}");
                tree.advance(ElementKind::Text, || systems.text.create(&label, None))
                    .id
            })
            .collect();
        tree.ascend();
        let popup_config = FloatingConfig::new().at(10, 1);
        let popup = tree
            .advance(ElementKind::Floating, || {
                systems.floating.create(&popup_config, popup_open)
            })
            .id;
        tree.descend();
        let popup_button = tree
            .advance(ElementKind::Button, || systems.button.create("ok"))
            .id;
        tree.ascend();
        tree.finish();
        layout::run(&mut tree, &mut systems, &CellMetrics, WINDOW);
        Scene {
            tree,
            systems,
            list,
            rows,
            popup,
            popup_button,
        }
    }

    #[test]
    fn floating_subtrees_paint_after_the_main_layer() {
        let s = scene(true);
        let order: Vec<NodeId> = paint_order(&s.tree, &s.systems, WINDOW)
            .into_iter()
            .filter_map(|step| match step {
                PaintStep::Enter { node, .. } => Some(node),
                _ => None,
            })
            .collect();
        let mut expected = vec![s.tree.root(), s.list];
        expected.extend(&s.rows[..]);
        expected.extend([s.popup, s.popup_button]);
        assert_eq!(order, expected);
    }

    #[test]
    fn hit_test_honours_scroll_and_clip() {
        let mut s = scene(false);
        let steps = paint_order(&s.tree, &s.systems, WINDOW);
        let hit = hit_test(&steps, &s.tree, &s.systems, Offset::new(1, 1));
        assert_eq!(hit.map(|h| h.node), Some(s.rows[1]));
        // Row 3 lies below the list's clip.
        let hit = hit_test(&steps, &s.tree, &s.systems, Offset::new(1, 3));
        assert_eq!(hit.map(|h| h.node), Some(s.tree.root()));

        let state = s.tree[s.list].state;
        s.systems.series.scroll_to(state, 2);
        let steps = paint_order(&s.tree, &s.systems, WINDOW);
        let hit = hit_test(&steps, &s.tree, &s.systems, Offset::new(1, 0));
        assert_eq!(hit, Some(Hit { node: s.rows[2], local: Offset::new(1, 0) }));
    }

    #[test]
    fn open_popup_is_on_top() {
        let s = scene(true);
        assert_eq!(s.tree[s.popup].layout.region.origin(), Offset::new(10, 1));
        let steps = paint_order(&s.tree, &s.systems, WINDOW);
        let button = s.tree[s.popup_button].layout.region.origin();
        let hit = hit_test(&steps, &s.tree, &s.systems, button);
        assert_eq!(hit.map(|h| h.node), Some(s.popup_button));
        // The popup border belongs to the popup itself.
        let hit = hit_test(&steps, &s.tree, &s.systems, Offset::new(10, 1));
        assert_eq!(hit.map(|h| h.node), Some(s.popup));
    }

    #[test]
    fn paint_draws_visible_rows_only() {
        let s = scene(false);
        let steps = paint_order(&s.tree, &s.systems, WINDOW);
        let mut screen = Compositor::new(20, 6);
        paint(&steps, &s.tree, &s.systems, &mut screen, &Theme::default(), None, None);
        // The scrollbar takes the column the list keeps beside its rows.
        assert_eq!(screen.row_text(0).trim_end(), "row 0┃");
        assert_eq!(s.tree[s.list].layout.region.width, 6);
        assert_eq!(screen.row_text(2).trim_end(), "row 2");
        assert_eq!(screen.row_text(3).trim_end(), "");
        assert_eq!(s.tree[s.rows[4]].layout.fixed_size, Size::new(5, 1));
    }
}
