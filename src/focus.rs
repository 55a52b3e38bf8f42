//! Keyboard focus: the tab order and the focused node.

use crate::element::Systems;
use crate::tree::{NodeId, Tree};

/// Focusable nodes in depth-first order and the one holding focus.
///
/// The chain is rebuilt whenever the tree's structure changes. A focused node
/// that survives the rebuild keeps focus; one that was pruned loses it.
#[derive(Debug, Default)]
pub struct FocusChain {
    nodes: Vec<NodeId>,
    focused: Option<NodeId>,
}

impl FocusChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recollect the focusable nodes of `tree`.
    ///
    /// Returns the node that lost focus because it no longer exists or is no
    /// longer focusable.
    pub fn rebuild(&mut self, tree: &Tree, systems: &Systems) -> Option<NodeId> {
        self.nodes = tree
            .walk_depth_first(tree.root())
            .into_iter()
            .filter(|&id| systems.focusable(tree, id))
            .collect();
        match self.focused {
            Some(id) if !self.nodes.contains(&id) => self.focused.take(),
            _ => None,
        }
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    /// Focus `id` if it is in the chain. Returns whether it is.
    pub fn focus(&mut self, id: NodeId) -> bool {
        if self.nodes.contains(&id) {
            self.focused = Some(id);
            true
        } else {
            false
        }
    }

    /// The node after the focused one, wrapping; the first when none is.
    pub fn next(&self) -> Option<NodeId> {
        let index = match self.position() {
            Some(i) => (i + 1) % self.nodes.len(),
            None => 0,
        };
        self.nodes.get(index).copied()
    }

    /// The node before the focused one, wrapping; the last when none is.
    pub fn previous(&self) -> Option<NodeId> {
        let index = match self.position() {
            Some(0) | None => self.nodes.len().checked_sub(1)?,
            Some(i) => i - 1,
        };
        self.nodes.get(index).copied()
    }

    /// Drop focus. Returns the node that had it.
    pub fn clear(&mut self) -> Option<NodeId> {
        self.focused.take()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn position(&self) -> Option<usize> {
        let focused = self.focused?;
        self.nodes.iter().position(|&n| n == focused)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::ElementKind;

    fn setup() -> (Tree, Systems, Vec<NodeId>) {
        let mut systems = Systems::new(1);
        let root = systems.series.create(Default::default());
        let mut tree = Tree::new(ElementKind::Series, root);
        tree.begin();
        let a = tree
            .advance(ElementKind::Button, || systems.button.create("a"))
            .id;
        tree.advance(ElementKind::Text, || systems.text.create("label", None));
        let b = tree
            .advance(ElementKind::Checkbox, || systems.checkbox.create("b", false))
            .id;
        tree.finish();
        (tree, systems, vec![a, b])
    }

    #[test]
    fn chain_skips_unfocusable_nodes() {
        let (tree, systems, ids) = setup();
        let mut chain = FocusChain::new();
        chain.rebuild(&tree, &systems);
        assert_eq!(chain.len(), 2);
        assert_eq!(chain.next(), Some(ids[0]));
        assert_eq!(chain.previous(), Some(ids[1]));
    }

    #[test]
    fn traversal_wraps() {
        let (tree, systems, ids) = setup();
        let mut chain = FocusChain::new();
        chain.rebuild(&tree, &systems);
        assert!(chain.focus(ids[1]));
        assert_eq!(chain.next(), Some(ids[0]));
        assert!(chain.focus(ids[0]));
        assert_eq!(chain.previous(), Some(ids[1]));
        assert_eq!(chain.clear(), Some(ids[0]));
        assert_eq!(chain.focused(), None);
    }

    #[test]
    fn pruned_focus_is_lost() {
        let (mut tree, systems, ids) = setup();
        let mut chain = FocusChain::new();
        chain.rebuild(&tree, &systems);
        chain.focus(ids[1]);
        tree.remove_subtree(ids[1]);
        assert_eq!(chain.rebuild(&tree, &systems), Some(ids[1]));
        assert_eq!(chain.focused(), None);
        assert!(!chain.focus(ids[1]));
    }

    #[test]
    fn empty_chain() {
        let chain = FocusChain::new();
        assert!(chain.is_empty());
        assert_eq!(chain.next(), None);
        assert_eq!(chain.previous(), None);
    }
}
