//! Tree arena: node storage, sibling links, traversal, invalidation.

use std::ops::{Index, IndexMut};

use slotmap::SlotMap;

use super::cursor::Level;
use super::node::{Dirty, ElementKind, Node, NodeId};

/// A node released by the tree, handed back so its element state and data
/// can be released too.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Removed {
    pub id: NodeId,
    pub kind: ElementKind,
    pub state: usize,
}

/// The persistent widget tree.
///
/// Nodes live in a generational `SlotMap`; children are kept as an intrusive
/// doubly linked list so a node can be unlinked and relinked in O(1) during
/// keyed reconciliation. The root always exists and is never pruned.
#[derive(Debug)]
pub struct Tree {
    pub(crate) nodes: SlotMap<NodeId, Node>,
    pub(crate) root: NodeId,
    pub(crate) frame: u64,
    pub(crate) stack: Vec<Level>,
    pub(crate) pending_key: Option<String>,
}

impl Tree {
    /// Create a tree whose root has the given kind and element state.
    pub fn new(root_kind: ElementKind, root_state: usize) -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Node::new(root_kind, root_state, None));
        Self {
            nodes,
            root,
            frame: 0,
            stack: Vec::new(),
            pending_key: None,
        }
    }

    /// The root node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of the current (or last completed) frame.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Number of live nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: the root cannot be removed.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether `id` refers to a live node.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Checked access.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Checked mutable access.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    /// Element kind of a node.
    pub fn kind(&self, id: NodeId) -> ElementKind {
        self[id].kind
    }

    /// Element state index of a node.
    pub fn state(&self, id: NodeId) -> usize {
        self[id].state
    }

    /// Parent of a node, `None` for the root.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self[id].parent
    }

    /// Children of `id` in declaration order.
    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            tree: self,
            next: self[id].first_child,
        }
    }

    /// Number of children of `id`.
    pub fn child_count(&self, id: NodeId) -> usize {
        self.children(id).count()
    }

    /// Ancestors of `id`, nearest first. Does not include `id`.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = self[id].parent;
        while let Some(p) = current {
            out.push(p);
            current = self[p].parent;
        }
        out
    }

    /// Whether `ancestor` is `id` or one of its ancestors.
    pub fn is_within(&self, id: NodeId, ancestor: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(n) = current {
            if n == ancestor {
                return true;
            }
            current = self.nodes.get(n).and_then(|node| node.parent);
        }
        false
    }

    /// Pre-order depth-first traversal starting from `start`.
    pub fn walk_depth_first(&self, start: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            out.push(id);
            let mark = stack.len();
            stack.extend(self.children(id));
            stack[mark..].reverse();
        }
        out
    }

    /// Post-order traversal starting from `start`: children before parents.
    pub fn walk_post_order(&self, start: NodeId) -> Vec<NodeId> {
        let mut out = self.walk_depth_first_reversed_children(start);
        out.reverse();
        out
    }

    fn walk_depth_first_reversed_children(&self, start: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id));
        }
        out
    }

    // -- invalidation ------------------------------------------------------

    /// Flag `id` for re-evaluation and every ancestor as having a dirty
    /// descendant, so containers on the path do not skip their bodies.
    pub fn mark_dirty(&mut self, id: NodeId) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        node.dirty |= Dirty::SELF;
        let mut current = node.parent;
        while let Some(p) = current {
            let parent = &mut self.nodes[p];
            parent.dirty |= Dirty::CHILD;
            current = parent.parent;
        }
    }

    /// Flag `id` and its ancestors for layout input recomputation.
    pub fn mark_layout(&mut self, id: NodeId) {
        let mut current = Some(id);
        while let Some(n) = current {
            let Some(node) = self.nodes.get_mut(n) else {
                return;
            };
            // Ancestors of a layout-dirty node are already layout-dirty.
            if node.dirty.contains(Dirty::LAYOUT) && n != id {
                return;
            }
            node.dirty |= Dirty::LAYOUT;
            current = node.parent;
        }
    }

    /// Whether `id` carries any of `flags`.
    pub fn is_dirty(&self, id: NodeId, flags: Dirty) -> bool {
        self[id].dirty.intersects(flags)
    }

    /// Clear `flags` on `id` only.
    pub fn clean(&mut self, id: NodeId, flags: Dirty) {
        self[id].dirty.remove(flags);
    }

    // -- structure ----------------------------------------------------------

    /// Detach `id` from its parent and siblings. The subtree stays intact.
    pub(crate) fn unlink(&mut self, id: NodeId) {
        let (parent, prev, next) = {
            let node = &self.nodes[id];
            (node.parent, node.prev, node.next)
        };
        match prev {
            Some(p) => self.nodes[p].next = next,
            None => {
                if let Some(parent) = parent {
                    self.nodes[parent].first_child = next;
                }
            }
        }
        match next {
            Some(n) => self.nodes[n].prev = prev,
            None => {
                if let Some(parent) = parent {
                    self.nodes[parent].last_child = prev;
                }
            }
        }
        let node = &mut self.nodes[id];
        node.parent = None;
        node.prev = None;
        node.next = None;
    }

    /// Link a detached node under `parent`, right after `after`, or first when
    /// `after` is `None`.
    pub(crate) fn link_after(&mut self, parent: NodeId, after: Option<NodeId>, id: NodeId) {
        let next = match after {
            Some(a) => self.nodes[a].next,
            None => self.nodes[parent].first_child,
        };
        {
            let node = &mut self.nodes[id];
            node.parent = Some(parent);
            node.prev = after;
            node.next = next;
        }
        match after {
            Some(a) => self.nodes[a].next = Some(id),
            None => self.nodes[parent].first_child = Some(id),
        }
        match next {
            Some(n) => self.nodes[n].prev = Some(id),
            None => self.nodes[parent].last_child = Some(id),
        }
    }

    /// Remove `id` and all its descendants.
    ///
    /// Returns every removed node, children before parents.
    ///
    /// # Panics
    ///
    /// Panics when asked to remove the root.
    pub fn remove_subtree(&mut self, id: NodeId) -> Vec<Removed> {
        assert!(id != self.root, "the root node cannot be removed");
        if !self.nodes.contains_key(id) {
            return Vec::new();
        }
        if let Some(parent) = self.nodes[id].parent {
            self.mark_layout(parent);
        }
        self.unlink(id);
        let order = self.walk_post_order(id);
        let mut removed = Vec::with_capacity(order.len());
        for n in order {
            if let Some(node) = self.nodes.remove(n) {
                removed.push(Removed {
                    id: n,
                    kind: node.kind,
                    state: node.state,
                });
            }
        }
        removed
    }

    /// Remove every child of `parent` following `after` (every child when
    /// `after` is `None`).
    pub(crate) fn prune_after(&mut self, parent: NodeId, after: Option<NodeId>) -> Vec<Removed> {
        let mut removed = Vec::new();
        let mut next = match after {
            Some(a) => self.nodes[a].next,
            None => self.nodes[parent].first_child,
        };
        while let Some(n) = next {
            next = self.nodes[n].next;
            removed.extend(self.remove_subtree(n));
        }
        removed
    }
}

impl Index<NodeId> for Tree {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        self.nodes
            .get(id)
            .unwrap_or_else(|| panic!("node {id:?} is not in the tree"))
    }
}

impl IndexMut<NodeId> for Tree {
    fn index_mut(&mut self, id: NodeId) -> &mut Node {
        self.nodes
            .get_mut(id)
            .unwrap_or_else(|| panic!("node {id:?} is not in the tree"))
    }
}

/// Iterator over the children of a node.
pub struct Children<'a> {
    tree: &'a Tree,
    next: Option<NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.next?;
        self.next = self.tree.nodes[id].next;
        Some(id)
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// ```text
    ///       root
    ///      /    \
    ///    a        b
    ///   / \
    ///  c   d
    /// ```
    fn add(tree: &mut Tree, parent: NodeId, kind: ElementKind, state: usize) -> NodeId {
        let id = tree.nodes.insert(Node::new(kind, state, None));
        let last = tree[parent].last_child;
        tree.link_after(parent, last, id);
        id
    }

    fn sample() -> (Tree, [NodeId; 4]) {
        let mut tree = Tree::new(ElementKind::Series, 0);
        let root = tree.root();
        let a = add(&mut tree, root, ElementKind::Series, 1);
        let b = add(&mut tree, root, ElementKind::Text, 0);
        let c = add(&mut tree, a, ElementKind::Text, 1);
        let d = add(&mut tree, a, ElementKind::Button, 0);
        (tree, [a, b, c, d])
    }

    #[test]
    fn children_in_order() {
        let (tree, [a, b, c, d]) = sample();
        assert_eq!(tree.children(tree.root()).collect::<Vec<_>>(), vec![a, b]);
        assert_eq!(tree.children(a).collect::<Vec<_>>(), vec![c, d]);
        assert_eq!(tree.child_count(b), 0);
        assert_eq!(tree.parent(c), Some(a));
        assert_eq!(tree[c].next_sibling(), Some(d));
        assert_eq!(tree[d].prev_sibling(), Some(c));
        assert_eq!(tree[a].next_sibling(), Some(b));
        assert_eq!(tree[a].prev_sibling(), None);
        assert_eq!(tree.len(), 5);
    }

    #[test]
    fn walks() {
        let (tree, [a, b, c, d]) = sample();
        let root = tree.root();
        assert_eq!(tree.walk_depth_first(root), vec![root, a, c, d, b]);
        assert_eq!(tree.walk_post_order(root), vec![c, d, a, b, root]);
        assert_eq!(tree.ancestors(d), vec![a, root]);
        assert!(tree.is_within(d, a));
        assert!(!tree.is_within(b, a));
    }

    #[test]
    fn unlink_and_relink_middle() {
        let (mut tree, [a, _b, c, d]) = sample();
        tree.unlink(c);
        assert_eq!(tree.children(a).collect::<Vec<_>>(), vec![d]);
        tree.link_after(a, Some(d), c);
        assert_eq!(tree.children(a).collect::<Vec<_>>(), vec![d, c]);
        assert_eq!(tree[a].last_child, Some(c));
        assert_eq!(tree[c].prev, Some(d));
    }

    #[test]
    fn remove_subtree_reports_children_first() {
        let (mut tree, [a, b, c, d]) = sample();
        let removed: Vec<NodeId> = tree.remove_subtree(a).iter().map(|r| r.id).collect();
        assert_eq!(removed, vec![c, d, a]);
        assert!(!tree.contains(c));
        assert_eq!(tree.children(tree.root()).collect::<Vec<_>>(), vec![b]);
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn prune_after_keeps_prefix() {
        let (mut tree, [a, b, _c, _d]) = sample();
        let root = tree.root();
        let removed = tree.prune_after(root, Some(a));
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].id, b);
        assert_eq!(removed[0].kind, ElementKind::Text);
        assert_eq!(tree.children(root).collect::<Vec<_>>(), vec![a]);
    }

    #[test]
    #[should_panic(expected = "root node cannot be removed")]
    fn removing_root_panics() {
        let (mut tree, _) = sample();
        let root = tree.root();
        tree.remove_subtree(root);
    }

    #[test]
    fn mark_dirty_flags_ancestors() {
        let (mut tree, [a, b, c, _d]) = sample();
        let root = tree.root();
        for id in tree.walk_depth_first(root) {
            tree.clean(id, Dirty::all());
        }
        tree.mark_dirty(c);
        assert!(tree.is_dirty(c, Dirty::SELF));
        assert!(tree.is_dirty(a, Dirty::CHILD));
        assert!(!tree.is_dirty(a, Dirty::SELF));
        assert!(tree.is_dirty(root, Dirty::CHILD));
        assert!(!tree.is_dirty(b, Dirty::all()));
    }

    #[test]
    fn mark_layout_flags_ancestors() {
        let (mut tree, [a, b, c, _d]) = sample();
        let root = tree.root();
        for id in tree.walk_depth_first(root) {
            tree.clean(id, Dirty::all());
        }
        tree.mark_layout(c);
        assert!(tree.is_dirty(c, Dirty::LAYOUT));
        assert!(tree.is_dirty(a, Dirty::LAYOUT));
        assert!(tree.is_dirty(root, Dirty::LAYOUT));
        assert!(!tree.is_dirty(b, Dirty::LAYOUT));
    }

    #[test]
    fn stale_id_does_not_resolve() {
        let (mut tree, [_a, b, _c, _d]) = sample();
        tree.remove_subtree(b);
        let fresh = tree.nodes.insert(Node::new(ElementKind::Text, 0, None));
        assert!(tree.get(b).is_none());
        assert!(tree.get(fresh).is_some());
    }
}
