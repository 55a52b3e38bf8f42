//! The construction cursor: matching one frame's calls against the tree.
//!
//! Each open container is a [`Level`] on the cursor stack. Within a level,
//! the children visited so far this frame are always the prefix of the
//! parent's child list ending at `last`; everything after `last` is still
//! unclaimed. [`Tree::advance`] claims the next node (reusing, relinking or
//! creating it) and [`Tree::ascend`] prunes whatever stayed unclaimed.

use tracing::{debug, trace};

use super::node::{ElementKind, Node, NodeId};
use super::tree::{Removed, Tree};

/// One open container on the cursor stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Level {
    pub(crate) parent: NodeId,
    pub(crate) last: Option<NodeId>,
}

/// Outcome of [`Tree::advance`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    /// The node now at the cursor.
    pub id: NodeId,
    /// Whether the node was created by this call.
    pub created: bool,
    /// Whether an existing keyed node was moved to this position.
    pub moved: bool,
    /// Nodes discarded because a mismatched node occupied the position.
    pub removed: Vec<Removed>,
}

impl Tree {
    /// Start a new frame: reset the cursor to the root.
    pub fn begin(&mut self) {
        self.frame += 1;
        self.stack.clear();
        self.stack.push(Level {
            parent: self.root,
            last: None,
        });
        self.pending_key = None;
        let frame = self.frame;
        self.nodes[self.root].visited = frame;
    }

    /// Key the next [`advance`](Self::advance) call.
    pub fn set_key(&mut self, key: impl Into<String>) {
        assert!(!self.stack.is_empty(), "key set outside of a frame");
        self.pending_key = Some(key.into());
    }

    fn assert_no_pending_key(&self) {
        if let Some(key) = &self.pending_key {
            panic!("key set with no declaration after it: {key:?}");
        }
    }

    /// Move the cursor to the next sibling position and make sure a node of
    /// `kind` lives there.
    ///
    /// Unkeyed calls match positionally: an unkeyed node of the same kind is
    /// reused, one of another kind is discarded with its subtree, and a keyed
    /// node is left for a later keyed call. Keyed calls search the unclaimed
    /// siblings for the same key and kind and move the match into place.
    /// When nothing matches, a node is created with the state index returned
    /// by `init`.
    ///
    /// # Panics
    ///
    /// Panics when called outside of a frame.
    pub fn advance(&mut self, kind: ElementKind, init: impl FnOnce() -> usize) -> Reconciled {
        let key = self.pending_key.take();
        let level = *self
            .stack
            .last()
            .unwrap_or_else(|| panic!("declarative call outside of a frame"));
        let expected = match level.last {
            Some(last) => self.nodes[last].next,
            None => self.nodes[level.parent].first_child,
        };

        let mut removed = Vec::new();
        let found = match key.as_deref() {
            Some(key) => self.find_keyed(expected, kind, key),
            None => match expected {
                Some(e) if self.nodes[e].key.is_none() => {
                    if self.nodes[e].kind == kind {
                        Some(e)
                    } else {
                        trace!(old = ?self.nodes[e].kind, new = ?kind, "kind mismatch, replacing subtree");
                        removed = self.remove_subtree(e);
                        None
                    }
                }
                _ => None,
            },
        };

        let (id, created, moved) = match found {
            Some(id) => {
                let moved = Some(id) != expected;
                if moved {
                    trace!(?id, key = ?key, "relinking keyed node");
                    self.unlink(id);
                    self.link_after(level.parent, level.last, id);
                    self.mark_layout(level.parent);
                }
                (id, false, moved)
            }
            None => {
                let state = init();
                let id = self.nodes.insert(Node::new(kind, state, key));
                self.link_after(level.parent, level.last, id);
                self.mark_layout(id);
                trace!(?id, ?kind, "created node");
                (id, true, false)
            }
        };

        self.nodes[id].visited = self.frame;
        if let Some(level) = self.stack.last_mut() {
            level.last = Some(id);
        }
        Reconciled {
            id,
            created,
            moved,
            removed,
        }
    }

    fn find_keyed(&self, from: Option<NodeId>, kind: ElementKind, key: &str) -> Option<NodeId> {
        let mut current = from;
        while let Some(n) = current {
            let node = &self.nodes[n];
            if node.matches(kind, Some(key)) {
                return Some(n);
            }
            current = node.next;
        }
        None
    }

    /// Open the node at the cursor as a container.
    ///
    /// Returns whether it already has children from earlier frames.
    ///
    /// # Panics
    ///
    /// Panics when there is no node at the cursor.
    pub fn descend(&mut self) -> bool {
        let id = self.current();
        self.stack.push(Level {
            parent: id,
            last: None,
        });
        self.nodes[id].first_child.is_some()
    }

    /// Close the innermost container, pruning every child not claimed since
    /// the matching [`descend`](Self::descend).
    ///
    /// # Panics
    ///
    /// Panics when no container is open or a key was set with no
    /// declaration after it.
    pub fn ascend(&mut self) -> Vec<Removed> {
        assert!(
            self.stack.len() > 1,
            "unbalanced container nesting: close without a matching open"
        );
        self.assert_no_pending_key();
        let Some(level) = self.stack.pop() else {
            return Vec::new();
        };
        let removed = self.prune_after(level.parent, level.last);
        if !removed.is_empty() {
            debug!(parent = ?level.parent, count = removed.len(), "pruned unvisited children");
        }
        removed
    }

    /// Close the root level at the end of a frame, pruning unvisited root
    /// children.
    ///
    /// # Panics
    ///
    /// Panics when containers are still open, no frame was begun, or a key
    /// was set with no declaration after it.
    pub fn finish(&mut self) -> Vec<Removed> {
        match self.stack.len() {
            1 => {}
            0 => panic!("frame finished without being begun"),
            n => panic!("unbalanced container nesting: {} container(s) left open", n - 1),
        }
        self.assert_no_pending_key();
        let Some(level) = self.stack.pop() else {
            return Vec::new();
        };
        let removed = self.prune_after(level.parent, level.last);
        if !removed.is_empty() {
            debug!(count = removed.len(), "pruned unvisited root children");
        }
        removed
    }

    /// The node at the cursor: the one claimed by the latest `advance`.
    ///
    /// # Panics
    ///
    /// Panics when nothing was claimed yet in the current container.
    pub fn current(&self) -> NodeId {
        self.try_current()
            .unwrap_or_else(|| panic!("no node at the cursor"))
    }

    /// The node at the cursor, if any.
    pub fn try_current(&self) -> Option<NodeId> {
        self.stack.last().and_then(|level| level.last)
    }

    /// The innermost open container.
    ///
    /// # Panics
    ///
    /// Panics outside of a frame.
    pub fn open_container(&self) -> NodeId {
        self.stack
            .last()
            .map(|level| level.parent)
            .unwrap_or_else(|| panic!("no container is open outside of a frame"))
    }

    /// Number of open containers, the root included.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    use ElementKind::{Button, Series, Text, TextInput};

    /// Hands out increasing state indices so tests can tell reuse from creation.
    struct States(usize);

    impl States {
        fn next(&mut self) -> usize {
            self.0 += 1;
            self.0
        }
    }

    fn leaf(tree: &mut Tree, states: &mut States, kind: ElementKind, key: Option<&str>) -> Reconciled {
        if let Some(key) = key {
            tree.set_key(key);
        }
        tree.advance(kind, || states.next())
    }

    fn root_children(tree: &Tree) -> Vec<NodeId> {
        tree.children(tree.root()).collect()
    }

    #[test]
    fn identical_frames_reuse_every_node() {
        let mut tree = Tree::new(Series, 0);
        let mut states = States(0);

        tree.begin();
        let a = leaf(&mut tree, &mut states, Text, None);
        let b = leaf(&mut tree, &mut states, Button, None);
        assert!(a.created && b.created);
        assert!(tree.finish().is_empty());

        tree.begin();
        let a2 = leaf(&mut tree, &mut states, Text, None);
        let b2 = leaf(&mut tree, &mut states, Button, None);
        assert!(!a2.created && !b2.created);
        assert_eq!((a2.id, b2.id), (a.id, b.id));
        assert!(tree.finish().is_empty());
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn kind_mismatch_replaces_node() {
        let mut tree = Tree::new(Series, 0);
        let mut states = States(0);

        tree.begin();
        let old = leaf(&mut tree, &mut states, Text, None);
        tree.finish();

        tree.begin();
        let new = leaf(&mut tree, &mut states, Button, None);
        tree.finish();

        assert!(new.created);
        assert_eq!(new.removed.len(), 1);
        assert_eq!(new.removed[0].id, old.id);
        assert_eq!(new.removed[0].kind, Text);
        assert!(!tree.contains(old.id));
        assert_eq!(root_children(&tree), vec![new.id]);
    }

    #[test]
    fn keyed_reorder_keeps_identity() {
        let mut tree = Tree::new(Series, 0);
        let mut states = States(0);

        tree.begin();
        let ids: Vec<(NodeId, usize)> = ["a", "b", "c"]
            .into_iter()
            .map(|k| {
                let r = leaf(&mut tree, &mut states, TextInput, Some(k));
                (r.id, tree.state(r.id))
            })
            .collect();
        tree.finish();

        tree.begin();
        let reordered: Vec<Reconciled> = ["c", "a", "b"]
            .into_iter()
            .map(|k| leaf(&mut tree, &mut states, TextInput, Some(k)))
            .collect();
        assert!(tree.finish().is_empty());

        assert!(reordered.iter().all(|r| !r.created));
        assert_eq!(
            root_children(&tree),
            vec![ids[2].0, ids[0].0, ids[1].0]
        );
        assert_eq!(tree.state(ids[2].0), ids[2].1);
        assert_eq!(tree[ids[0].0].key.as_deref(), Some("a"));
    }

    #[test]
    fn keyed_removal_prunes_only_missing_key() {
        let mut tree = Tree::new(Series, 0);
        let mut states = States(0);

        tree.begin();
        let a = leaf(&mut tree, &mut states, Series, Some("a")).id;
        let b = leaf(&mut tree, &mut states, Series, Some("b")).id;
        let c = leaf(&mut tree, &mut states, Series, Some("c")).id;
        tree.finish();

        tree.begin();
        leaf(&mut tree, &mut states, Series, Some("a"));
        leaf(&mut tree, &mut states, Series, Some("c"));
        let removed = tree.finish();

        assert_eq!(removed.iter().map(|r| r.id).collect::<Vec<_>>(), vec![b]);
        assert_eq!(root_children(&tree), vec![a, c]);
    }

    #[test]
    fn unkeyed_call_does_not_claim_keyed_node() {
        let mut tree = Tree::new(Series, 0);
        let mut states = States(0);

        tree.begin();
        let keyed = leaf(&mut tree, &mut states, Text, Some("k")).id;
        tree.finish();

        tree.begin();
        let plain = leaf(&mut tree, &mut states, Text, None);
        let again = leaf(&mut tree, &mut states, Text, Some("k"));
        tree.finish();

        assert!(plain.created);
        assert!(!again.created);
        assert_eq!(again.id, keyed);
        assert_eq!(root_children(&tree), vec![plain.id, keyed]);
    }

    #[test]
    fn duplicate_key_creates_second_node() {
        let mut tree = Tree::new(Series, 0);
        let mut states = States(0);

        tree.begin();
        let first = leaf(&mut tree, &mut states, Text, Some("dup"));
        let second = leaf(&mut tree, &mut states, Text, Some("dup"));
        tree.finish();

        assert!(first.created && second.created);
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn nested_containers_prune_on_ascend() {
        let mut tree = Tree::new(Series, 0);
        let mut states = States(0);

        tree.begin();
        let list = leaf(&mut tree, &mut states, Series, None).id;
        assert!(!tree.descend());
        let x = leaf(&mut tree, &mut states, Text, None).id;
        let y = leaf(&mut tree, &mut states, Text, None).id;
        assert!(tree.ascend().is_empty());
        tree.finish();

        tree.begin();
        leaf(&mut tree, &mut states, Series, None);
        assert!(tree.descend());
        assert_eq!(tree.open_container(), list);
        leaf(&mut tree, &mut states, Text, None);
        let removed = tree.ascend();
        tree.finish();

        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].id, y);
        assert_eq!(tree.children(list).collect::<Vec<_>>(), vec![x]);
    }

    #[test]
    fn skipped_container_keeps_children() {
        let mut tree = Tree::new(Series, 0);
        let mut states = States(0);

        tree.begin();
        let list = leaf(&mut tree, &mut states, Series, None).id;
        tree.descend();
        leaf(&mut tree, &mut states, Text, None);
        tree.ascend();
        tree.finish();

        tree.begin();
        leaf(&mut tree, &mut states, Series, None);
        tree.finish();

        assert_eq!(tree.child_count(list), 1);
    }

    #[test]
    fn empty_frame_prunes_everything() {
        let mut tree = Tree::new(Series, 0);
        let mut states = States(0);

        tree.begin();
        leaf(&mut tree, &mut states, Series, None);
        tree.descend();
        leaf(&mut tree, &mut states, Text, None);
        tree.ascend();
        tree.finish();

        tree.begin();
        let removed = tree.finish();
        assert_eq!(removed.len(), 2);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn created_node_uses_init_state() {
        let mut tree = Tree::new(Series, 0);
        tree.begin();
        let r = tree.advance(Text, || 42);
        assert_eq!(tree.state(r.id), 42);
        assert_eq!(tree.current(), r.id);
        assert_eq!(tree[r.id].visited, tree.frame());
        tree.finish();
    }

    #[test]
    #[should_panic(expected = "no node at the cursor")]
    fn current_without_node_panics() {
        let mut tree = Tree::new(Series, 0);
        tree.begin();
        tree.current();
    }

    #[test]
    #[should_panic(expected = "unbalanced container nesting")]
    fn ascend_at_root_panics() {
        let mut tree = Tree::new(Series, 0);
        tree.begin();
        tree.ascend();
    }

    #[test]
    #[should_panic(expected = "left open")]
    fn finish_with_open_container_panics() {
        let mut tree = Tree::new(Series, 0);
        tree.begin();
        tree.advance(Series, || 1);
        tree.descend();
        tree.finish();
    }

    #[test]
    #[should_panic(expected = "key set with no declaration after it")]
    fn key_left_before_ascend_panics() {
        let mut tree = Tree::new(Series, 0);
        tree.begin();
        tree.advance(Series, || 1);
        tree.descend();
        tree.advance(Text, || 2);
        tree.set_key("stale");
        tree.ascend();
    }

    #[test]
    #[should_panic(expected = "key set with no declaration after it")]
    fn key_left_before_finish_panics() {
        let mut tree = Tree::new(Series, 0);
        tree.begin();
        tree.set_key("stale");
        tree.finish();
    }

    #[test]
    #[should_panic(expected = "outside of a frame")]
    fn advance_outside_frame_panics() {
        let mut tree = Tree::new(Series, 0);
        tree.advance(Text, || 1);
    }
}
