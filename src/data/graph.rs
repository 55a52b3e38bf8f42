//! The data graph: variable cells and node-to-variable dependency edges.
//!
//! Every edge sits on two intrusive doubly linked lists threaded through
//! [`SlotStorage`] indices: the reader list of its variable and the read list
//! of its node. Either end can therefore drop all of its edges in time
//! proportional to the edges it has.
//!
//! Evaluation protocol for a node:
//!
//! 1. [`DataGraph::begin_evaluation`] moves each edge's `modified` flag into
//!    `seen` and marks the edge unconfirmed.
//! 2. Reads during the evaluation confirm (or create) edges and report `seen`.
//! 3. [`DataGraph::end_evaluation`] drops edges that were not confirmed.
//!
//! A write sets `modified` on every edge of the variable, so each reader
//! observes it on exactly one later evaluation, however many frames later
//! that happens.

use std::any::{type_name, Any};
use std::collections::HashMap;
use std::fmt;

use slotmap::{SecondaryMap, SlotMap};
use tracing::trace;

use crate::storage::SlotStorage;
use crate::tree::NodeId;

use super::variable::{VarId, Variable};

struct DataNode {
    value: Box<dyn Any>,
    type_name: &'static str,
    owner: NodeId,
    /// Written since the last [`DataGraph::settle`].
    modified: bool,
    /// Head of the reader edge list.
    readers: Option<usize>,
}

#[derive(Debug, Clone)]
struct DepEdge {
    node: NodeId,
    var: VarId,
    /// Written since the reader's last evaluation began.
    modified: bool,
    /// Value of `modified` when the current evaluation began.
    seen: bool,
    /// Read during the current evaluation.
    confirmed: bool,
    prev_reader: Option<usize>,
    next_reader: Option<usize>,
    prev_read: Option<usize>,
    next_read: Option<usize>,
}

/// Owner of every variable cell and dependency edge.
pub struct DataGraph {
    vars: SlotMap<VarId, DataNode>,
    edges: SlotStorage<DepEdge>,
    index: HashMap<(NodeId, VarId), usize>,
    /// Head of each node's read list.
    reads: SecondaryMap<NodeId, usize>,
    /// Variables declared by each node, in declaration order.
    owned: SecondaryMap<NodeId, Vec<VarId>>,
    written: Vec<VarId>,
}

impl DataGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self {
            vars: SlotMap::with_key(),
            edges: SlotStorage::new(),
            index: HashMap::new(),
            reads: SecondaryMap::new(),
            owned: SecondaryMap::new(),
            written: Vec::new(),
        }
    }

    // -- cells -------------------------------------------------------------

    /// Allocate a new variable owned by `owner`.
    pub fn create_variable<T: 'static>(&mut self, owner: NodeId, initial: T) -> Variable<T> {
        let id = self.insert_cell(owner, initial);
        if let Some(list) = self.owned.get_mut(owner) {
            list.push(id);
        } else {
            self.owned.insert(owner, vec![id]);
        }
        Variable::from_id(id)
    }

    /// The `index`-th variable declared by `owner`, created from `init` the
    /// first time.
    ///
    /// A cell of a different type at that position is destroyed and replaced,
    /// the same way the tree replaces a node whose kind changed.
    pub fn variable_at<T: 'static>(
        &mut self,
        owner: NodeId,
        index: usize,
        init: impl FnOnce() -> T,
    ) -> Variable<T> {
        let existing = self
            .owned
            .get(owner)
            .and_then(|list| list.get(index))
            .copied();
        match existing {
            Some(id) if self.vars.get(id).is_some_and(|cell| cell.value.is::<T>()) => {
                Variable::from_id(id)
            }
            Some(old) => {
                trace!(?owner, index, "variable type changed, replacing cell");
                self.remove_cell(old);
                let id = self.insert_cell(owner, init());
                if let Some(slot) = self.owned.get_mut(owner).and_then(|list| list.get_mut(index)) {
                    *slot = id;
                }
                Variable::from_id(id)
            }
            None => self.create_variable(owner, init()),
        }
    }

    fn insert_cell<T: 'static>(&mut self, owner: NodeId, initial: T) -> VarId {
        self.vars.insert(DataNode {
            value: Box::new(initial),
            type_name: type_name::<T>(),
            owner,
            modified: false,
            readers: None,
        })
    }

    fn cell(&self, id: VarId) -> &DataNode {
        self.vars
            .get(id)
            .unwrap_or_else(|| panic!("variable used after its owning node was destroyed"))
    }

    fn cell_mut(&mut self, id: VarId) -> &mut DataNode {
        self.vars
            .get_mut(id)
            .unwrap_or_else(|| panic!("variable used after its owning node was destroyed"))
    }

    /// Whether the cell behind `var` still exists.
    pub fn is_alive<T: 'static>(&self, var: Variable<T>) -> bool {
        self.vars.contains_key(var.id())
    }

    /// The node that declared `var`.
    pub fn owner<T: 'static>(&self, var: Variable<T>) -> NodeId {
        self.cell(var.id()).owner
    }

    /// Number of live variables.
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Whether no variables exist.
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Number of live dependency edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    // -- reads -------------------------------------------------------------

    /// Borrow the value without recording a dependency.
    ///
    /// # Panics
    ///
    /// Panics on a stale handle or a type mismatch.
    pub fn peek<T: 'static>(&self, var: Variable<T>) -> &T {
        let cell = self.cell(var.id());
        cell.value.downcast_ref::<T>().unwrap_or_else(|| {
            panic!(
                "variable type mismatch: cell holds {}, accessed as {}",
                cell.type_name,
                type_name::<T>()
            )
        })
    }

    /// Borrow the value as read by `node`, recording the dependency.
    ///
    /// Also returns whether the variable was written since `node`'s previous
    /// evaluation began.
    pub fn read<T: 'static>(&mut self, var: Variable<T>, node: NodeId) -> (&T, bool) {
        let seen = self.touch(var.id(), node);
        (self.peek(var), seen)
    }

    /// Whether `var` was written since `node`'s previous evaluation began.
    /// Records the dependency like any other read.
    pub fn changed<T: 'static>(&mut self, var: Variable<T>, node: NodeId) -> bool {
        // Validate the type even though the value is not used.
        let _ = self.peek(var);
        self.touch(var.id(), node)
    }

    /// Record that `node` depends on `var` without reading it.
    pub fn depend<T: 'static>(&mut self, var: Variable<T>, node: NodeId) {
        self.touch(var.id(), node);
    }

    /// Confirm or create the edge `(node, var)`; returns its `seen` flag.
    fn touch(&mut self, var: VarId, node: NodeId) -> bool {
        let head = self.cell(var).readers;
        if let Some(&e) = self.index.get(&(node, var)) {
            let edge = &mut self.edges[e];
            edge.confirmed = true;
            return edge.seen;
        }

        let read_head = self.reads.get(node).copied();
        let e = self.edges.emplace(DepEdge {
            node,
            var,
            modified: false,
            seen: false,
            confirmed: true,
            prev_reader: None,
            next_reader: head,
            prev_read: None,
            next_read: read_head,
        });
        if let Some(h) = head {
            self.edges[h].prev_reader = Some(e);
        }
        self.cell_mut(var).readers = Some(e);
        if let Some(h) = read_head {
            self.edges[h].prev_read = Some(e);
        }
        self.reads.insert(node, e);
        self.index.insert((node, var), e);
        trace!(?node, ?var, "dependency recorded");
        false
    }

    // -- writes ------------------------------------------------------------

    /// Replace the value and flag every reader.
    ///
    /// Returns the readers so the caller can schedule them for re-evaluation.
    pub fn write<T: 'static>(&mut self, var: Variable<T>, value: T) -> Vec<NodeId> {
        *self.value_mut(var) = value;
        self.propagate(var.id())
    }

    /// Mutate the value in place and flag every reader.
    pub fn update<T: 'static>(&mut self, var: Variable<T>, f: impl FnOnce(&mut T)) -> Vec<NodeId> {
        f(self.value_mut(var));
        self.propagate(var.id())
    }

    fn value_mut<T: 'static>(&mut self, var: Variable<T>) -> &mut T {
        let cell = self.cell_mut(var.id());
        let held = cell.type_name;
        cell.value.downcast_mut::<T>().unwrap_or_else(|| {
            panic!(
                "variable type mismatch: cell holds {held}, accessed as {}",
                type_name::<T>()
            )
        })
    }

    fn propagate(&mut self, var: VarId) -> Vec<NodeId> {
        let cell = self.cell_mut(var);
        if !cell.modified {
            cell.modified = true;
            self.written.push(var);
        }
        let mut readers = Vec::new();
        let mut next = self.cell(var).readers;
        while let Some(e) = next {
            let edge = &mut self.edges[e];
            edge.modified = true;
            readers.push(edge.node);
            next = edge.next_reader;
        }
        readers
    }

    /// Whether `var` was written since the last [`settle`](Self::settle).
    pub fn is_modified<T: 'static>(&self, var: Variable<T>) -> bool {
        self.cell(var.id()).modified
    }

    /// Clear every variable's modified flag. Returns whether any was set.
    pub fn settle(&mut self) -> bool {
        let any = !self.written.is_empty();
        for id in self.written.drain(..) {
            if let Some(cell) = self.vars.get_mut(id) {
                cell.modified = false;
            }
        }
        any
    }

    // -- evaluation --------------------------------------------------------

    /// Start re-evaluating `node`: latch pending writes and expect every
    /// edge to be read again.
    pub fn begin_evaluation(&mut self, node: NodeId) {
        let mut next = self.reads.get(node).copied();
        while let Some(e) = next {
            let edge = &mut self.edges[e];
            edge.seen = edge.modified;
            edge.modified = false;
            edge.confirmed = false;
            next = edge.next_read;
        }
    }

    /// Finish re-evaluating `node`: drop edges it no longer reads.
    ///
    /// Returns the number of edges dropped.
    pub fn end_evaluation(&mut self, node: NodeId) -> usize {
        let mut stale = Vec::new();
        let mut next = self.reads.get(node).copied();
        while let Some(e) = next {
            let edge = &self.edges[e];
            if !edge.confirmed {
                stale.push(e);
            }
            next = edge.next_read;
        }
        for &e in &stale {
            self.remove_edge(e);
        }
        stale.len()
    }

    /// Nodes currently depending on `var`.
    pub fn readers<T: 'static>(&self, var: Variable<T>) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut next = self.cell(var.id()).readers;
        while let Some(e) = next {
            out.push(self.edges[e].node);
            next = self.edges[e].next_reader;
        }
        out
    }

    /// Variables `node` currently depends on.
    pub fn dependencies(&self, node: NodeId) -> Vec<VarId> {
        let mut out = Vec::new();
        let mut next = self.reads.get(node).copied();
        while let Some(e) = next {
            out.push(self.edges[e].var);
            next = self.edges[e].next_read;
        }
        out
    }

    // -- removal -----------------------------------------------------------

    /// Release everything tied to a destroyed node: the edges it reads
    /// through and the variables it declared, with their reader edges.
    pub fn remove_node(&mut self, node: NodeId) {
        while let Some(&e) = self.reads.get(node) {
            self.remove_edge(e);
        }
        if let Some(list) = self.owned.remove(node) {
            for id in list {
                self.remove_cell(id);
            }
        }
    }

    fn remove_cell(&mut self, id: VarId) {
        while let Some(e) = self.vars.get(id).and_then(|cell| cell.readers) {
            self.remove_edge(e);
        }
        self.vars.remove(id);
    }

    fn remove_edge(&mut self, e: usize) {
        let edge = self.edges.pop(e);

        match edge.prev_reader {
            Some(p) => self.edges[p].next_reader = edge.next_reader,
            None => {
                if let Some(cell) = self.vars.get_mut(edge.var) {
                    cell.readers = edge.next_reader;
                }
            }
        }
        if let Some(n) = edge.next_reader {
            self.edges[n].prev_reader = edge.prev_reader;
        }

        match edge.prev_read {
            Some(p) => self.edges[p].next_read = edge.next_read,
            None => match edge.next_read {
                Some(n) => {
                    self.reads.insert(edge.node, n);
                }
                None => {
                    self.reads.remove(edge.node);
                }
            },
        }
        if let Some(n) = edge.next_read {
            self.edges[n].prev_read = edge.prev_read;
        }

        self.index.remove(&(edge.node, edge.var));
    }
}

impl Default for DataGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DataGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataGraph")
            .field("variables", &self.vars.len())
            .field("edges", &self.edges.len())
            .finish()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn nodes(n: usize) -> Vec<NodeId> {
        let mut map: SlotMap<NodeId, ()> = SlotMap::with_key();
        (0..n).map(|_| map.insert(())).collect()
    }

    #[test]
    fn reads_record_one_edge_per_pair() {
        let ids = nodes(2);
        let mut g = DataGraph::new();
        let v = g.create_variable(ids[0], 5u32);

        assert_eq!(*g.read(v, ids[1]).0, 5);
        assert_eq!(*g.read(v, ids[1]).0, 5);
        g.depend(v, ids[1]);
        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.readers(v), vec![ids[1]]);
        assert_eq!(g.dependencies(ids[1]), vec![v.id()]);
    }

    #[test]
    fn write_returns_readers() {
        let ids = nodes(3);
        let mut g = DataGraph::new();
        let v = g.create_variable(ids[0], String::new());
        g.read(v, ids[1]);
        g.read(v, ids[2]);

        let mut readers = g.write(v, "x".to_owned());
        readers.sort();
        let mut expected = vec![ids[1], ids[2]];
        expected.sort();
        assert_eq!(readers, expected);
        assert_eq!(g.peek(v), "x");
        assert!(g.is_modified(v));
        assert!(g.settle());
        assert!(!g.is_modified(v));
        assert!(!g.settle());
    }

    #[test]
    fn write_is_seen_exactly_once() {
        let ids = nodes(2);
        let (owner, reader) = (ids[0], ids[1]);
        let mut g = DataGraph::new();
        let v = g.create_variable(owner, 0i32);

        g.begin_evaluation(reader);
        assert!(!g.changed(v, reader));
        g.end_evaluation(reader);

        g.write(v, 1);

        g.begin_evaluation(reader);
        assert!(g.changed(v, reader));
        // Stable within one evaluation.
        assert!(g.read(v, reader).1);
        g.end_evaluation(reader);

        g.begin_evaluation(reader);
        assert!(!g.changed(v, reader));
        g.end_evaluation(reader);
    }

    #[test]
    fn write_survives_frames_without_evaluation() {
        let ids = nodes(2);
        let mut g = DataGraph::new();
        let v = g.create_variable(ids[0], 0u8);
        g.read(v, ids[1]);
        g.write(v, 7);
        g.settle();
        g.settle();

        g.begin_evaluation(ids[1]);
        let (value, seen) = g.read(v, ids[1]);
        assert_eq!((*value, seen), (7, true));
        g.end_evaluation(ids[1]);
    }

    #[test]
    fn write_during_evaluation_is_seen_next_time() {
        let ids = nodes(1);
        let node = ids[0];
        let mut g = DataGraph::new();
        let v = g.create_variable(node, 0u8);

        g.begin_evaluation(node);
        g.read(v, node);
        g.update(v, |n| *n += 1);
        g.end_evaluation(node);

        g.begin_evaluation(node);
        assert!(g.changed(v, node));
        g.end_evaluation(node);
    }

    #[test]
    fn unconfirmed_edges_are_dropped() {
        let ids = nodes(2);
        let mut g = DataGraph::new();
        let a = g.create_variable(ids[0], 1u8);
        let b = g.create_variable(ids[0], 2u8);
        g.read(a, ids[1]);
        g.read(b, ids[1]);

        g.begin_evaluation(ids[1]);
        g.read(b, ids[1]);
        assert_eq!(g.end_evaluation(ids[1]), 1);

        assert!(g.readers(a).is_empty());
        assert_eq!(g.readers(b), vec![ids[1]]);
        assert!(g.write(a, 3).is_empty());
    }

    #[test]
    fn remove_node_releases_cells_and_edges() {
        let ids = nodes(3);
        let (owner, reader, other) = (ids[0], ids[1], ids[2]);
        let mut g = DataGraph::new();
        let v = g.create_variable(owner, 1u8);
        let w = g.create_variable(other, 2u8);
        g.read(v, reader);
        g.read(w, reader);
        g.read(w, owner);
        assert_eq!(g.edge_count(), 3);

        g.remove_node(owner);
        assert!(!g.is_alive(v));
        assert!(g.is_alive(w));
        assert_eq!(g.readers(w), vec![reader]);
        assert_eq!(g.dependencies(reader), vec![w.id()]);
        assert_eq!(g.edge_count(), 1);

        g.remove_node(reader);
        assert_eq!(g.edge_count(), 0);
        assert_eq!(g.len(), 1);
    }

    #[test]
    fn edge_slots_are_reused() {
        let ids = nodes(2);
        let mut g = DataGraph::new();
        let v = g.create_variable(ids[0], 0u8);
        for _ in 0..10 {
            g.read(v, ids[1]);
            g.begin_evaluation(ids[1]);
            g.end_evaluation(ids[1]);
        }
        assert_eq!(g.edges.slot_count(), 1);
        assert_eq!(g.edge_count(), 0);
    }

    #[test]
    fn variable_at_is_positional() {
        let ids = nodes(1);
        let node = ids[0];
        let mut g = DataGraph::new();
        let a = g.variable_at(node, 0, || 1u32);
        let b = g.variable_at(node, 1, || String::from("b"));
        g.write(a, 9);

        let again = g.variable_at(node, 0, || 0u32);
        assert_eq!(again, a);
        assert_eq!(*g.peek(again), 9);
        assert_eq!(g.variable_at(node, 1, String::new), b);

        // A different type at the same position replaces the cell.
        let c = g.variable_at(node, 1, || 3i64);
        assert!(!g.is_alive(b));
        assert_eq!(*g.peek(c), 3);
        assert_eq!(g.len(), 2);
    }

    #[test]
    #[should_panic(expected = "owning node was destroyed")]
    fn stale_handle_panics() {
        let ids = nodes(1);
        let mut g = DataGraph::new();
        let v = g.create_variable(ids[0], 0u8);
        g.remove_node(ids[0]);
        g.peek(v);
    }

    #[test]
    #[should_panic(expected = "variable type mismatch")]
    fn wrong_type_panics() {
        let ids = nodes(1);
        let mut g = DataGraph::new();
        let v = g.create_variable(ids[0], 0u8);
        let forged: Variable<String> = Variable::from_id(v.id());
        g.peek(forged);
    }
}
