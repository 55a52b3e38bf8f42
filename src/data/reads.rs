//! Dependency-recording access on behalf of one node.

use crate::tree::NodeId;

use super::graph::DataGraph;
use super::variable::Variable;

/// Reads variables as `node`, recording each as a dependency.
///
/// Handed to caller code that runs inside a node's evaluation, such as a
/// viewport's paint function.
pub struct Reads<'a> {
    graph: &'a mut DataGraph,
    node: NodeId,
}

impl<'a> Reads<'a> {
    pub fn new(graph: &'a mut DataGraph, node: NodeId) -> Self {
        Self { graph, node }
    }

    /// The node reads are recorded for.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// A copy of the value.
    pub fn get<T: Clone + 'static>(&mut self, var: Variable<T>) -> T {
        self.graph.read(var, self.node).0.clone()
    }

    /// Borrow the value for the duration of `f`.
    pub fn with<T: 'static, R>(&mut self, var: Variable<T>, f: impl FnOnce(&T) -> R) -> R {
        f(self.graph.read(var, self.node).0)
    }

    /// Whether `var` was written since the node's previous evaluation.
    pub fn changed<T: 'static>(&mut self, var: Variable<T>) -> bool {
        self.graph.changed(var, self.node)
    }

    /// Depend on `var` without reading it.
    pub fn depend<T: 'static>(&mut self, var: Variable<T>) {
        self.graph.depend(var, self.node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[test]
    fn reads_record_dependencies() {
        let mut nodes: SlotMap<NodeId, ()> = SlotMap::with_key();
        let owner = nodes.insert(());
        let reader = nodes.insert(());
        let mut graph = DataGraph::new();
        let count = graph.create_variable(owner, 3_u32);
        let label = graph.create_variable(owner, String::from("x"));

        let mut reads = Reads::new(&mut graph, reader);
        assert_eq!(reads.get(count), 3);
        assert_eq!(reads.with(label, |s| s.len()), 1);
        assert!(!reads.changed(count));
        assert_eq!(reads.node(), reader);

        assert_eq!(graph.dependencies(reader).len(), 2);
        assert_eq!(graph.write(count, 4), vec![reader]);
    }
}
