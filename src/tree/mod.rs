//! The retained declarative tree.
//!
//! - [`node`]: `NodeId`, `ElementKind`, dirty flags and per-node layout data
//! - [`tree`]: the slotmap arena with intrusive sibling lists
//! - [`cursor`]: per-frame reconciliation of declarative calls

pub mod cursor;
pub mod node;
#[allow(clippy::module_inception)]
pub mod tree;

pub use cursor::Reconciled;
pub use node::{Dirty, ElementKind, Node, NodeId, NodeLayout};
pub use tree::{Children, Removed, Tree};
