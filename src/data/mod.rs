//! Caller-owned reactive data.
//!
//! [`Variable<T>`] handles point at cells in the [`DataGraph`], which also
//! tracks which tree nodes read which cells.

pub mod graph;
pub mod reads;
pub mod variable;

pub use graph::DataGraph;
pub use reads::Reads;
pub use variable::{VarId, Variable};
