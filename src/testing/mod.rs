//! Headless testing framework: Pilot, snapshot helpers.
//!
//! Use the [`Pilot`] to drive a [`Gui`](crate::gui::Gui) without a real
//! terminal. Use [`screen_to_string`] and [`tree_to_string`] to capture the
//! drawn screen or the retained tree as plain text for snapshot assertions.

pub mod pilot;
pub mod snapshot;

pub use pilot::Pilot;
pub use snapshot::{screen_to_string, tree_to_string};
