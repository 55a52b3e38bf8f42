//! # arbor
//!
//! An immediate-mode GUI toolkit backed by a retained widget tree.
//!
//! Caller code re-declares the whole interface every frame with plain
//! function calls, as in any immediate-mode toolkit. Behind the calls,
//! arbor keeps a persistent tree of nodes, matches each frame's calls
//! against it, and only re-runs the parts whose inputs changed: container
//! bodies that read no modified [`Variable`](data::Variable) are skipped
//! with their whole subtree, and layout only revisits boxes that moved.
//!
//! ## Core Systems
//!
//! - **[`tree`]**: slotmap-backed node arena and per-frame reconciliation cursor
//! - **[`data`]**: variables owned by nodes and the dependency graph between them
//! - **[`element`]**: per-kind element systems, the two-pass layout and paint order
//! - **[`gui`]**: the frame driver and the declaration API
//! - **[`event`]**: input events and key bindings
//! - **[`focus`]**: tab order and keyboard focus
//! - **[`render`]**: cell compositor with diffed output
//! - **[`platform`]**: the backend contract, a crossterm terminal and a headless backend
//! - **[`testing`]**: headless pilot and snapshot helpers
//! - **[`geometry`]**: Offset, Size, Region, Spacing primitives

// Foundation
pub mod error;
pub mod geometry;
pub mod storage;
pub mod text;

// Core systems
pub mod data;
pub mod element;
pub mod tree;

// Events and focus
pub mod event;
pub mod focus;

// Rendering and platforms
pub mod platform;
pub mod render;

// Frame driver
pub mod config;
pub mod gui;

// Headless testing support
pub mod testing;

pub use config::GuiConfig;
pub use error::{GuiError, MeasureError};
pub use gui::{FrameStats, Gui};

/// The names most programs need.
pub mod prelude {
    pub use crate::config::GuiConfig;
    pub use crate::data::{Reads, Variable};
    pub use crate::element::{
        Alignment, Canvas, FloatingConfig, Length, SeriesConfig, TextInputConfig,
    };
    pub use crate::error::GuiError;
    pub use crate::event::{BindingAction, Key, KeyBindingRegistry, Modifiers};
    pub use crate::geometry::{Offset, Size, Spacing};
    pub use crate::gui::{FrameStats, Gui};
    pub use crate::platform::{Backend, HeadlessBackend, TerminalBackend};
    pub use crate::render::{CellStyle, Theme};
}
