//! Element systems: per-kind state, layout, painting and input handling.
//!
//! Every [`ElementKind`](crate::tree::ElementKind) has one system implementing
//! [`ElementSystem`]. The [`Systems`] registry dispatches uniform operations
//! on a node's kind; the frame driver calls kind-specific `create`/`update`
//! methods directly on the registry's fields.

pub mod button;
pub mod checkbox;
pub mod dropdown;
pub mod floating;
pub mod layout;
pub mod optional;
pub mod paint;
pub mod registry;
pub mod series;
pub mod system;
pub mod text;
pub mod text_box;
pub mod text_input;
pub mod viewport;

pub use floating::FloatingConfig;
pub use layout::{Alignment, DynamicWeight, Length, LayoutStats};
pub use paint::{Hit, PaintStep};
pub use registry::Systems;
pub use series::SeriesConfig;
pub use system::{ElementSystem, EventOutcome, RenderContext};
pub use text_input::{EditBuffer, TextInputConfig};
pub use viewport::Canvas;
