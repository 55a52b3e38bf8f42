//! Rendering collaborator: cell styles, draw primitives, compositor.

pub mod compositor;
pub mod primitive;
pub mod style;

pub use compositor::{CellUpdate, Compositor};
pub use primitive::{BorderGlyphs, BoxPrimitive, Renderer};
pub use style::{CellStyle, StyledCell, Theme};
