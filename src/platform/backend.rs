//! The contract between the frame driver and a platform.

use std::time::Duration;

use crate::error::GuiError;
use crate::event::InputEvent;
use crate::geometry::Size;
use crate::render::CellUpdate;

/// Event pump, window size and output for one window.
pub trait Backend {
    /// Wait up to `timeout` for input and return everything available.
    fn poll_events(&mut self, timeout: Duration) -> Result<Vec<InputEvent>, GuiError>;

    /// Current window size in cells.
    fn window_size(&self) -> Result<Size, GuiError>;

    /// Bring the window up to date with the changed cells of a frame.
    fn present(&mut self, updates: &[CellUpdate]) -> Result<(), GuiError>;
}
