//! A backend without a terminal: scripted input, counted output.

use std::collections::VecDeque;
use std::time::Duration;

use crate::error::GuiError;
use crate::event::InputEvent;
use crate::geometry::Size;
use crate::render::CellUpdate;

use super::backend::Backend;

/// Backend for tests and tooling.
///
/// Events pushed with [`push`](Self::push) are delivered by the next poll.
/// Polling never waits.
#[derive(Debug, Clone)]
pub struct HeadlessBackend {
    size: Size,
    queue: VecDeque<InputEvent>,
    /// Frames presented so far.
    presented: usize,
    /// Cells sent by the latest present.
    last_updates: usize,
    failure: Option<String>,
}

impl HeadlessBackend {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            size: Size::new(i32::from(width), i32::from(height)),
            queue: VecDeque::new(),
            presented: 0,
            last_updates: 0,
            failure: None,
        }
    }

    /// Queue an event for the next poll.
    pub fn push(&mut self, event: InputEvent) {
        self.queue.push_back(event);
    }

    /// Change the window size and queue the matching resize event.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.size = Size::new(i32::from(width), i32::from(height));
        self.push(InputEvent::Resize { width, height });
    }

    /// Make the next poll fail with a backend error.
    pub fn fail_next_poll(&mut self, message: impl Into<String>) {
        self.failure = Some(message.into());
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn presented(&self) -> usize {
        self.presented
    }

    pub fn last_updates(&self) -> usize {
        self.last_updates
    }
}

impl Backend for HeadlessBackend {
    fn poll_events(&mut self, _timeout: Duration) -> Result<Vec<InputEvent>, GuiError> {
        if let Some(message) = self.failure.take() {
            return Err(GuiError::Backend(message));
        }
        Ok(self.queue.drain(..).collect())
    }

    fn window_size(&self) -> Result<Size, GuiError> {
        Ok(self.size)
    }

    fn present(&mut self, updates: &[CellUpdate]) -> Result<(), GuiError> {
        self.presented += 1;
        self.last_updates = updates.len();
        Ok(())
    }
}
