//! Error types for the recoverable failure paths.
//!
//! Only collaborator failures are errors. Misuse of the declaration API
//! (unbalanced containers, stale variable handles, type confusion) panics,
//! and invalid user input is absorbed by the widget that received it.

use std::io;

/// Failures reported by the platform backend.
#[derive(Debug, thiserror::Error)]
pub enum GuiError {
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("backend unavailable: {0}")]
    Backend(String),
}

/// Failures reported by a [`TextMeasure`](crate::text::TextMeasure) implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MeasureError {
    #[error("no font available for {0:?}")]
    FontUnavailable(String),
    #[error("text cannot be measured: {0}")]
    Unmeasurable(String),
}
