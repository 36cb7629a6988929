//! Error types for eviter.
//!
//! This module provides a small error hierarchy using `thiserror`:
//!
//! - [`EventError`] - Top-level error type for eviter operations
//! - [`SourceError`] - Errors reported by an [`EventSource`]
//!
//! Termination of an iterator (explicit end, limit, idle timeout) is not an
//! error; see [`StopReason`].
//!
//! [`EventSource`]: crate::EventSource
//! [`StopReason`]: crate::StopReason

use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error type for all eviter operations.
#[derive(Error, Debug)]
pub enum EventError {
    /// The event source refused an operation.
    #[error("event source error: {0}")]
    Source(#[from] SourceError),

    /// A custom error occurred.
    #[error(transparent)]
    Custom(BoxError),
}

/// Errors an event source may report when registering listeners or emitting.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The source has been closed and accepts no more listeners or emissions.
    #[error("event source is closed")]
    Closed,

    /// The source enforces a hard listener cap and it was reached.
    #[error("listener limit of {limit} reached for event `{event}`")]
    ListenerLimit {
        /// The event name.
        event: String,
        /// The configured cap.
        limit: usize,
    },

    /// A custom source error.
    #[error(transparent)]
    Custom(BoxError),
}

// Convenience conversions
impl From<BoxError> for EventError {
    fn from(err: BoxError) -> Self {
        EventError::Custom(err)
    }
}

impl From<BoxError> for SourceError {
    fn from(err: BoxError) -> Self {
        SourceError::Custom(err)
    }
}
