//! # eviter-core
//!
//! Core traits for the eviter event-to-stream bridge.
//!
//! This crate has minimal dependencies and is designed to be imported by
//! event sources that want to be consumable by `eviter` without pulling in
//! the iterator implementation itself.
//!
//! # Pieces
//!
//! - [`Message`] - marker for event payloads
//! - [`EventSource`] - the push side: `on` / `off` plus an optional listener ceiling
//! - [`ListenerId`], [`ListenerFn`] - listener identity and callback shape
//! - [`StopReason`] - why an iterator stopped (not an error)
//!
//! # Error Types
//!
//! - [`EventError`] - Top-level error type
//! - [`SourceError`] - Errors reported by event sources

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod error;
mod message;
mod source;
mod stop;

// Re-exports
pub use error::{BoxError, EventError, SourceError};
pub use message::Message;
pub use source::{EventSource, ListenerFn, ListenerId};
pub use stop::StopReason;
