//! # eviter-std
//!
//! Standard implementations for the eviter event-to-stream bridge.
//!
//! This crate provides:
//! - **Event sources**: [`EventEmitter`], an in-memory named-event emitter
//! - **Testing**: [`RecordingListener`], and `ScriptedEmitter` behind the `testing` feature

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core traits
pub use eviter_core;

// Modules
pub mod emitter;
pub mod testing;

pub use emitter::{DEFAULT_MAX_LISTENERS, EventEmitter};
pub use testing::RecordingListener;
#[cfg(feature = "testing")]
pub use testing::ScriptedEmitter;
