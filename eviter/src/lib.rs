//! # eviter - Push-to-Pull Event Iteration
//!
//! `eviter` turns a push-based event source (something that calls registered
//! listeners over time) into a pull-based async [`Stream`].
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use eviter::prelude::*;
//!
//! let emitter = Arc::new(EventEmitter::<String>::new());
//! let mut names = emitter.events_with(
//!     "name",
//!     IteratorOptions::new()
//!         .with_filter(|name: &String, _queued| name.len() == 3)
//!         .with_limit(2)
//!         .with_idle(Duration::from_secs(5)),
//! )?;
//!
//! while let Some(name) = names.next().await {
//!     println!("{name}");
//! }
//! ```
//!
//! ## Termination
//!
//! An iterator stops on the first of:
//! - an explicit [`EventIterator::end`], an [`EndHandle`], or dropping it
//!   (which is what `break` and `?` out of a loop do)
//! - `limit` accepted values (the last one is still delivered)
//! - no accepted value for the idle window (values still queued are dropped)
//! - the source dropping the listener
//!
//! The reason is available from [`EventIterator::stop_reason`].
//!
//! [`Stream`]: futures::Stream

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod ext;
mod iterator;
mod options;

pub use ext::EventSourceExt;
pub use iterator::{EndHandle, EventIterator};
pub use options::{FilterFn, IteratorOptions};

pub use eviter_core::{
    // Error types
    BoxError,
    EventError,
    // Source contract
    EventSource,
    ListenerFn,
    ListenerId,
    // Message
    Message,
    SourceError,
    StopReason,
};

// Standard sources
pub use eviter_std::{DEFAULT_MAX_LISTENERS, EventEmitter};

// Used by the derive macros.
#[doc(hidden)]
pub use futures;

/// Testing utilities.
pub mod testing {
    pub use eviter_std::testing::RecordingListener;
    #[cfg(feature = "testing")]
    pub use eviter_std::testing::ScriptedEmitter;
}

/// Prelude module - common imports for eviter.
///
/// # Usage
///
/// ```rust,ignore
/// use eviter::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        EndHandle, EventEmitter, EventIterator, EventSource, EventSourceExt, IteratorOptions,
        Message, StopReason,
    };
    pub use futures::StreamExt;
    pub use std::{sync::Arc, time::Duration};
}

#[cfg(feature = "macros")]
pub use eviter_macros::{EventStream, Message};
