//! # Event Source (Producer Side)
//!
//! An [`EventSource`] is the push-based side of the bridge: something that
//! invokes registered listeners with values over time, keyed by event name.
//!
//! The iterator in `eviter` only ever adds and removes its own listener, and
//! optionally nudges the source's listener ceiling. Everything else about the
//! source (how it emits, which thread it runs on) is up to the implementor.
//!
//! # Listener identity
//!
//! Listeners are `Arc`'d closures. Since closures cannot be compared, `on`
//! hands back an opaque [`ListenerId`] that `off` uses for exact removal.

use crate::{error::SourceError, message::Message};
use std::{fmt, sync::Arc};

/// A registered listener callback.
pub type ListenerFn<V> = Arc<dyn Fn(&V) + Send + Sync + 'static>;

/// Opaque identity of a registered listener, unique per source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Create a listener id from a raw value.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener#{}", self.0)
    }
}

/// A push-based source of named events carrying values of type `V`.
///
/// # Re-entrancy
///
/// Implementations must not hold internal locks while invoking listeners:
/// a listener may call [`off`](EventSource::off) on the same source from
/// inside its callback (an iterator does this when it reaches its limit).
///
/// # Listener ceiling
///
/// Some sources warn when an event has "too many" listeners. Such sources
/// report the ceiling through [`max_listeners`](EventSource::max_listeners),
/// where `Some(0)` means unlimited. Sources without the concept keep the
/// default `None`.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not an `EventSource` for `{V}`",
    label = "missing `EventSource` implementation",
    note = "Event sources must implement `on` and `off` for values of type `{V}`."
)]
pub trait EventSource<V: Message>: Send + Sync + 'static {
    /// Register a listener for `event`.
    fn on(&self, event: &str, listener: ListenerFn<V>) -> Result<ListenerId, SourceError>;

    /// Remove a listener previously registered for `event`.
    ///
    /// Returns `false` if no such listener was registered.
    fn off(&self, event: &str, id: ListenerId) -> bool;

    /// The current listener ceiling, if this source has one.
    fn max_listeners(&self) -> Option<usize> {
        None
    }

    /// Set the listener ceiling. No-op for sources without one.
    fn set_max_listeners(&self, _limit: usize) {}
}
