//! Source-side entry point.

use crate::{iterator::EventIterator, options::IteratorOptions};
use eviter_core::{EventError, EventSource, Message};
use std::sync::Arc;

/// Start iterating over a shared event source.
///
/// Implemented for every `Arc<S>` where `S` is an [`EventSource`].
///
/// # Example
///
/// ```rust,ignore
/// let emitter = Arc::new(EventEmitter::<u32>::new());
/// let mut ticks = emitter.events_with("tick", IteratorOptions::new().with_limit(3))?;
/// ```
pub trait EventSourceExt<V: Message + Clone> {
    /// The concrete source type.
    type Source: EventSource<V>;

    /// Iterate over `event` with the given options.
    fn events_with(
        &self,
        event: impl Into<String>,
        options: IteratorOptions<V>,
    ) -> Result<EventIterator<V, Self::Source>, EventError>;

    /// Iterate over every value of `event`, until ended.
    fn events(
        &self,
        event: impl Into<String>,
    ) -> Result<EventIterator<V, Self::Source>, EventError> {
        self.events_with(event, IteratorOptions::new())
    }
}

impl<V: Message + Clone, S: EventSource<V>> EventSourceExt<V> for Arc<S> {
    type Source = S;

    fn events_with(
        &self,
        event: impl Into<String>,
        options: IteratorOptions<V>,
    ) -> Result<EventIterator<V, S>, EventError> {
        EventIterator::new(self.clone(), event, options)
    }
}
