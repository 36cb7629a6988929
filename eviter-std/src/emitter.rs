//! In-memory event emitter.
//!
//! [`EventEmitter`] is a named-event, multi-listener emitter implementing
//! [`EventSource`]. Listeners run synchronously inside [`emit`], in
//! registration order, on a snapshot taken before the first one runs. No
//! internal lock is held while they run, so a listener may register or remove
//! listeners (including itself) re-entrantly.
//!
//! [`emit`]: EventEmitter::emit

use eviter_core::{EventSource, ListenerFn, ListenerId, Message, SourceError};
use std::{
    collections::{HashMap, HashSet},
    sync::{
        Mutex, MutexGuard, PoisonError,
        atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering},
    },
};

/// Default listener ceiling per event.
pub const DEFAULT_MAX_LISTENERS: usize = 10;

struct Entry<V> {
    id: ListenerId,
    listener: ListenerFn<V>,
    once: bool,
}

struct Listeners<V> {
    events: HashMap<String, Vec<Entry<V>>>,
    warned: HashSet<String>,
}

/// A named-event emitter.
///
/// # Example
///
/// ```rust,ignore
/// let emitter = EventEmitter::<String>::new();
/// emitter.on("greet", Arc::new(|name: &String| println!("hello {name}")))?;
/// emitter.emit("greet", "Anna".to_string())?;
/// ```
pub struct EventEmitter<V: Message> {
    listeners: Mutex<Listeners<V>>,
    next_id: AtomicU64,
    max_listeners: AtomicUsize,
    closed: AtomicBool,
}

impl<V: Message> Default for EventEmitter<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Message> EventEmitter<V> {
    /// Create an emitter with the default listener ceiling.
    pub fn new() -> Self {
        Self::with_max_listeners(DEFAULT_MAX_LISTENERS)
    }

    /// Create an emitter with a custom listener ceiling (`0` = unlimited).
    pub fn with_max_listeners(limit: usize) -> Self {
        Self {
            listeners: Mutex::new(Listeners {
                events: HashMap::new(),
                warned: HashSet::new(),
            }),
            next_id: AtomicU64::new(1),
            max_listeners: AtomicUsize::new(limit),
            closed: AtomicBool::new(false),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Listeners<V>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn register(
        &self,
        event: &str,
        listener: ListenerFn<V>,
        once: bool,
    ) -> Result<ListenerId, SourceError> {
        if self.is_closed() {
            return Err(SourceError::Closed);
        }
        let id = ListenerId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let limit = self.max_listeners.load(Ordering::Acquire);

        let mut guard = self.lock();
        let Listeners { events, warned } = &mut *guard;
        let entries = events.entry(event.to_string()).or_default();
        entries.push(Entry { id, listener, once });

        if limit != 0 && entries.len() > limit && warned.insert(event.to_string()) {
            #[cfg(feature = "tracing")]
            tracing::warn!(
                event = %event,
                count = entries.len(),
                limit,
                "possible listener leak: listener count exceeds max_listeners"
            );
        }
        Ok(id)
    }

    /// Register a listener for `event`.
    pub fn on(&self, event: &str, listener: ListenerFn<V>) -> Result<ListenerId, SourceError> {
        self.register(event, listener, false)
    }

    /// Register a listener that is removed before its first invocation.
    pub fn once(&self, event: &str, listener: ListenerFn<V>) -> Result<ListenerId, SourceError> {
        self.register(event, listener, true)
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn off(&self, event: &str, id: ListenerId) -> bool {
        let removed = {
            let mut guard = self.lock();
            let Some(entries) = guard.events.get_mut(event) else {
                return false;
            };
            let removed = entries
                .iter()
                .position(|entry| entry.id == id)
                .map(|index| entries.remove(index));
            if entries.is_empty() {
                guard.events.remove(event);
            }
            removed
        };
        // Dropped outside the lock: listener captures may run code on drop.
        removed.is_some()
    }

    /// Invoke every listener of `event` with `value`.
    ///
    /// Returns `true` if at least one listener ran.
    pub fn emit(&self, event: &str, value: V) -> Result<bool, SourceError> {
        if self.is_closed() {
            return Err(SourceError::Closed);
        }
        let snapshot: Vec<ListenerFn<V>> = {
            let mut guard = self.lock();
            let Some(entries) = guard.events.get_mut(event) else {
                return Ok(false);
            };
            let snapshot: Vec<_> = entries.iter().map(|entry| entry.listener.clone()).collect();
            entries.retain(|entry| !entry.once);
            if entries.is_empty() {
                guard.events.remove(event);
            }
            snapshot
        };
        for listener in &snapshot {
            listener(&value);
        }
        Ok(!snapshot.is_empty())
    }

    /// Number of listeners registered for `event`.
    pub fn listener_count(&self, event: &str) -> usize {
        self.lock().events.get(event).map_or(0, Vec::len)
    }

    /// Names of events that currently have listeners.
    pub fn event_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.lock().events.keys().cloned().collect();
        names.sort();
        names
    }

    /// Remove all listeners of `event`, returning how many were removed.
    pub fn remove_all_listeners(&self, event: &str) -> usize {
        let removed = self.lock().events.remove(event);
        removed.map_or(0, |entries| entries.len())
    }

    /// The listener ceiling (`0` = unlimited).
    pub fn max_listeners(&self) -> usize {
        self.max_listeners.load(Ordering::Acquire)
    }

    /// Set the listener ceiling (`0` = unlimited).
    pub fn set_max_listeners(&self, limit: usize) {
        self.max_listeners.store(limit, Ordering::Release);
    }

    /// Close the emitter, dropping all listeners.
    ///
    /// Further `on`, `once` and `emit` calls fail with [`SourceError::Closed`].
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        let events = std::mem::take(&mut self.lock().events);
        #[cfg(feature = "tracing")]
        tracing::debug!(events = events.len(), "event emitter closed");
        drop(events);
    }

    /// Whether [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

impl<V: Message> EventSource<V> for EventEmitter<V> {
    fn on(&self, event: &str, listener: ListenerFn<V>) -> Result<ListenerId, SourceError> {
        EventEmitter::on(self, event, listener)
    }

    fn off(&self, event: &str, id: ListenerId) -> bool {
        EventEmitter::off(self, event, id)
    }

    fn max_listeners(&self) -> Option<usize> {
        Some(EventEmitter::max_listeners(self))
    }

    fn set_max_listeners(&self, limit: usize) {
        EventEmitter::set_max_listeners(self, limit)
    }
}
