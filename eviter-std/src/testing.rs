//! Testing utilities for eviter.
//!
//! This module provides helpers to drive and observe event sources in tests.
//!
//! # Features
//!
//! - [`RecordingListener`]: A listener that records every value it receives
//! - [`ScriptedEmitter`]: An emitter that replays a fixed script on a timer
//!   (requires the `testing` feature)

use eviter_core::{ListenerFn, Message};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[cfg(feature = "testing")]
use crate::emitter::EventEmitter;
#[cfg(feature = "testing")]
use std::time::Duration;

// ============================================================================
// Recording Listener
// ============================================================================

/// A listener that records all values it receives.
///
/// Useful for verifying that an iterator leaves other listeners untouched.
///
/// # Example
///
/// ```rust,ignore
/// let recorder = RecordingListener::<u32>::new();
/// emitter.on("tick", recorder.listener())?;
///
/// emitter.emit("tick", 1)?;
/// assert_eq!(recorder.values(), vec![1]);
/// ```
pub struct RecordingListener<V> {
    values: Arc<Mutex<Vec<V>>>,
}

impl<V: Message + Clone> RecordingListener<V> {
    /// Create a new, empty recorder.
    pub fn new() -> Self {
        Self {
            values: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<V>> {
        self.values.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// A callback to register on a source. All callbacks share one log.
    pub fn listener(&self) -> ListenerFn<V> {
        let values = self.values.clone();
        Arc::new(move |value: &V| {
            values
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(value.clone());
        })
    }

    /// Get a clone of the recorded values.
    pub fn values(&self) -> Vec<V> {
        self.lock().clone()
    }

    /// Get the number of recorded values.
    pub fn count(&self) -> usize {
        self.lock().len()
    }

    /// Clear all recorded values.
    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl<V: Message + Clone> Default for RecordingListener<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Clone for RecordingListener<V> {
    fn clone(&self) -> Self {
        Self {
            values: self.values.clone(),
        }
    }
}

// ============================================================================
// Scripted Emitter
// ============================================================================

/// An emitter that replays a fixed list of values on one event.
///
/// Each value is emitted one `interval` after the previous one. Once the
/// script is exhausted, one more interval passes and the finish callback runs,
/// which is typically used to end an iterator attached to the emitter.
///
/// # Example
///
/// ```rust,ignore
/// use eviter::EventSourceExt;
///
/// let script = ScriptedEmitter::new("people", people());
/// let mut iter = script.emitter().events("people")?;
/// let handle = iter.end_handle();
/// script.on_finish(move || handle.end()).start();
///
/// while let Some(person) = iter.next().await { ... }
/// ```
#[cfg(feature = "testing")]
pub struct ScriptedEmitter<V: Message> {
    emitter: Arc<EventEmitter<V>>,
    event: String,
    script: Vec<V>,
    interval: Duration,
    on_finish: Option<Box<dyn FnOnce() + Send + 'static>>,
}

#[cfg(feature = "testing")]
impl<V: Message> ScriptedEmitter<V> {
    /// Default pause between two emissions.
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

    /// Create a scripted emitter for `event` over a fresh [`EventEmitter`].
    pub fn new(event: impl Into<String>, script: Vec<V>) -> Self {
        Self {
            emitter: Arc::new(EventEmitter::new()),
            event: event.into(),
            script,
            interval: Self::DEFAULT_INTERVAL,
            on_finish: None,
        }
    }

    /// Set the pause between two emissions.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Run `f` once the script has been fully emitted.
    pub fn on_finish(mut self, f: impl FnOnce() + Send + 'static) -> Self {
        self.on_finish = Some(Box::new(f));
        self
    }

    /// The underlying emitter, for attaching listeners and iterators.
    pub fn emitter(&self) -> Arc<EventEmitter<V>> {
        self.emitter.clone()
    }

    /// The scripted event name.
    pub fn event(&self) -> &str {
        &self.event
    }

    /// Spawn the replay on the current tokio runtime.
    ///
    /// The task resolves to the number of values emitted. It stops early if
    /// the emitter is closed.
    pub fn start(self) -> tokio::task::JoinHandle<usize> {
        let Self {
            emitter,
            event,
            script,
            interval,
            on_finish,
        } = self;

        tokio::spawn(async move {
            let mut emitted = 0;
            for value in script {
                tokio::time::sleep(interval).await;
                if emitter.emit(&event, value).is_err() {
                    break;
                }
                emitted += 1;
            }
            tokio::time::sleep(interval).await;
            if let Some(finish) = on_finish {
                finish();
            }
            emitted
        })
    }
}
