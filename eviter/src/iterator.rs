//! # Event Iterator (Push to Pull Bridge)
//!
//! [`EventIterator`] registers one listener on an [`EventSource`] and turns
//! the values pushed into it into a [`Stream`].
//!
//! # State Machine
//!
//! ```text
//! Active ──limit / closed──▶ Draining ──queue empty──▶ Ended
//!   │                           │                        ▲
//!   └───── end / drop / idle ───┴────────────────────────┘
//! ```
//!
//! - **Active**: the listener is attached; arrivals are filtered and queued.
//! - **Draining**: the listener is detached; already collected values are
//!   still delivered. Entered when the limit is reached or the source drops
//!   the listener while values are pending.
//! - **Ended**: terminal. Every further poll yields `None`.
//!
//! An explicit [`end`](EventIterator::end), dropping the iterator, or the idle
//! window passing goes straight to `Ended` and discards pending values.
//!
//! # Listener bookkeeping
//!
//! Leaving `Active` removes the listener and undoes the listener-ceiling
//! adjustment exactly once, on every path: limit, idle timeout, `end`, drop
//! (which covers `break`, `?` and unwinding out of a consuming loop).

use crate::options::{FilterFn, IteratorOptions};
use eviter_core::{EventError, EventSource, ListenerFn, ListenerId, Message, StopReason};
use eviter_std::EventEmitter;
use futures::stream::{FusedStream, Stream};
use std::{
    collections::VecDeque,
    fmt,
    future::Future,
    pin::Pin,
    sync::{Arc, Mutex, MutexGuard, PoisonError, Weak},
    task::{Context, Poll, Waker},
};
use tokio::time::{Instant, Sleep};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Active,
    Draining(StopReason),
    Ended(StopReason),
}

struct State<V> {
    queue: VecDeque<V>,
    phase: Phase,
    filter: FilterFn<V>,
    collected: usize,
    deadline: Option<Instant>,
    waker: Option<Waker>,
}

impl<V> State<V> {
    fn is_active(&self) -> bool {
        self.phase == Phase::Active
    }

    fn is_ended(&self) -> bool {
        matches!(self.phase, Phase::Ended(_))
    }

    fn stop_reason(&self) -> Option<StopReason> {
        match self.phase {
            Phase::Active => None,
            Phase::Draining(reason) | Phase::Ended(reason) => Some(reason),
        }
    }

    fn idle_expired(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| now >= deadline)
    }

    /// Leave `Active` for `reason`. Returns `false` if that already happened.
    ///
    /// An explicit end may also cut a drain short.
    fn finish(&mut self, reason: StopReason) -> bool {
        match self.phase {
            Phase::Active => {}
            Phase::Draining(_) if reason == StopReason::Ended => {}
            _ => return false,
        }
        self.deadline = None;
        if reason.drains_queue() && !self.queue.is_empty() {
            self.phase = Phase::Draining(reason);
        } else {
            self.queue.clear();
            self.phase = Phase::Ended(reason);
        }
        true
    }

    fn dequeue(&mut self) -> Option<V> {
        let value = self.queue.pop_front()?;
        if let (true, Phase::Draining(reason)) = (self.queue.is_empty(), self.phase) {
            self.phase = Phase::Ended(reason);
        }
        Some(value)
    }

    fn park(&mut self, waker: &Waker) {
        match &self.waker {
            Some(parked) if parked.will_wake(waker) => {}
            _ => self.waker = Some(waker.clone()),
        }
    }
}

struct Registration {
    id: ListenerId,
    raised_ceiling: bool,
}

struct Inner<V: Message, S> {
    source: Arc<S>,
    event: String,
    limit: Option<usize>,
    idle: Option<std::time::Duration>,
    registration: Mutex<Option<Registration>>,
    state: Mutex<State<V>>,
}

impl<V: Message, S: EventSource<V>> Inner<V, S> {
    fn state(&self) -> MutexGuard<'_, State<V>> {
        // A panicking filter must not wedge cleanup.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn registration(&self) -> MutexGuard<'_, Option<Registration>> {
        self.registration
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Listener callback.
    fn arrive(&self, value: &V)
    where
        V: Clone,
    {
        let (waker, stopped) = {
            let mut state = self.state();
            if !state.is_active() {
                return;
            }
            let now = Instant::now();
            if state.idle_expired(now) {
                state.finish(StopReason::Idle);
                (state.waker.take(), Some(StopReason::Idle))
            } else {
                let State { queue, filter, .. } = &mut *state;
                if !filter(value, queue.make_contiguous()) {
                    #[cfg(feature = "tracing")]
                    tracing::trace!(event = %self.event, "value rejected by filter");
                    return;
                }
                if self.limit.is_some_and(|limit| state.collected >= limit) {
                    state.finish(StopReason::LimitReached);
                    (state.waker.take(), Some(StopReason::LimitReached))
                } else {
                    state.collected += 1;
                    if let Some(idle) = self.idle {
                        state.deadline = Some(now + idle);
                    }
                    state.queue.push_back(value.clone());

                    // The value that hits the limit is still delivered.
                    let stopped = match self.limit {
                        Some(limit) if state.collected >= limit => {
                            state.finish(StopReason::LimitReached);
                            Some(StopReason::LimitReached)
                        }
                        _ => None,
                    };
                    (state.waker.take(), stopped)
                }
            }
        };

        if stopped.is_some() {
            self.detach();
        }
        if let Some(waker) = waker {
            waker.wake();
        }
    }

    /// Called when the source drops our listener without us asking.
    fn listener_dropped(&self) {
        let waker = {
            let mut state = self.state();
            if !state.finish(StopReason::SourceClosed) {
                return;
            }
            state.waker.take()
        };
        // The source may still be tearing down: detaching is left to the
        // consumer side (next poll, `end` or drop).
        if let Some(waker) = waker {
            waker.wake();
        }
    }

    /// End on idle expiry if the window has passed. Returns `true` if it did.
    fn expire_if_idle(&self) -> bool {
        let waker = {
            let mut state = self.state();
            if !state.is_active() || !state.idle_expired(Instant::now()) {
                return false;
            }
            state.finish(StopReason::Idle);
            state.waker.take()
        };
        self.detach();
        if let Some(waker) = waker {
            waker.wake();
        }
        true
    }

    fn end(&self) {
        let waker = {
            let mut state = self.state();
            if state.finish(StopReason::Ended) {
                state.waker.take()
            } else {
                None
            }
        };
        self.detach();
        if let Some(waker) = waker {
            waker.wake();
        }
    }

    /// Remove the listener and restore the ceiling. Idempotent.
    fn detach(&self) {
        let Some(registration) = self.registration().take() else {
            return;
        };
        self.source.off(&self.event, registration.id);
        if registration.raised_ceiling {
            lower_ceiling::<V, S>(&self.source);
        }

        #[cfg(feature = "tracing")]
        {
            let state = self.state();
            tracing::debug!(
                event = %self.event,
                reason = ?state.stop_reason(),
                collected = state.collected,
                "event iterator detached"
            );
        }
    }
}

fn raise_ceiling<V: Message, S: EventSource<V>>(source: &S) -> bool {
    match source.max_listeners() {
        // Zero means unlimited.
        Some(limit) if limit != 0 => {
            source.set_max_listeners(limit + 1);
            true
        }
        _ => false,
    }
}

fn lower_ceiling<V: Message, S: EventSource<V>>(source: &S) {
    if let Some(limit) = source.max_listeners() {
        if limit != 0 {
            source.set_max_listeners(limit - 1);
        }
    }
}

/// Owned by the registered listener closure.
///
/// Only holds a weak reference, so the source never keeps a dropped iterator
/// alive. Dropping it means the source let go of the listener.
struct ListenerGuard<V: Message, S: EventSource<V>> {
    inner: Weak<Inner<V, S>>,
}

impl<V: Message + Clone, S: EventSource<V>> ListenerGuard<V, S> {
    fn arrive(&self, value: &V) {
        if let Some(inner) = self.inner.upgrade() {
            inner.arrive(value);
        }
    }
}

impl<V: Message, S: EventSource<V>> Drop for ListenerGuard<V, S> {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.listener_dropped();
        }
    }
}

/// An asynchronous iterator over values emitted by an [`EventSource`].
///
/// Values are delivered in the order they were accepted. The iterator ends
/// when [`end`](Self::end) is called, when `limit` values were collected, when
/// no value was collected for the idle window, or when the source drops the
/// listener. Once ended, every poll yields `None`.
///
/// Dropping the iterator ends it, so leaving a consuming loop early with
/// `break`, `?` or a panic always detaches the listener.
///
/// # Example
///
/// ```rust,ignore
/// use eviter::prelude::*;
///
/// let emitter = Arc::new(EventEmitter::<Person>::new());
/// let mut people = emitter.events_with("person", IteratorOptions::new().with_limit(2))?;
///
/// while let Some(person) = people.next().await {
///     println!("{}", person.name);
/// }
/// assert!(people.is_ended());
/// ```
///
/// # Runtime
///
/// The idle window is driven by `tokio::time`; iterators with an idle window
/// must be polled inside a tokio runtime with the time driver enabled.
pub struct EventIterator<V: Message, S: EventSource<V> = EventEmitter<V>> {
    inner: Arc<Inner<V, S>>,
    sleep: Option<Pin<Box<Sleep>>>,
}

impl<V: Message + Clone, S: EventSource<V>> EventIterator<V, S> {
    /// Start listening for `event` on `source`.
    ///
    /// Fails only if the source refuses the listener.
    pub fn new(
        source: Arc<S>,
        event: impl Into<String>,
        options: IteratorOptions<V>,
    ) -> Result<Self, EventError> {
        let IteratorOptions {
            filter,
            idle,
            limit,
            adjust_max_listeners,
        } = options;
        let filter: FilterFn<V> = match filter {
            Some(filter) => filter,
            None => Box::new(|_: &V, _: &[V]| true),
        };

        let inner = Arc::new(Inner {
            source,
            event: event.into(),
            limit,
            idle,
            registration: Mutex::new(None),
            state: Mutex::new(State {
                queue: VecDeque::new(),
                phase: Phase::Active,
                filter,
                collected: 0,
                deadline: idle.map(|idle| Instant::now() + idle),
                waker: None,
            }),
        });

        let guard = ListenerGuard {
            inner: Arc::downgrade(&inner),
        };
        let listener: ListenerFn<V> = Arc::new(move |value: &V| guard.arrive(value));

        let raised_ceiling = adjust_max_listeners && raise_ceiling::<V, S>(&inner.source);
        let id = match inner.source.on(&inner.event, listener) {
            Ok(id) => id,
            Err(err) => {
                if raised_ceiling {
                    lower_ceiling::<V, S>(&inner.source);
                }
                return Err(err.into());
            }
        };
        *inner.registration() = Some(Registration { id, raised_ceiling });

        // A concurrent emit may have finished us before the id was stored.
        if !inner.state().is_active() {
            inner.detach();
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            event = %inner.event,
            listener = %id,
            limit = ?limit,
            idle = ?idle,
            "event iterator listening"
        );

        Ok(Self { inner, sleep: None })
    }
}

impl<V: Message, S: EventSource<V>> EventIterator<V, S> {
    /// Whether the iterator has ended.
    ///
    /// A passed idle window is noticed here even if nobody is polling.
    pub fn is_ended(&self) -> bool {
        self.inner.expire_if_idle();
        self.inner.state().is_ended()
    }

    /// End the iterator, discarding values not yet delivered.
    ///
    /// Idempotent.
    pub fn end(&self) {
        self.inner.end();
    }

    /// The event name being listened to.
    pub fn event(&self) -> &str {
        &self.inner.event
    }

    /// The event source.
    pub fn source(&self) -> &Arc<S> {
        &self.inner.source
    }

    /// Number of values accepted so far (delivered or pending).
    pub fn collected(&self) -> usize {
        self.inner.state().collected
    }

    /// Number of accepted values not yet delivered.
    pub fn pending(&self) -> usize {
        self.inner.state().queue.len()
    }

    /// Why the iterator stopped, or `None` while still listening.
    pub fn stop_reason(&self) -> Option<StopReason> {
        self.inner.state().stop_reason()
    }

    /// Replace the filter applied to future arrivals.
    pub fn set_filter<F>(&self, filter: F)
    where
        F: Fn(&V, &[V]) -> bool + Send + Sync + 'static,
    {
        self.inner.state().filter = Box::new(filter);
    }

    /// A handle that can end this iterator from elsewhere.
    pub fn end_handle(&self) -> EndHandle<V, S> {
        EndHandle {
            inner: Arc::downgrade(&self.inner),
        }
    }
}

impl<V: Message, S: EventSource<V>> Stream for EventIterator<V, S> {
    type Item = V;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<V>> {
        let this = self.get_mut();
        loop {
            // A passed idle window wins over values still queued.
            this.inner.expire_if_idle();
            let mut state = this.inner.state();
            if let Some(value) = state.dequeue() {
                return Poll::Ready(Some(value));
            }
            if let Phase::Draining(reason) = state.phase {
                state.phase = Phase::Ended(reason);
            }
            if state.is_ended() {
                drop(state);
                this.sleep = None;
                this.inner.detach();
                return Poll::Ready(None);
            }

            let Some(deadline) = state.deadline else {
                state.park(cx.waker());
                return Poll::Pending;
            };
            if Instant::now() >= deadline {
                continue;
            }
            state.park(cx.waker());
            drop(state);

            let sleep = this
                .sleep
                .get_or_insert_with(|| Box::pin(tokio::time::sleep_until(deadline)));
            if sleep.deadline() != deadline {
                sleep.as_mut().reset(deadline);
            }
            if sleep.as_mut().poll(cx).is_pending() {
                return Poll::Pending;
            }
            // The timer fired: loop to re-check, an arrival may have moved the deadline.
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let state = self.inner.state();
        match state.phase {
            Phase::Active => (state.queue.len(), None),
            _ => (state.queue.len(), Some(state.queue.len())),
        }
    }
}

impl<V: Message, S: EventSource<V>> FusedStream for EventIterator<V, S> {
    fn is_terminated(&self) -> bool {
        self.inner.state().is_ended()
    }
}

impl<V: Message, S: EventSource<V>> Drop for EventIterator<V, S> {
    fn drop(&mut self) {
        self.inner.end();
    }
}

impl<V: Message, S: EventSource<V>> fmt::Debug for EventIterator<V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state();
        f.debug_struct("EventIterator")
            .field("event", &self.inner.event)
            .field("phase", &state.phase)
            .field("pending", &state.queue.len())
            .field("collected", &state.collected)
            .field("limit", &self.inner.limit)
            .field("idle", &self.inner.idle)
            .finish()
    }
}

/// Ends an [`EventIterator`] from another task or from the producer side.
///
/// Holds a weak reference: ending a dropped iterator is a no-op.
pub struct EndHandle<V: Message, S: EventSource<V> = EventEmitter<V>> {
    inner: Weak<Inner<V, S>>,
}

impl<V: Message, S: EventSource<V>> EndHandle<V, S> {
    /// End the iterator, discarding values not yet delivered.
    pub fn end(&self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.end();
        }
    }

    /// Whether the iterator has ended (or was dropped).
    pub fn is_ended(&self) -> bool {
        match self.inner.upgrade() {
            Some(inner) => {
                inner.expire_if_idle();
                inner.state().is_ended()
            }
            None => true,
        }
    }
}

impl<V: Message, S: EventSource<V>> Clone for EndHandle<V, S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<V: Message, S: EventSource<V>> fmt::Debug for EndHandle<V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndHandle")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}
