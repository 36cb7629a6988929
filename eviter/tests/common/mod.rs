#![allow(dead_code)]

use eviter::{EventEmitter, EventIterator, IteratorOptions, Message};
use eviter_std::testing::ScriptedEmitter;
use futures::{Stream, stream::FusedStream};
use std::{
    ops::Deref,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
    time::Duration,
};

// ============================================================================
// Test Payloads
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Person {
    pub name: String,
}

impl Person {
    pub fn new(name: &str) -> Self {
        Self { name: name.into() }
    }
}

impl Message for Person {}

pub const PEOPLE_EVENT: &str = "testEvent";

pub fn people() -> Vec<Person> {
    vec![Person::new("Anna"), Person::new("Bob"), Person::new("Joe")]
}

// ============================================================================
// Specialised Iterator
// ============================================================================

/// An iterator over people, wrapping the generic one.
pub struct PeopleIterator(pub EventIterator<Person>);

impl Stream for PeopleIterator {
    type Item = Person;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Person>> {
        Pin::new(&mut self.get_mut().0).poll_next(cx)
    }
}

impl FusedStream for PeopleIterator {
    fn is_terminated(&self) -> bool {
        self.0.is_terminated()
    }
}

impl Deref for PeopleIterator {
    type Target = EventIterator<Person>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

// ============================================================================
// People Emitter
// ============================================================================

/// Emits Anna, Bob and Joe one second apart, then ends the iterator.
///
/// `limit` defaults to the number of people. Must be called inside a tokio
/// runtime; tests use a paused clock so the seconds pass instantly.
pub fn people_iterator(
    limit: Option<usize>,
    options: IteratorOptions<Person>,
) -> (PeopleIterator, Arc<EventEmitter<Person>>) {
    let script = ScriptedEmitter::new(PEOPLE_EVENT, people()).with_interval(Duration::from_secs(1));
    let emitter = script.emitter();
    let limit = limit.unwrap_or(people().len());

    let iter = EventIterator::new(emitter.clone(), PEOPLE_EVENT, options.with_limit(limit))
        .expect("emitter is open");
    let handle = iter.end_handle();
    script.on_finish(move || handle.end()).start();

    (PeopleIterator(iter), emitter)
}

/// Drain a stream into a vector.
pub async fn collect<S: Stream + Unpin>(stream: &mut S) -> Vec<S::Item> {
    use futures::StreamExt;

    let mut out = Vec::new();
    while let Some(item) = stream.next().await {
        out.push(item);
    }
    out
}
