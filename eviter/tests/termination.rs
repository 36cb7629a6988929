//! Termination: explicit end, limit, idle window, and their interplay.

use eviter::{EventEmitter, EventSourceExt, IteratorOptions, StopReason};
use futures::StreamExt;
use std::{sync::Arc, time::Duration};

const EVENT: &str = "letter";

fn letters() -> Arc<EventEmitter<&'static str>> {
    Arc::new(EventEmitter::new())
}

#[tokio::test]
async fn test_limit_delivers_exactly_n_values() {
    let source = letters();
    let mut iter = source
        .events_with(EVENT, IteratorOptions::new().with_limit(2))
        .unwrap();

    for letter in ["A", "B", "C"] {
        source.emit(EVENT, letter).unwrap();
    }

    assert_eq!(iter.next().await, Some("A"));
    assert!(!iter.is_ended());
    assert_eq!(iter.next().await, Some("B"));
    assert!(iter.is_ended());
    assert_eq!(iter.next().await, None);
    assert_eq!(iter.collected(), 2);
}

#[tokio::test]
async fn test_limit_reached_while_consumer_waits() {
    let source = letters();
    let mut iter = source
        .events_with(EVENT, IteratorOptions::new().with_limit(2))
        .unwrap();

    let producer = {
        let source = source.clone();
        tokio::spawn(async move {
            for letter in ["A", "B", "C"] {
                source.emit(EVENT, letter).unwrap();
                tokio::task::yield_now().await;
            }
        })
    };

    let mut seen = Vec::new();
    while let Some(letter) = iter.next().await {
        seen.push(letter);
    }
    producer.await.unwrap();

    assert_eq!(seen, vec!["A", "B"]);
    assert_eq!(source.listener_count(EVENT), 0);
}

#[tokio::test]
async fn test_rejected_values_do_not_count() {
    let source = letters();
    let options = IteratorOptions::new()
        .with_filter(|letter: &&'static str, _| *letter != "x")
        .with_limit(2);
    let mut iter = source.events_with(EVENT, options).unwrap();

    for letter in ["x", "A", "x", "x", "B", "C"] {
        source.emit(EVENT, letter).unwrap();
    }

    assert_eq!(iter.pending(), 2);
    assert_eq!(iter.next().await, Some("A"));
    assert_eq!(iter.next().await, Some("B"));
    assert_eq!(iter.next().await, None);
    assert_eq!(iter.stop_reason(), Some(StopReason::LimitReached));
}

#[tokio::test]
async fn test_filter_sees_queued_values() {
    let source = letters();
    let options = IteratorOptions::new()
        .with_filter(|letter: &&'static str, queued: &[&'static str]| !queued.contains(letter));
    let mut iter = source.events_with(EVENT, options).unwrap();

    for letter in ["A", "A", "B", "A"] {
        source.emit(EVENT, letter).unwrap();
    }
    iter.set_filter(|_, _| true);
    source.emit(EVENT, "B").unwrap();

    assert_eq!(iter.next().await, Some("A"));
    assert_eq!(iter.next().await, Some("B"));
    assert_eq!(iter.next().await, Some("B"));
    assert_eq!(iter.collected(), 3);
}

#[tokio::test]
async fn test_limit_zero_ends_on_first_arrival() {
    let source = letters();
    let mut iter = source
        .events_with(EVENT, IteratorOptions::new().with_limit(0))
        .unwrap();
    assert!(!iter.is_ended());

    source.emit(EVENT, "A").unwrap();

    assert!(iter.is_ended());
    assert_eq!(iter.next().await, None);
    assert_eq!(iter.collected(), 0);
    assert_eq!(source.listener_count(EVENT), 0);
}

#[tokio::test(start_paused = true)]
async fn test_idle_window_without_arrivals() {
    let source = letters();
    let mut iter = source
        .events_with(EVENT, IteratorOptions::new().with_idle(Duration::from_secs(1)))
        .unwrap();

    let started = tokio::time::Instant::now();
    assert_eq!(iter.next().await, None);
    assert!(started.elapsed() >= Duration::from_secs(1));
    assert_eq!(iter.stop_reason(), Some(StopReason::Idle));
    assert_eq!(source.listener_count(EVENT), 0);
    assert_eq!(source.max_listeners(), eviter::DEFAULT_MAX_LISTENERS);
}

#[tokio::test(start_paused = true)]
async fn test_arrivals_keep_idle_window_open() {
    let source = letters();
    let mut iter = source
        .events_with(
            EVENT,
            IteratorOptions::new().with_idle(Duration::from_millis(300)),
        )
        .unwrap();

    let producer = {
        let source = source.clone();
        tokio::spawn(async move {
            for letter in ["A", "B", "C"] {
                tokio::time::sleep(Duration::from_millis(200)).await;
                source.emit(EVENT, letter).unwrap();
            }
        })
    };

    let mut seen = Vec::new();
    while let Some(letter) = iter.next().await {
        seen.push(letter);
    }
    producer.await.unwrap();

    assert_eq!(seen, vec!["A", "B", "C"]);
    assert_eq!(iter.stop_reason(), Some(StopReason::Idle));
}

#[tokio::test(start_paused = true)]
async fn test_idle_noticed_without_polling() {
    let source = letters();
    let iter = source
        .events_with(
            EVENT,
            IteratorOptions::new().with_idle(Duration::from_millis(50)),
        )
        .unwrap();

    tokio::time::advance(Duration::from_millis(80)).await;
    assert!(iter.is_ended());
    assert_eq!(source.listener_count(EVENT), 0);
}

#[tokio::test(start_paused = true)]
async fn test_late_arrival_after_idle_is_not_delivered() {
    let source = letters();
    let mut iter = source
        .events_with(
            EVENT,
            IteratorOptions::new().with_idle(Duration::from_millis(50)),
        )
        .unwrap();
    source.emit(EVENT, "A").unwrap();

    tokio::time::advance(Duration::from_millis(80)).await;
    // The window passed before this arrival; nobody has polled yet.
    source.emit(EVENT, "B").unwrap();

    assert!(iter.is_ended());
    assert_eq!(iter.next().await, None);
    assert_eq!(iter.stop_reason(), Some(StopReason::Idle));
    assert_eq!(source.listener_count(EVENT), 0);
}

#[tokio::test(start_paused = true)]
async fn test_idle_expiry_discards_queued_values() {
    let source: Arc<EventEmitter<u32>> = Arc::new(EventEmitter::new());
    let mut iter = source
        .events_with(
            "n",
            IteratorOptions::new().with_idle(Duration::from_millis(100)),
        )
        .unwrap();
    source.emit("n", 1).unwrap();
    source.emit("n", 2).unwrap();

    tokio::time::advance(Duration::from_millis(500)).await;

    assert!(iter.is_ended());
    assert_eq!(iter.stop_reason(), Some(StopReason::Idle));
    assert_eq!(iter.pending(), 0);
    assert_eq!(iter.next().await, None);
    assert_eq!(source.listener_count("n"), 0);
    assert_eq!(source.max_listeners(), eviter::DEFAULT_MAX_LISTENERS);
}

#[tokio::test(start_paused = true)]
async fn test_idle_expiry_noticed_by_next_before_queued_values() {
    let source: Arc<EventEmitter<u32>> = Arc::new(EventEmitter::new());
    let mut iter = source
        .events_with(
            "n",
            IteratorOptions::new().with_idle(Duration::from_millis(100)),
        )
        .unwrap();
    source.emit("n", 1).unwrap();

    tokio::time::advance(Duration::from_millis(150)).await;

    assert_eq!(iter.next().await, None);
    assert_eq!(iter.stop_reason(), Some(StopReason::Idle));
}

#[tokio::test]
async fn test_next_after_end_stays_none() {
    let source = letters();
    let mut iter = source.events(EVENT).unwrap();
    iter.end();

    source.emit(EVENT, "A").unwrap();
    for _ in 0..3 {
        assert_eq!(iter.next().await, None);
    }
    assert_eq!(iter.pending(), 0);
}

#[tokio::test]
async fn test_end_inside_loop_stops_before_next_value() {
    let source = letters();
    let mut iter = source.events(EVENT).unwrap();
    for letter in ["A", "B", "C"] {
        source.emit(EVENT, letter).unwrap();
    }

    let mut seen = Vec::new();
    while let Some(letter) = iter.next().await {
        seen.push(letter);
        iter.end();
    }
    assert_eq!(seen, vec!["A"]);
}

#[tokio::test]
async fn test_end_handle_from_another_task() {
    let source = letters();
    let mut iter = source.events(EVENT).unwrap();
    let handle = iter.end_handle();

    let stopper = tokio::spawn(async move {
        tokio::task::yield_now().await;
        handle.end();
        handle.is_ended()
    });

    assert_eq!(iter.next().await, None);
    assert!(stopper.await.unwrap());
    assert_eq!(iter.stop_reason(), Some(StopReason::Ended));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_fifo_across_threads() {
    let source: Arc<EventEmitter<u32>> = Arc::new(EventEmitter::new());
    let mut iter = source
        .events_with("n", IteratorOptions::new().with_limit(1000))
        .unwrap();

    let producer = {
        let source = source.clone();
        std::thread::spawn(move || {
            for n in 0..1000 {
                source.emit("n", n).unwrap();
            }
        })
    };

    let seen: Vec<u32> = (&mut iter).collect().await;
    producer.join().unwrap();

    assert_eq!(seen, (0..1000).collect::<Vec<_>>());
    assert_eq!(iter.stop_reason(), Some(StopReason::LimitReached));
    assert_eq!(source.listener_count("n"), 0);
}
