//! Termination causes.

use std::fmt;

/// Why an iterator stopped producing values.
///
/// None of these are errors: they are the normal ways a consumption ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StopReason {
    /// `end()` was called, or the iterator was dropped.
    Ended,
    /// The configured number of accepted values was collected.
    LimitReached,
    /// No value was accepted within the idle window. Pending values are dropped.
    Idle,
    /// The event source dropped the listener (e.g. it was closed).
    SourceClosed,
}

impl StopReason {
    /// Whether values already queued are still delivered after this stop.
    ///
    /// An explicit end and an idle expiry discard pending values.
    pub fn drains_queue(self) -> bool {
        matches!(self, StopReason::LimitReached | StopReason::SourceClosed)
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            StopReason::Ended => "ended",
            StopReason::LimitReached => "limit reached",
            StopReason::Idle => "idle timeout",
            StopReason::SourceClosed => "source closed",
        };
        f.write_str(text)
    }
}
