//! Iterator options.

use std::{fmt, time::Duration};

/// A predicate deciding whether an arriving value is collected.
///
/// Receives the value and the values currently queued (not yet delivered).
pub type FilterFn<V> = Box<dyn Fn(&V, &[V]) -> bool + Send + Sync + 'static>;

/// Options for an [`EventIterator`](crate::EventIterator).
///
/// Every option is optional: no filter accepts everything, no limit is
/// unbounded, no idle window never times out.
///
/// # Example
///
/// ```rust,ignore
/// let options = IteratorOptions::new()
///     .with_filter(|person: &Person, _queued| person.name.len() == 3)
///     .with_limit(2)
///     .with_idle(Duration::from_millis(500));
/// ```
pub struct IteratorOptions<V> {
    pub(crate) filter: Option<FilterFn<V>>,
    pub(crate) idle: Option<Duration>,
    pub(crate) limit: Option<usize>,
    pub(crate) adjust_max_listeners: bool,
}

impl<V> Default for IteratorOptions<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> IteratorOptions<V> {
    /// Create default options.
    pub fn new() -> Self {
        Self {
            filter: None,
            idle: None,
            limit: None,
            adjust_max_listeners: true,
        }
    }

    /// Only collect values for which `filter` returns `true`.
    pub fn with_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&V, &[V]) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(filter));
        self
    }

    /// End the iterator when no value is collected for `idle`.
    pub fn with_idle(mut self, idle: Duration) -> Self {
        self.idle = Some(idle);
        self
    }

    /// End the iterator after `limit` values have been collected.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Leave the source's listener ceiling alone.
    ///
    /// By default the ceiling is raised by one while the iterator listens, so
    /// that sources warning about listener leaks stay quiet.
    pub fn without_listener_ceiling(mut self) -> Self {
        self.adjust_max_listeners = false;
        self
    }

    /// The idle window, if any.
    pub fn idle(&self) -> Option<Duration> {
        self.idle
    }

    /// The collection limit, if any.
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Whether a filter is set.
    pub fn has_filter(&self) -> bool {
        self.filter.is_some()
    }

    /// Whether the listener ceiling is adjusted.
    pub fn adjusts_max_listeners(&self) -> bool {
        self.adjust_max_listeners
    }
}

impl<V> fmt::Debug for IteratorOptions<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IteratorOptions")
            .field("filter", &self.filter.as_ref().map(|_| "<fn>"))
            .field("idle", &self.idle)
            .field("limit", &self.limit)
            .field("adjust_max_listeners", &self.adjust_max_listeners)
            .finish()
    }
}
