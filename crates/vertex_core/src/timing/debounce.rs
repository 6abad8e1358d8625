//! Trailing-edge debouncer for a single-task event loop.
//!
//! # Invariants
//! - A new `push` replaces any pending value and restarts the delay.
//! - A value is released at most once, by the first `poll` at or after its
//!   deadline.

use std::time::{Duration, Instant};

/// Delay applied to search-box input before filtering.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);
/// Delay applied to scroll-position writes.
pub const SCROLL_DEBOUNCE: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Schedules `value`, superseding whatever was pending.
    pub fn push(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.delay));
    }

    /// Releases the pending value once its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let ready = matches!(&self.pending, Some((_, deadline)) if *deadline <= now);
        if ready {
            self.flush()
        } else {
            None
        }
    }

    /// Releases the pending value regardless of its deadline.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
