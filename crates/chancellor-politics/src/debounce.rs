//! Coalescing of rapid recomputation requests.
//!
//! A [`Debouncer`] holds at most one pending input. Each request replaces
//! the input and pushes the deadline back to `now + window`; [`poll`]
//! releases the input only once the deadline has passed with no newer
//! request. The caller supplies every `Instant`, so the type has no clock
//! of its own and is trivially testable.
//!
//! [`poll`]: Debouncer::poll

use std::time::{Duration, Instant};

/// Defers work until requests stop arriving for `window`.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    window: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    /// A debouncer with nothing pending.
    pub const fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    /// The quiet period required before a request fires.
    pub const fn window(&self) -> Duration {
        self.window
    }

    /// Record a request, superseding any pending one.
    pub fn request(&mut self, input: T, now: Instant) {
        let deadline = now.checked_add(self.window).unwrap_or(now);
        self.pending = Some((input, deadline));
    }

    /// Take the pending input if its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let due = self
            .pending
            .as_ref()
            .is_some_and(|(_, deadline)| now >= *deadline);
        if due { self.flush() } else { None }
    }

    /// Take the pending input regardless of its deadline.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(input, _)| input)
    }

    /// Whether a request is waiting.
    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
