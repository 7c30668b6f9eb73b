//! Leading-edge throttle wrapper.
//!
//! A [`Throttled`] runs its action for the first call it sees, then drops
//! every call until the cooldown ends. Nothing is queued and there is no
//! trailing call.

use crate::application::metrics::RateMetrics;
use crate::application::ports::Clock;
use crate::domain::gate::{CallDecision, ThrottleGate};
use crate::infrastructure::clock::SystemClock;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Wrap `action` so it runs at most once per `limit`.
///
/// Shorthand for [`Throttled::new`].
pub fn throttle<A, F>(action: F, limit: Duration) -> Throttled<A>
where
    F: Fn(A) + Send + Sync + 'static,
{
    Throttled::new(action, limit)
}

/// A callable that runs its action on the leading edge of each cooldown
/// window.
///
/// Clones share the same gate, so throttling applies across all of them.
///
/// # Example
/// ```
/// use sitekit::throttle;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let hits = Arc::new(AtomicUsize::new(0));
/// let counter = Arc::clone(&hits);
/// let on_scroll = throttle(
///     move |_offset: u32| {
///         counter.fetch_add(1, Ordering::SeqCst);
///     },
///     Duration::from_secs(60),
/// );
///
/// assert!(on_scroll.call(10).is_fire());
/// assert!(on_scroll.call(20).is_drop());
/// assert_eq!(hits.load(Ordering::SeqCst), 1);
/// ```
pub struct Throttled<A> {
    action: Arc<dyn Fn(A) + Send + Sync>,
    gate: Arc<Mutex<ThrottleGate>>,
    clock: Arc<dyn Clock>,
    metrics: RateMetrics,
}

impl<A> Throttled<A> {
    /// Create a throttle driven by the system clock.
    pub fn new<F>(action: F, limit: Duration) -> Self
    where
        F: Fn(A) + Send + Sync + 'static,
    {
        Self::with_clock(action, limit, Arc::new(SystemClock::new()))
    }

    /// Create a throttle driven by a custom clock.
    ///
    /// Useful for testing with `MockClock`.
    pub fn with_clock<F>(action: F, limit: Duration, clock: Arc<dyn Clock>) -> Self
    where
        F: Fn(A) + Send + Sync + 'static,
    {
        Self {
            action: Arc::new(action),
            gate: Arc::new(Mutex::new(ThrottleGate::new(limit))),
            clock,
            metrics: RateMetrics::new(),
        }
    }

    /// Invoke the wrapper.
    ///
    /// Runs the action synchronously if the gate is open, otherwise drops
    /// `args`. The returned decision is informational.
    pub fn call(&self, args: A) -> CallDecision {
        self.metrics.record_call();

        let now = self.clock.now();
        let decision = self
            .gate
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .try_pass(now);

        // Gate lock is released here so the action may call back in
        match decision {
            CallDecision::Fire => {
                self.metrics.record_fired();
                (self.action)(args);
            }
            CallDecision::Drop => {
                self.metrics.record_dropped();
                tracing::debug!("throttled call dropped during cooldown");
            }
        }

        decision
    }

    /// Whether a call made now would run the action.
    pub fn is_open(&self) -> bool {
        let now = self.clock.now();
        self.gate
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_open(now)
    }

    /// The cooldown applied after each run.
    pub fn limit(&self) -> Duration {
        self.gate
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .limit()
    }

    /// Get the call counters for this wrapper.
    pub fn metrics(&self) -> &RateMetrics {
        &self.metrics
    }
}

impl<A> Clone for Throttled<A> {
    fn clone(&self) -> Self {
        Self {
            action: Arc::clone(&self.action),
            gate: Arc::clone(&self.gate),
            clock: Arc::clone(&self.clock),
            metrics: self.metrics.clone(),
        }
    }
}

impl<A> fmt::Debug for Throttled<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Throttled")
            .field("limit", &self.limit())
            .field("metrics", &self.metrics.snapshot())
            .finish_non_exhaustive()
    }
}
