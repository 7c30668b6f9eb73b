//! Observability counters for rate-controlled wrappers.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Counters shared by a wrapper and all of its clones.
///
/// All counters use relaxed atomics; they are for monitoring, not for
/// synchronization.
#[derive(Debug, Clone)]
pub struct RateMetrics {
    inner: Arc<RateMetricsInner>,
}

#[derive(Debug)]
struct RateMetricsInner {
    /// Total number of calls made to the wrapper
    calls_received: AtomicU64,
    /// Total number of times the wrapped action ran
    actions_fired: AtomicU64,
    /// Calls a throttle discarded during cooldown
    calls_dropped: AtomicU64,
    /// Calls whose pending debounce timer was replaced by a later call
    calls_superseded: AtomicU64,
}

impl RateMetrics {
    /// Create a new metrics tracker.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RateMetricsInner {
                calls_received: AtomicU64::new(0),
                actions_fired: AtomicU64::new(0),
                calls_dropped: AtomicU64::new(0),
                calls_superseded: AtomicU64::new(0),
            }),
        }
    }

    pub(crate) fn record_call(&self) {
        self.inner.calls_received.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_fired(&self) {
        self.inner.actions_fired.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_dropped(&self) {
        self.inner.calls_dropped.fetch_add(1, Ordering::Relaxed);
    }

    #[cfg_attr(not(feature = "async"), allow(dead_code))]
    pub(crate) fn record_superseded(&self) {
        self.inner.calls_superseded.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the total number of calls received.
    pub fn calls_received(&self) -> u64 {
        self.inner.calls_received.load(Ordering::Relaxed)
    }

    /// Get the total number of times the action ran.
    pub fn actions_fired(&self) -> u64 {
        self.inner.actions_fired.load(Ordering::Relaxed)
    }

    /// Get the number of calls dropped by a throttle.
    pub fn calls_dropped(&self) -> u64 {
        self.inner.calls_dropped.load(Ordering::Relaxed)
    }

    /// Get the number of debounce calls superseded by a later call.
    pub fn calls_superseded(&self) -> u64 {
        self.inner.calls_superseded.load(Ordering::Relaxed)
    }

    /// Get a snapshot of all counters.
    pub fn snapshot(&self) -> RateMetricsSnapshot {
        RateMetricsSnapshot {
            calls_received: self.calls_received(),
            actions_fired: self.actions_fired(),
            calls_dropped: self.calls_dropped(),
            calls_superseded: self.calls_superseded(),
        }
    }

    /// Reset all counters to zero.
    pub fn reset(&self) {
        self.inner.calls_received.store(0, Ordering::Relaxed);
        self.inner.actions_fired.store(0, Ordering::Relaxed);
        self.inner.calls_dropped.store(0, Ordering::Relaxed);
        self.inner.calls_superseded.store(0, Ordering::Relaxed);
    }
}

impl Default for RateMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// A point-in-time snapshot of [`RateMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateMetricsSnapshot {
    pub calls_received: u64,
    pub actions_fired: u64,
    pub calls_dropped: u64,
    pub calls_superseded: u64,
}

impl RateMetricsSnapshot {
    /// Fraction of calls that made the action run (0.0 to 1.0).
    ///
    /// Returns 0.0 if no calls have been made.
    pub fn fire_rate(&self) -> f64 {
        if self.calls_received == 0 {
            0.0
        } else {
            self.actions_fired as f64 / self.calls_received as f64
        }
    }
}
