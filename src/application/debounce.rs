//! Trailing-edge debounce wrapper.
//!
//! A [`Debounced`] coalesces a burst of calls into one run of its action,
//! `wait` after the last call of the burst, with that call's arguments.
//!
//! Timers run on the ambient tokio runtime. Each wrapper owns at most one
//! pending timer; a new call cancels it and schedules a fresh one.

use crate::application::metrics::RateMetrics;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::AbortHandle;

/// Wrap `action` so bursts of calls collapse into one trailing run.
///
/// Shorthand for [`Debounced::new`].
pub fn debounce<A, F>(action: F, wait: Duration) -> Debounced<A>
where
    F: Fn(A) + Send + Sync + 'static,
{
    Debounced::new(action, wait)
}

/// The wrapper's single pending timer.
///
/// `generation` increases on every call. A timer only fires if its
/// generation is still current when it wakes, so a timer that was superseded
/// after it had already woken up stays silent.
#[derive(Debug, Default)]
struct PendingTimer {
    generation: u64,
    timer: Option<AbortHandle>,
}

/// A callable that runs its action once a quiet period has passed.
///
/// Clones share the same pending timer.
///
/// # Example
/// ```
/// use sitekit::debounce;
/// use std::time::Duration;
///
/// # #[tokio::main(flavor = "current_thread", start_paused = true)]
/// # async fn main() {
/// let save = debounce(
///     |draft: String| println!("saving {draft}"),
///     Duration::from_millis(300),
/// );
///
/// save.call("h".to_string());
/// save.call("he".to_string());
/// save.call("hello".to_string()); // only this one is saved
///
/// tokio::time::sleep(Duration::from_millis(301)).await;
/// assert_eq!(save.metrics().actions_fired(), 1);
/// # }
/// ```
pub struct Debounced<A> {
    action: Arc<dyn Fn(A) + Send + Sync>,
    wait: Duration,
    pending: Arc<Mutex<PendingTimer>>,
    metrics: RateMetrics,
}

impl<A> Debounced<A> {
    /// Create a new debounce wrapper.
    pub fn new<F>(action: F, wait: Duration) -> Self
    where
        F: Fn(A) + Send + Sync + 'static,
    {
        Self {
            action: Arc::new(action),
            wait,
            pending: Arc::new(Mutex::new(PendingTimer::default())),
            metrics: RateMetrics::new(),
        }
    }

    /// Whether a run is currently scheduled.
    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .timer
            .is_some()
    }

    /// The quiet period.
    pub fn wait(&self) -> Duration {
        self.wait
    }

    /// Get the call counters for this wrapper.
    pub fn metrics(&self) -> &RateMetrics {
        &self.metrics
    }
}

impl<A> Debounced<A>
where
    A: Send + 'static,
{
    /// Invoke the wrapper.
    ///
    /// Cancels the pending run, if any, and schedules `action(args)` to run
    /// after `wait`. The action never runs inside this call, even with a
    /// zero wait.
    ///
    /// Must be called from within a tokio runtime. Outside one the call is
    /// logged and dropped.
    pub fn call(&self, args: A) {
        self.metrics.record_call();

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                tracing::warn!(error = %e, "debounced call made outside a tokio runtime, dropping it");
                return;
            }
        };

        let mut pending = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(timer) = pending.timer.take() {
            timer.abort();
            self.metrics.record_superseded();
            tracing::debug!(generation = pending.generation, "pending debounce superseded");
        }

        pending.generation = pending.generation.wrapping_add(1);
        let generation = pending.generation;

        let action = Arc::clone(&self.action);
        let state = Arc::clone(&self.pending);
        let metrics = self.metrics.clone();
        let wait = self.wait;

        // The lock is held across spawn so the timer cannot observe a
        // generation without its own handle recorded.
        let task = runtime.spawn(async move {
            tokio::time::sleep(wait).await;

            {
                let mut pending = state.lock().unwrap_or_else(PoisonError::into_inner);
                if pending.generation != generation {
                    return;
                }
                pending.timer = None;
            }

            tracing::debug!(generation, "debounce quiet period elapsed, firing");
            metrics.record_fired();
            action(args);
        });

        pending.timer = Some(task.abort_handle());
    }
}

impl<A> Clone for Debounced<A> {
    fn clone(&self) -> Self {
        Self {
            action: Arc::clone(&self.action),
            wait: self.wait,
            pending: Arc::clone(&self.pending),
            metrics: self.metrics.clone(),
        }
    }
}

impl<A> fmt::Debug for Debounced<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Debounced")
            .field("wait", &self.wait)
            .field("pending", &self.is_pending())
            .field("metrics", &self.metrics.snapshot())
            .finish_non_exhaustive()
    }
}
