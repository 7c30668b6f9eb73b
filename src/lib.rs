//! # sitekit
//!
//! Small building blocks shared by page-level code: call-rate control for
//! noisy event handlers and a typed cache over a persistent key-value store.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sitekit::{debounce, throttle, FileStore, PersistentCache};
//! use std::time::Duration;
//!
//! # #[tokio::main]
//! # async fn main() {
//! // Run the search once typing pauses for 300ms
//! let search = debounce(|query: String| println!("searching {query}"), Duration::from_millis(300));
//! search.call("rust".to_string());
//!
//! // Handle at most one scroll event every 100ms
//! let on_scroll = throttle(|offset: u32| println!("scrolled to {offset}"), Duration::from_millis(100));
//! on_scroll.call(120);
//!
//! // Remember UI state across runs
//! let cache = PersistentCache::new(FileStore::open("ui-state.json").unwrap());
//! let _ = cache.set("sidebar_open", &true);
//! let open: bool = cache.get("sidebar_open").unwrap_or(false);
//! # }
//! ```
//!
//! ## Rate Control
//!
//! - **Debounce** ([`Debounced`]): every call cancels the pending run and
//!   schedules a new one `wait` later. A burst becomes one trailing run with
//!   the last call's arguments. Timers run on the ambient tokio runtime
//!   (`async` feature, on by default).
//! - **Throttle** ([`Throttled`]): the first call in a window runs at once;
//!   calls during the following `limit` are dropped. No queueing, no trailing
//!   run.
//!
//! Both wrappers are cheap to clone; clones share state. Neither returns
//! anything from the wrapped action.
//!
//! ## Persistent Cache
//!
//! [`PersistentCache`] serializes values to JSON text and stores them in any
//! [`KeyValueStore`]: [`MemoryStore`] for process-lifetime state or
//! [`FileStore`] for state that survives restarts.
//!
//! The cache never hands a failure back for the caller to deal with. Every
//! error is logged through `tracing` with the key involved:
//!
//! - `get` returns `Err(Absent)` for a miss, a store read error, or text that
//!   does not parse.
//! - `set`, `remove` and `clear` return a [`LoggedError`] that is already on
//!   record; discard it with `let _ =`.
//!
//! ## Logging
//!
//! The crate emits `tracing` events and never installs a subscriber. Cache
//! failures are `WARN` with `key` and `error` fields.

// Domain layer - pure decision logic
pub mod domain;

// Application layer - wrappers and cache
pub mod application;

// Infrastructure layer - clocks and stores
pub mod infrastructure;

pub use domain::{
    gate::{CallDecision, ThrottleGate},
    outcome::{Absent, CacheErrorKind, LoggedError},
};

pub use application::{
    cache::PersistentCache,
    metrics::{RateMetrics, RateMetricsSnapshot},
    ports::{Clock, KeyValueStore, StoreError},
    throttle::{throttle, Throttled},
};

#[cfg(feature = "async")]
pub use application::debounce::{debounce, Debounced};

pub use infrastructure::{
    clock::SystemClock,
    file_store::{ConfigError, FileStore, FileStoreConfig},
    storage::MemoryStore,
};
