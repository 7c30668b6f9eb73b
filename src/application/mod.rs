//! Application layer - the wrappers and the cache.
//!
//! This layer contains:
//! - Debounce and throttle wrappers around arbitrary callables
//! - The typed persistent cache
//! - Call counters for the wrappers
//!
//! ## Ports
//!
//! The application layer defines the traits (`Clock`, `KeyValueStore`) that
//! infrastructure adapters implement.

pub mod cache;
#[cfg(feature = "async")]
pub mod debounce;
pub mod metrics;
pub mod ports;
pub mod throttle;
