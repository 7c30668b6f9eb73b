//! Mock implementations for testing.
//!
//! Test doubles for the infrastructure adapters: a hand-driven clock, a
//! store that fails on demand, and a tracing layer that records events.

pub mod clock;
pub mod layer;
pub mod store;

pub use clock::MockClock;
pub use layer::{CapturedEvent, MockCaptureLayer};
pub use store::{FailingStore, FailureMode};
