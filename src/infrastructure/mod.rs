//! Infrastructure layer - adapters for the application ports.
//!
//! This layer provides:
//! - Clock abstraction (system time vs mock)
//! - Key-value stores (in-memory and file-backed)

pub mod clock;
pub mod file_store;
pub mod storage;

/// Mock implementations for testing.
///
/// This module is only available when the `test-helpers` feature is enabled,
/// or during test builds.
///
/// ```toml
/// [dev-dependencies]
/// sitekit = { version = "*", features = ["test-helpers"] }
/// ```
#[cfg(any(test, feature = "test-helpers"))]
pub mod mocks;
