//! Domain layer - pure decision logic with no runtime dependencies.
//!
//! This layer contains:
//! - The throttle cooldown gate and per-call decisions
//! - Outcome types for cache reads and writes
//!
//! Nothing here reads a clock or touches a store.

pub mod gate;
pub mod outcome;
