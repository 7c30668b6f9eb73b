//! Cooldown gate used by the throttle wrapper.
//!
//! The gate is pure state: it never reads a clock itself. Callers pass the
//! current instant in, which keeps the leading-edge logic testable with
//! hand-built timestamps.

use std::time::{Duration, Instant};

/// Decision made for a single call to a rate-controlled wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallDecision {
    /// The action runs for this call
    Fire,
    /// The call is discarded without running the action
    Drop,
}

impl CallDecision {
    /// Check if this decision is Fire.
    pub fn is_fire(&self) -> bool {
        matches!(self, CallDecision::Fire)
    }

    /// Check if this decision is Drop.
    pub fn is_drop(&self) -> bool {
        matches!(self, CallDecision::Drop)
    }
}

/// Where the gate stands between calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GateState {
    Open,
    ClosedUntil(Instant),
    /// The cooldown end is past what `Instant` can represent
    ClosedForever,
}

/// Leading-edge cooldown gate.
///
/// The first call observed while the gate is open passes and closes the gate
/// for `limit`. Every call that arrives before the cooldown ends is dropped.
///
/// # Example
/// ```
/// use sitekit::{CallDecision, ThrottleGate};
/// use std::time::{Duration, Instant};
///
/// let mut gate = ThrottleGate::new(Duration::from_millis(100));
/// let t0 = Instant::now();
///
/// assert_eq!(gate.try_pass(t0), CallDecision::Fire);
/// assert_eq!(gate.try_pass(t0 + Duration::from_millis(10)), CallDecision::Drop);
/// assert_eq!(gate.try_pass(t0 + Duration::from_millis(50)), CallDecision::Drop);
///
/// // Cooldown over, the next call passes again
/// assert_eq!(gate.try_pass(t0 + Duration::from_millis(100)), CallDecision::Fire);
/// ```
#[derive(Debug, Clone)]
pub struct ThrottleGate {
    limit: Duration,
    state: GateState,
}

impl ThrottleGate {
    /// Create an open gate with the given cooldown.
    pub fn new(limit: Duration) -> Self {
        Self {
            limit,
            state: GateState::Open,
        }
    }

    /// Register a call at `now` and decide whether it passes.
    pub fn try_pass(&mut self, now: Instant) -> CallDecision {
        if !self.is_open(now) {
            return CallDecision::Drop;
        }

        self.state = if self.limit.is_zero() {
            GateState::Open
        } else {
            match now.checked_add(self.limit) {
                Some(until) => GateState::ClosedUntil(until),
                None => GateState::ClosedForever,
            }
        };
        CallDecision::Fire
    }

    /// Whether a call at `now` would pass.
    pub fn is_open(&self, now: Instant) -> bool {
        match self.state {
            GateState::Open => true,
            GateState::ClosedUntil(until) => now >= until,
            GateState::ClosedForever => false,
        }
    }

    /// Time left until the gate reopens, zero if already open.
    ///
    /// A gate that can never reopen reports `Duration::MAX`.
    pub fn remaining(&self, now: Instant) -> Duration {
        match self.state {
            GateState::Open => Duration::ZERO,
            GateState::ClosedUntil(until) => until.saturating_duration_since(now),
            GateState::ClosedForever => Duration::MAX,
        }
    }

    /// The cooldown applied after each passing call.
    pub fn limit(&self) -> Duration {
        self.limit
    }

    /// Reopen the gate immediately.
    pub fn reset(&mut self) {
        self.state = GateState::Open;
    }
}
