//! Retry and failover decisions.
//!
//! # State Machine
//! ```text
//! Attempting ──fail, retries < max_retries──▶ RetryingSameEndpoint ──fail──▶ ...
//!     │
//!     └──fail, retries exhausted──▶ FailingOver ──(budget left)──▶ Attempting (next endpoint)
//!                                        │
//!                                        └──(no budget)──▶ Exhausted
//! ```
//!
//! `retries` counts immediate re-forwards to the current endpoint and resets
//! on failover. `attempts` counts failovers and never resets within a
//! request, so a request touches at most `max_attempts` endpoints.

use std::time::Duration;

use crate::config::RetryConfig;
use crate::resilience::backoff::calculate_backoff;

/// Per-request retry/failover counters.
///
/// Immutable; every transition yields a new value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttemptState {
    retries: u32,
    attempts: u32,
}

impl AttemptState {
    /// Initial state of a fresh request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Same-endpoint retries performed against the current endpoint.
    pub fn retries(&self) -> u32 {
        self.retries
    }

    /// Failovers performed so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Phase a forward made under this state belongs to.
    pub fn phase(&self) -> AttemptPhase {
        if self.retries == 0 {
            AttemptPhase::Attempting
        } else {
            AttemptPhase::RetryingSameEndpoint
        }
    }

    fn retried(self) -> Self {
        Self {
            retries: self.retries + 1,
            ..self
        }
    }

    fn failed_over(self) -> Self {
        Self {
            retries: 0,
            attempts: self.attempts + 1,
        }
    }
}

/// Phase of a request within the retry/failover state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptPhase {
    Attempting,
    RetryingSameEndpoint,
    FailingOver,
    Exhausted,
}

/// Outcome of a forwarding failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Wait `delay`, then forward to the same endpoint again.
    Retry { state: AttemptState, delay: Duration },
    /// Mark the endpoint dead and dispatch again with `state`.
    FailOver(AttemptState),
    /// Mark the endpoint dead and give up.
    Exhausted(AttemptState),
}

impl Transition {
    pub fn phase(&self) -> AttemptPhase {
        match self {
            Transition::Retry { .. } => AttemptPhase::RetryingSameEndpoint,
            Transition::FailOver(_) => AttemptPhase::FailingOver,
            Transition::Exhausted(_) => AttemptPhase::Exhausted,
        }
    }

    /// Whether the current endpoint must be marked dead.
    pub fn abandons_endpoint(&self) -> bool {
        !matches!(self, Transition::Retry { .. })
    }
}

/// Retry budget shared by every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Immediate retries against one endpoint before it is declared dead.
    pub max_retries: u32,
    /// Distinct endpoints a single request may try.
    pub max_attempts: u32,
    /// Fixed delay before each same-endpoint retry.
    pub backoff_ms: u64,
}

impl RetryPolicy {
    pub const MAX_RETRIES: u32 = 3;
    pub const MAX_ATTEMPTS: u32 = 3;
    pub const BACKOFF_MS: u64 = 10;

    pub fn new(max_retries: u32, max_attempts: u32, backoff_ms: u64) -> Self {
        Self {
            max_retries,
            max_attempts,
            backoff_ms,
        }
    }

    /// Whether a dispatch with `state` may forward at all.
    pub fn admits(&self, state: AttemptState) -> bool {
        state.attempts < self.max_attempts
    }

    /// Decide what happens after the endpoint chosen under `state` failed.
    pub fn on_failure(&self, state: AttemptState) -> Transition {
        if state.retries < self.max_retries {
            let next = state.retried();
            return Transition::Retry {
                state: next,
                delay: calculate_backoff(next.retries, self.backoff_ms),
            };
        }

        let next = state.failed_over();
        if self.admits(next) {
            Transition::FailOver(next)
        } else {
            Transition::Exhausted(state)
        }
    }

    /// Upper bound on forwards performed for one request.
    pub fn max_forwards(&self) -> u32 {
        self.max_attempts * (self.max_retries + 1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(Self::MAX_RETRIES, Self::MAX_ATTEMPTS, Self::BACKOFF_MS)
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self::new(config.max_retries, config.max_attempts, config.backoff_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retries_same_endpoint_first() {
        let policy = RetryPolicy::default();
        let mut state = AttemptState::new();
        assert_eq!(state.phase(), AttemptPhase::Attempting);

        for expected in 1..=3 {
            match policy.on_failure(state) {
                Transition::Retry { state: next, delay } => {
                    assert_eq!(next.retries(), expected);
                    assert_eq!(next.attempts(), 0);
                    assert_eq!(delay, Duration::from_millis(10));
                    assert_eq!(next.phase(), AttemptPhase::RetryingSameEndpoint);
                    state = next;
                }
                other => panic!("expected retry, got {:?}", other),
            }
        }

        let t = policy.on_failure(state);
        assert_eq!(t.phase(), AttemptPhase::FailingOver);
        assert!(t.abandons_endpoint());
        match t {
            Transition::FailOver(next) => {
                assert_eq!(next.retries(), 0);
                assert_eq!(next.attempts(), 1);
                assert_eq!(next.phase(), AttemptPhase::Attempting);
            }
            other => panic!("expected failover, got {:?}", other),
        }
    }

    #[test]
    fn test_worst_case_forward_count() {
        let policy = RetryPolicy::default();
        let mut state = AttemptState::new();
        let mut forwards = 0;

        loop {
            assert!(policy.admits(state));
            forwards += 1;
            match policy.on_failure(state) {
                Transition::Retry { state: next, .. } | Transition::FailOver(next) => state = next,
                Transition::Exhausted(_) => break,
            }
        }

        assert_eq!(forwards, 12);
        assert_eq!(forwards, policy.max_forwards());
        assert_eq!(state.attempts(), 2);
    }

    #[test]
    fn test_no_retries_configured() {
        let policy = RetryPolicy::new(0, 2, 10);
        let t = policy.on_failure(AttemptState::new());
        assert!(matches!(t, Transition::FailOver(s) if s.attempts() == 1));

        let t = policy.on_failure(AttemptState::new().failed_over());
        assert_eq!(t.phase(), AttemptPhase::Exhausted);
    }

    #[test]
    fn test_admits_respects_budget() {
        let policy = RetryPolicy::new(3, 1, 10);
        assert!(policy.admits(AttemptState::new()));
        assert!(!policy.admits(AttemptState::new().failed_over()));

        let zero = RetryPolicy::new(3, 0, 10);
        assert!(!zero.admits(AttemptState::new()));
    }
}
