//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Forward to endpoint fails:
//!     → retries.rs (decide: retry same endpoint / fail over / give up)
//!     → backoff.rs (fixed delay before a same-endpoint retry)
//! ```
//!
//! # Design Decisions
//! - Per-request counters are a plain value threaded through dispatch
//! - Same-endpoint retries do not consume the failover budget
//! - Backoff is constant; there is no exponential growth

pub mod backoff;
pub mod retries;

pub use retries::{AttemptPhase, AttemptState, RetryPolicy, Transition};
