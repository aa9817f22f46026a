//! Fixed delay between same-endpoint retries.

use std::time::Duration;

/// Delay before the `retry`-th retry of an endpoint.
///
/// Constant: every retry waits `base_ms`, with no growth or jitter. Retry
/// zero is the initial forward and never waits.
pub fn calculate_backoff(retry: u32, base_ms: u64) -> Duration {
    if retry == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(base_ms)
}
