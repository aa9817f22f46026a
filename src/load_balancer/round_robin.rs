//! Round-robin endpoint selection.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use crate::load_balancer::{endpoint::Endpoint, registry::EndpointRegistry, Selector};

/// Round-robin selector gated on liveness.
///
/// Rotation state lives in the registry's cursor, so any number of
/// `RoundRobin` values over the same registry share one rotation.
#[derive(Debug, Default, Clone, Copy)]
pub struct RoundRobin;

impl RoundRobin {
    pub fn new() -> Self {
        Self
    }
}

impl Selector for RoundRobin {
    fn next_peer(&self, registry: &EndpointRegistry) -> Option<Arc<Endpoint>> {
        let len = registry.len();
        if len == 0 {
            return None;
        }

        // The cursor stays in [0, len) so it never wraps.
        let cursor = registry.cursor();
        let start = cursor
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |c| Some((c % len + 1) % len))
            .unwrap_or_else(|c| c)
            % len;

        // len + 1 probes: a full wrap back onto the starting index.
        for offset in 0..=len {
            let index = (start + offset) % len;
            let endpoint = registry.get(index)?;
            if endpoint.is_alive() {
                if index != start {
                    // Resume rotation just past the endpoint we skipped to.
                    cursor.store((index + 1) % len, Ordering::Relaxed);
                }
                return Some(endpoint.clone());
            }
        }
        None
    }
}
