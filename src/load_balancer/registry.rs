//! Endpoint registry.
//!
//! # Responsibilities
//! - Hold the ordered, fixed set of endpoints
//! - Own the shared rotation cursor used by the selector
//! - Validate addresses on registration

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use crate::error::LbResult;
use crate::load_balancer::endpoint::Endpoint;

/// Ordered collection of endpoints plus the rotation cursor.
///
/// Membership is built with [`EndpointRegistry::add_endpoint`] before the
/// registry is shared; afterwards only liveness flags and the cursor change.
#[derive(Debug, Default)]
pub struct EndpointRegistry {
    endpoints: Vec<Arc<Endpoint>>,
    cursor: AtomicUsize,
}

impl EndpointRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a list of addresses, failing on the first
    /// malformed one.
    pub fn from_addresses<I, S>(addresses: I) -> LbResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut registry = Self::new();
        for address in addresses {
            registry.add_endpoint(address.as_ref())?;
        }
        Ok(registry)
    }

    /// Parse `address` and append it to the rotation.
    pub fn add_endpoint(&mut self, address: &str) -> LbResult<()> {
        let endpoint = Endpoint::parse(address)?;
        tracing::info!(endpoint = %endpoint, "Endpoint registered");
        self.endpoints.push(Arc::new(endpoint));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Arc<Endpoint>> {
        self.endpoints.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Arc<Endpoint>> {
        self.endpoints.iter()
    }

    /// Number of endpoints currently marked alive.
    pub fn live_count(&self) -> usize {
        self.endpoints.iter().filter(|e| e.is_alive()).count()
    }

    pub(crate) fn cursor(&self) -> &AtomicUsize {
        &self.cursor
    }

    /// Registry whose cursor starts at `start` instead of zero.
    #[cfg(test)]
    pub(crate) fn with_cursor(mut self, start: usize) -> Self {
        self.cursor = AtomicUsize::new(start);
        self
    }
}
