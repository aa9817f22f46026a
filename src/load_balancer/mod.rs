//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Request arrives → dispatcher asks for a peer
//!     → round_robin.rs (advance shared cursor, skip dead endpoints)
//!     → registry.rs (fixed, ordered endpoint list + cursor)
//!     → endpoint.rs (atomic liveness flag)
//!     → Return endpoint or none when every endpoint is dead
//! ```
//!
//! # Design Decisions
//! - Selectors are stateless; the registry owns the rotation cursor
//! - Dead endpoints are skipped, never removed
//! - Liveness is eventually accurate; no global snapshot per selection

pub mod endpoint;
pub mod registry;
pub mod round_robin;

use std::fmt::Debug;
use std::sync::Arc;

pub use endpoint::Endpoint;
pub use registry::EndpointRegistry;
pub use round_robin::RoundRobin;

/// Strategy for picking the next endpoint out of a registry.
pub trait Selector: Debug + Send + Sync {
    /// Return the next live endpoint, or `None` if none is alive.
    fn next_peer(&self, registry: &EndpointRegistry) -> Option<Arc<Endpoint>>;
}
