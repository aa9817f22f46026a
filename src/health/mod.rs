//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Active health checks (active.rs):
//!     Periodic timer
//!     → TCP connect to each endpoint
//!     → Overwrite endpoint liveness
//!
//! Failover path (dispatch.rs):
//!     Endpoint exhausts its retries
//!     → Marked dead immediately
//!     → Reinstated by the next successful probe
//! ```
//!
//! # Design Decisions
//! - Probes write liveness unconditionally; last writer wins
//! - No thresholds: one probe decides, so dead-marked endpoints recover in one tick
//! - The monitor is a cancellable task tied to the shutdown channel

pub mod active;

pub use active::HealthMonitor;
