//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → wait_for_signal resolves
//!
//! Shutdown (shutdown.rs):
//!     trigger → proxy stops accepting and drains
//!             → admin API stops
//!             → health monitor loop exits
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
