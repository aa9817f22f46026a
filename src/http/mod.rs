//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID, buffer body for replay)
//!     → dispatch (pick endpoint, retry, fail over)
//!     → forward.rs (rewrite URI, send to endpoint)
//!     → Send response to client
//! ```

pub mod forward;
pub mod request;
pub mod server;

pub use forward::{Forwarder, HttpForwarder};
pub use request::{BufferError, ProxyRequest, UuidRequestId, X_REQUEST_ID};
pub use server::HttpServer;
