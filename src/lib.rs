//! Round-robin HTTP load balancer with liveness gating, retry and failover.

pub mod admin;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod load_balancer;
pub mod observability;
pub mod resilience;

pub use config::schema::ProxyConfig;
pub use dispatch::Dispatcher;
pub use error::{ForwardError, LbError};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
