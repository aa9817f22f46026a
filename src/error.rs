//! Error types for the selection and failover engine.

use thiserror::Error;

/// Errors raised while forwarding a single request to a single endpoint.
///
/// These never reach the client directly; they drive the retry/failover
/// state machine in [`crate::dispatch`].
#[derive(Debug, Error)]
pub enum ForwardError {
    /// Transport-level failure (connection refused, reset, protocol error).
    #[error("upstream connection failed: {0}")]
    Connect(String),

    /// The endpoint did not answer within the forward timeout.
    #[error("upstream timed out after {0} ms")]
    Timeout(u64),

    /// The outbound request could not be built for this endpoint.
    #[error("invalid upstream request: {0}")]
    InvalidRequest(String),
}

/// Errors surfaced by the load balancer.
#[derive(Debug, Error)]
pub enum LbError {
    /// An endpoint address could not be parsed at registration time.
    #[error("invalid endpoint address {address:?}: {reason}")]
    AddressParse { address: String, reason: String },

    /// Every endpoint in the registry is marked dead.
    #[error("no live endpoint available")]
    NoLiveEndpoint,

    /// The request used up its failover budget. `last` is the error from
    /// the final endpoint tried, if any endpoint was tried at all.
    #[error("gave up after trying {attempts} endpoints")]
    AttemptsExhausted {
        attempts: u32,
        #[source]
        last: Option<ForwardError>,
    },
}

/// Result type for load balancer operations.
pub type LbResult<T> = Result<T, LbError>;
