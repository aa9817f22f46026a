//! Request dispatch with retry and failover.
//!
//! # Data Flow
//! ```text
//! load_balance(request)
//!     → dispatch(request, AttemptState)
//!         → budget check (Exhausted → 503)
//!         → selector.next_peer() (none → 503)
//!         → forward; on failure ask RetryPolicy:
//!             Retry     → sleep backoff, same endpoint
//!             FailOver  → mark endpoint dead, dispatch again with next state
//!             Exhausted → mark endpoint dead, 503
//! ```
//!
//! Dropping the future returned by [`Dispatcher::load_balance`] (client
//! disconnect, request timeout) abandons any pending retries.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Response, StatusCode};
use axum::response::IntoResponse;

use crate::error::{LbError, LbResult};
use crate::http::forward::Forwarder;
use crate::http::request::ProxyRequest;
use crate::load_balancer::{Endpoint, EndpointRegistry, RoundRobin, Selector};
use crate::observability::metrics;
use crate::resilience::{AttemptState, RetryPolicy, Transition};

/// Body sent with every 503 produced by the dispatcher.
pub const UNAVAILABLE_BODY: &str = "Service not available";

/// Result of one dispatch round.
enum Step {
    Done(Response<Body>),
    FailOver(AttemptState),
}

/// Routes requests across the registry, retrying and failing over.
#[derive(Debug)]
pub struct Dispatcher<F> {
    registry: Arc<EndpointRegistry>,
    selector: Box<dyn Selector>,
    forwarder: F,
    policy: RetryPolicy,
}

impl<F: Forwarder> Dispatcher<F> {
    pub fn new(registry: Arc<EndpointRegistry>, forwarder: F, policy: RetryPolicy) -> Self {
        Self {
            registry,
            selector: Box::new(RoundRobin::new()),
            forwarder,
            policy,
        }
    }

    pub fn with_selector(mut self, selector: impl Selector + 'static) -> Self {
        self.selector = Box::new(selector);
        self
    }

    pub fn registry(&self) -> &Arc<EndpointRegistry> {
        &self.registry
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Serve `request`, answering 503 when no endpoint can take it.
    pub async fn load_balance(&self, request: &ProxyRequest) -> Response<Body> {
        match self.try_load_balance(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(
                    request_id = %request.request_id(),
                    remote = %request.remote(),
                    path = %request.path(),
                    error = %e,
                    "Request failed"
                );
                service_unavailable()
            }
        }
    }

    /// Like [`Self::load_balance`] but reports why a request failed.
    pub async fn try_load_balance(&self, request: &ProxyRequest) -> LbResult<Response<Body>> {
        let mut state = AttemptState::new();
        loop {
            match self.dispatch(request, state).await? {
                Step::Done(response) => return Ok(response),
                Step::FailOver(next) => state = next,
            }
        }
    }

    async fn dispatch(&self, request: &ProxyRequest, state: AttemptState) -> LbResult<Step> {
        if !self.policy.admits(state) {
            tracing::warn!(
                remote = %request.remote(),
                path = %request.path(),
                attempts = state.attempts(),
                "Max attempts reached, terminating"
            );
            return Err(LbError::AttemptsExhausted {
                attempts: state.attempts(),
                last: None,
            });
        }

        let endpoint = self
            .selector
            .next_peer(&self.registry)
            .ok_or(LbError::NoLiveEndpoint)?;

        tracing::debug!(
            request_id = %request.request_id(),
            endpoint = %endpoint,
            attempts = state.attempts(),
            "Forwarding request"
        );

        let mut state = state;
        loop {
            let error = match self.forwarder.forward(&endpoint, request).await {
                Ok(response) => return Ok(Step::Done(response)),
                Err(e) => e,
            };

            tracing::error!(
                request_id = %request.request_id(),
                remote = %request.remote(),
                path = %request.path(),
                endpoint = %endpoint,
                phase = ?state.phase(),
                retries = state.retries(),
                attempts = state.attempts(),
                error = %error,
                "Upstream error"
            );
            metrics::record_forward_failure(endpoint.authority());

            match self.policy.on_failure(state) {
                Transition::Retry { state: next, delay } => {
                    metrics::record_retry();
                    tokio::time::sleep(delay).await;
                    state = next;
                }
                Transition::FailOver(next) => {
                    self.mark_dead(&endpoint);
                    metrics::record_failover();
                    tracing::info!(
                        remote = %request.remote(),
                        path = %request.path(),
                        attempts = next.attempts(),
                        "Attempting failover"
                    );
                    return Ok(Step::FailOver(next));
                }
                Transition::Exhausted(final_state) => {
                    self.mark_dead(&endpoint);
                    return Err(LbError::AttemptsExhausted {
                        attempts: final_state.attempts() + 1,
                        last: Some(error),
                    });
                }
            }
        }
    }

    fn mark_dead(&self, endpoint: &Endpoint) {
        endpoint.set_alive(false);
        metrics::record_endpoint_alive(endpoint.authority(), false);
        tracing::warn!(endpoint = %endpoint, status = "down", "Endpoint marked dead after retries");
    }
}

/// The fixed 503 answer for exhausted or fully dead pools.
pub fn service_unavailable() -> Response<Body> {
    (StatusCode::SERVICE_UNAVAILABLE, UNAVAILABLE_BODY).into_response()
}
