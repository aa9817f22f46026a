//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the endpoint registry and dispatcher from configuration
//! - Create the Axum router with a catch-all proxy handler
//! - Wire up middleware (tracing, timeout, request ID)
//! - Run the health monitor and optional admin API alongside the proxy
//! - Shut everything down on the shared shutdown signal

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::admin::{setup_admin_router, AdminState};
use crate::config::ProxyConfig;
use crate::dispatch::Dispatcher;
use crate::error::LbResult;
use crate::health::HealthMonitor;
use crate::http::forward::HttpForwarder;
use crate::http::request::{ProxyRequest, UuidRequestId};
use crate::load_balancer::EndpointRegistry;
use crate::observability::metrics;
use crate::resilience::RetryPolicy;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher<HttpForwarder>>,
    pub max_body_bytes: usize,
}

/// HTTP server for the load-balancing proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
    registry: Arc<EndpointRegistry>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    ///
    /// Fails if any configured backend address is malformed.
    pub fn new(config: ProxyConfig) -> LbResult<Self> {
        let registry = Arc::new(EndpointRegistry::from_addresses(&config.backends)?);
        let forwarder = HttpForwarder::new(Duration::from_secs(config.timeouts.forward_secs));
        let dispatcher = Dispatcher::new(
            registry.clone(),
            forwarder,
            RetryPolicy::from(&config.retries),
        );

        let state = AppState {
            dispatcher: Arc::new(dispatcher),
            max_body_bytes: config.listener.max_body_bytes,
        };

        let router = Self::build_router(&config, state);
        Ok(Self {
            router,
            config,
            registry,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
            .layer(TraceLayer::new_for_http())
    }

    /// Run until `shutdown` fires, accepting connections on `listener`.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            endpoints = self.registry.len(),
            "HTTP server starting"
        );

        // Bind before spawning anything so a bind error leaves no task behind.
        let admin_listener = if self.config.admin.enabled {
            let admin_listener = TcpListener::bind(&self.config.admin.bind_address).await?;
            tracing::info!(address = %admin_listener.local_addr()?, "Admin API listening");
            Some(admin_listener)
        } else {
            None
        };

        let monitor = if self.config.health_check.enabled {
            let monitor = HealthMonitor::new(self.registry.clone(), &self.config.health_check);
            Some(monitor.spawn(shutdown.resubscribe()))
        } else {
            tracing::info!("Active health checks disabled");
            None
        };

        let admin = if let Some(admin_listener) = admin_listener {
            let app = setup_admin_router(AdminState::new(
                self.registry.clone(),
                &self.config.admin.api_key,
            ));
            let mut admin_shutdown = shutdown.resubscribe();
            Some(tokio::spawn(async move {
                let result = axum::serve(admin_listener, app)
                    .with_graceful_shutdown(async move {
                        let _ = admin_shutdown.recv().await;
                    })
                    .await;
                if let Err(e) = result {
                    tracing::error!(error = %e, "Admin API stopped with error");
                }
            }))
        } else {
            None
        };

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        let served = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await;

        // Normally already finished via the shutdown channel; this covers serve errors.
        for task in monitor.into_iter().chain(admin) {
            task.abort();
        }

        served?;
        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// The shared endpoint registry.
    pub fn registry(&self) -> &Arc<EndpointRegistry> {
        &self.registry
    }
}

/// Main proxy handler.
/// Buffers the request and hands it to the dispatcher.
async fn proxy_handler(
    State(state): State<AppState>,
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Response {
    let start_time = Instant::now();

    let request = match ProxyRequest::buffer(request, Some(remote), state.max_body_bytes).await {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!(remote = %remote, error = %e, "Failed to read request body");
            metrics::record_request(e.status().as_u16(), start_time);
            return e.into_response();
        }
    };

    tracing::debug!(
        request_id = %request.request_id(),
        method = %request.method,
        path = %request.path(),
        "Proxying request"
    );

    let response = state.dispatcher.load_balance(&request).await;
    metrics::record_request(response.status().as_u16(), start_time);
    response
}
