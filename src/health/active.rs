//! Active health checking.
//!
//! # Responsibilities
//! - Periodically probe every endpoint with a TCP connect
//! - Overwrite each endpoint's liveness with the probe outcome

use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::config::HealthCheckConfig;
use crate::load_balancer::EndpointRegistry;
use crate::observability::metrics;

pub struct HealthMonitor {
    registry: Arc<EndpointRegistry>,
    interval: Duration,
    timeout: Duration,
}

impl HealthMonitor {
    pub fn new(registry: Arc<EndpointRegistry>, config: &HealthCheckConfig) -> Self {
        Self {
            registry,
            interval: Duration::from_secs(config.interval_secs),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    /// Override the probe cadence (sub-second intervals in tests).
    pub fn with_timing(mut self, interval: Duration, timeout: Duration) -> Self {
        self.interval = interval;
        self.timeout = timeout;
        self
    }

    /// Run the monitor on its own task until `shutdown` fires.
    pub fn spawn(self, shutdown: broadcast::Receiver<()>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    /// Probe on every tick until shutdown. The first tick fires immediately.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            interval = ?self.interval,
            timeout = ?self.timeout,
            endpoints = self.registry.len(),
            "Health monitor starting"
        );

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    tracing::debug!("Starting health check");
                    self.check_all().await;
                    tracing::debug!(live = self.registry.live_count(), "Health check completed");
                }
                _ = shutdown.recv() => {
                    tracing::info!("Health monitor received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// Probe every endpoint once and record the outcome.
    pub async fn check_all(&self) {
        for endpoint in self.registry.iter() {
            let alive = probe(endpoint.authority(), self.timeout).await;
            let was_alive = endpoint.is_alive();
            endpoint.set_alive(alive);

            if alive != was_alive {
                tracing::info!(
                    endpoint = %endpoint,
                    status = if alive { "up" } else { "down" },
                    "Endpoint liveness changed"
                );
            }
            metrics::record_endpoint_alive(endpoint.authority(), alive);
        }
    }
}

/// TCP connect to `authority` within `timeout`.
pub async fn probe(authority: &str, timeout: Duration) -> bool {
    match time::timeout(timeout, TcpStream::connect(authority)).await {
        Ok(Ok(_stream)) => true,
        Ok(Err(e)) => {
            tracing::warn!(addr = %authority, error = %e, "Health check failed: connection error");
            false
        }
        Err(_) => {
            tracing::warn!(addr = %authority, "Health check failed: timeout");
            false
        }
    }
}
