//! failover-proxy
//!
//! Round-robin HTTP load balancer built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                  ┌──────────────────────────────────────────────────────────┐
//!                  │                      FAILOVER PROXY                      │
//!                  │                                                          │
//!  Client Request  │  ┌─────────┐    ┌────────────┐    ┌──────────────┐       │
//!  ────────────────┼─▶│  http   │───▶│ dispatcher │───▶│ round robin  │       │
//!                  │  │ server  │    │ retry/fail │    │  selector    │       │
//!                  │  └─────────┘    │   over     │    └──────┬───────┘       │
//!                  │                 └─────┬──────┘           │               │
//!                  │                       │            ┌──────▼───────┐       │
//!                  │                       │            │   endpoint   │       │
//!                  │                       │            │   registry   │◀──┐   │
//!                  │                       ▼            └──────────────┘   │   │
//!  Client Response │  ┌─────────┐    ┌────────────┐                       │   │
//!  ◀───────────────┼──│ response│◀───│ forwarder  │◀──────────────────────┼───┼── Backend
//!                  │  └─────────┘    └────────────┘                       │   │
//!                  │                                  ┌──────────────┐    │   │
//!                  │                                  │health monitor│────┘   │
//!                  │                                  │ (TCP probes) │        │
//!                  │                                  └──────────────┘        │
//!                  └──────────────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use failover_proxy::config::{load_config, validation::validate_config, ConfigError, ProxyConfig};
use failover_proxy::observability::{logging, metrics};
use failover_proxy::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "failover-proxy")]
#[command(about = "Round-robin HTTP load balancer with health checks and failover", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Backend URL; repeat for each endpoint. Appended to any configured backends.
    #[arg(short, long = "backend")]
    backends: Vec<String>,

    /// Override the listener bind address.
    #[arg(long)]
    bind: Option<String>,
}

impl Cli {
    fn into_config(self) -> Result<ProxyConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => ProxyConfig::default(),
        };
        config.backends.extend(self.backends);
        if let Some(bind) = self.bind {
            config.listener.bind_address = bind;
        }
        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Cli::parse().into_config()?;

    logging::init(&config.observability.log_level);
    tracing::info!("failover-proxy v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        backends = config.backends.len(),
        health_interval_secs = config.health_check.interval_secs,
        max_retries = config.retries.max_retries,
        max_attempts = config.retries.max_attempts,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signal();

    let server = HttpServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
