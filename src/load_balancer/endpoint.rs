//! Endpoint abstraction.
//!
//! # Responsibilities
//! - Represent a single backend server
//! - Validate its address at registration time
//! - Track liveness (alive/dead) for the selector

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use url::Url;

use crate::error::{LbError, LbResult};

/// A single backend server.
#[derive(Debug)]
pub struct Endpoint {
    /// Target URL requests are forwarded to.
    url: Url,
    /// `host:port` used for connectivity probes.
    authority: String,
    /// Whether the selector may hand this endpoint out.
    alive: AtomicBool,
}

impl Endpoint {
    /// Parse and validate an endpoint address.
    ///
    /// Accepts absolute `http` URLs with a host. A missing port falls back
    /// to 80.
    pub fn parse(address: &str) -> LbResult<Self> {
        let invalid = |reason: String| LbError::AddressParse {
            address: address.to_string(),
            reason,
        };

        let url = Url::parse(address).map_err(|e| invalid(e.to_string()))?;
        if url.scheme() != "http" {
            return Err(invalid(format!("unsupported scheme {:?}", url.scheme())));
        }
        let host = url
            .host_str()
            .ok_or_else(|| invalid("missing host".to_string()))?;
        let port = url
            .port_or_known_default()
            .ok_or_else(|| invalid("missing port".to_string()))?;

        // IPv6 hosts keep their brackets in `host_str`.
        let authority = format!("{}:{}", host, port);

        Ok(Self {
            url,
            authority,
            alive: AtomicBool::new(true),
        })
    }

    /// The endpoint's target URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// `host:port` of the endpoint.
    pub fn authority(&self) -> &str {
        &self.authority
    }

    /// Overwrite the liveness flag.
    pub fn set_alive(&self, alive: bool) {
        self.alive.store(alive, Ordering::Release);
    }

    /// Last written liveness value.
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}
