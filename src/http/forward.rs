//! Forwarding requests to a single endpoint.
//!
//! # Responsibilities
//! - Rewrite the request URI onto the endpoint's base URL
//! - Strip hop-by-hop headers and add `X-Forwarded-For`
//! - Report transport errors and timeouts as [`ForwardError`]
//!
//! Any HTTP response, 5xx included, counts as a successful forward.

use std::future::Future;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, HeaderName, HeaderValue, Request, Response, Uri};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::time;
use url::Url;

use crate::error::ForwardError;
use crate::http::request::ProxyRequest;
use crate::load_balancer::Endpoint;

/// Delivers a request to one endpoint.
pub trait Forwarder: Send + Sync + 'static {
    fn forward(
        &self,
        endpoint: &Endpoint,
        request: &ProxyRequest,
    ) -> impl Future<Output = Result<Response<Body>, ForwardError>> + Send;
}

static HOP_BY_HOP: [HeaderName; 7] = [
    header::CONNECTION,
    header::HOST,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Forwarder backed by a pooled hyper client.
#[derive(Clone)]
pub struct HttpForwarder {
    client: Client<HttpConnector, Body>,
    timeout: Duration,
}

impl HttpForwarder {
    pub fn new(timeout: Duration) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self { client, timeout }
    }

    fn build_request(
        &self,
        endpoint: &Endpoint,
        request: &ProxyRequest,
    ) -> Result<Request<Body>, ForwardError> {
        let uri = upstream_uri(endpoint.url(), &request.uri)?;

        let mut builder = Request::builder().method(request.method.clone()).uri(uri);
        if let Some(headers) = builder.headers_mut() {
            for (name, value) in request.headers.iter() {
                if !HOP_BY_HOP.contains(name) {
                    headers.append(name.clone(), value.clone());
                }
            }
            if let Some(ip) = request.remote_addr.map(|a| a.ip().to_string()) {
                let forwarded = match request.headers.get(X_FORWARDED_FOR).and_then(|v| v.to_str().ok()) {
                    Some(prior) => format!("{}, {}", prior, ip),
                    None => ip,
                };
                if let Ok(value) = HeaderValue::from_str(&forwarded) {
                    headers.insert(X_FORWARDED_FOR, value);
                }
            }
        }

        builder
            .body(Body::from(request.body.clone()))
            .map_err(|e| ForwardError::InvalidRequest(e.to_string()))
    }
}

impl Forwarder for HttpForwarder {
    async fn forward(
        &self,
        endpoint: &Endpoint,
        request: &ProxyRequest,
    ) -> Result<Response<Body>, ForwardError> {
        let upstream = self.build_request(endpoint, request)?;

        match time::timeout(self.timeout, self.client.request(upstream)).await {
            Ok(Ok(response)) => {
                let (parts, body) = response.into_parts();
                Ok(Response::from_parts(parts, Body::new(body)))
            }
            Ok(Err(e)) => Err(ForwardError::Connect(e.to_string())),
            Err(_) => Err(ForwardError::Timeout(self.timeout.as_millis() as u64)),
        }
    }
}

/// Join the inbound path and query onto `base`.
///
/// `http://b:3000/api` + `/users?x=1` → `http://b:3000/api/users?x=1`.
pub fn upstream_uri(base: &Url, original: &Uri) -> Result<Uri, ForwardError> {
    let host = base
        .host_str()
        .ok_or_else(|| ForwardError::InvalidRequest(format!("endpoint {} has no host", base)))?;
    let authority = match base.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    };

    let mut target = format!(
        "{}://{}{}{}",
        base.scheme(),
        authority,
        base.path().trim_end_matches('/'),
        original.path()
    );
    match (base.query(), original.query()) {
        (Some(a), Some(b)) => target.push_str(&format!("?{}&{}", a, b)),
        (Some(q), None) | (None, Some(q)) => target.push_str(&format!("?{}", q)),
        (None, None) => {}
    }

    target
        .parse()
        .map_err(|e: axum::http::uri::InvalidUri| ForwardError::InvalidRequest(e.to_string()))
}
