//! Request handling.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) for every inbound request
//! - Buffer the inbound request so retries and failovers can replay it
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Bodies are buffered up to a limit; larger bodies are rejected up front

use std::net::SocketAddr;

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, HeaderValue, Method, Request, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use http_body_util::LengthLimitError;
use thiserror::Error;
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Assigns a UUID v4 to requests that arrive without an `x-request-id`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Why an inbound body could not be buffered.
#[derive(Debug, Error)]
pub enum BufferError {
    #[error("request body exceeds {limit} bytes")]
    TooLarge { limit: usize },

    /// The client stream failed before the body was complete.
    #[error("failed to read request body: {0}")]
    Read(#[source] axum::Error),
}

impl BufferError {
    fn from_axum(error: axum::Error, limit: usize) -> Self {
        let over_limit = std::error::Error::source(&error).is_some_and(|e| e.is::<LengthLimitError>());
        if over_limit {
            BufferError::TooLarge { limit }
        } else {
            BufferError::Read(error)
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            BufferError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            BufferError::Read(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for BufferError {
    fn into_response(self) -> Response {
        let body = match self {
            BufferError::TooLarge { .. } => "Request body too large",
            BufferError::Read(_) => "Failed to read request body",
        };
        (self.status(), body).into_response()
    }
}

/// A fully buffered inbound request that can be forwarded more than once.
#[derive(Debug, Clone)]
pub struct ProxyRequest {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub remote_addr: Option<SocketAddr>,
}

impl ProxyRequest {
    /// Read `request`'s body (at most `limit` bytes) into memory.
    pub async fn buffer(
        request: Request<Body>,
        remote_addr: Option<SocketAddr>,
        limit: usize,
    ) -> Result<Self, BufferError> {
        let (parts, body) = request.into_parts();
        let body = axum::body::to_bytes(body, limit)
            .await
            .map_err(|e| BufferError::from_axum(e, limit))?;
        Ok(Self {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body,
            remote_addr,
        })
    }

    pub fn path(&self) -> &str {
        self.uri.path()
    }

    pub fn request_id(&self) -> &str {
        self.headers
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
    }

    /// Client address for logs; `-` when unknown.
    pub fn remote(&self) -> String {
        self.remote_addr
            .map(|a| a.to_string())
            .unwrap_or_else(|| "-".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_buffer_keeps_request() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/orders?id=7")
            .header(X_REQUEST_ID, "abc")
            .body(Body::from("payload"))
            .unwrap();

        let buffered = ProxyRequest::buffer(request, "10.0.0.9:5555".parse().ok(), 1024)
            .await
            .unwrap();

        assert_eq!(buffered.method, Method::POST);
        assert_eq!(buffered.path(), "/orders");
        assert_eq!(buffered.request_id(), "abc");
        assert_eq!(buffered.remote(), "10.0.0.9:5555");
        assert_eq!(&buffered.body[..], b"payload");

        // Clones replay the same body.
        assert_eq!(buffered.clone().body, buffered.body);
    }

    #[tokio::test]
    async fn test_buffer_rejects_oversized_body() {
        let request = Request::builder()
            .uri("/")
            .body(Body::from(vec![0u8; 64]))
            .unwrap();
        let err = ProxyRequest::buffer(request, None, 16).await.unwrap_err();
        assert!(matches!(err, BufferError::TooLarge { limit: 16 }));
        assert_eq!(err.into_response().status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_buffer_interrupted_body_is_bad_request() {
        let chunks: Vec<Result<Bytes, std::io::Error>> = vec![
            Ok(Bytes::from_static(b"partial")),
            Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "client went away")),
        ];
        let request = Request::builder()
            .uri("/")
            .body(Body::from_stream(futures_util::stream::iter(chunks)))
            .unwrap();

        let err = ProxyRequest::buffer(request, None, 1024).await.unwrap_err();
        assert!(matches!(err, BufferError::Read(_)));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_uuid_request_id() {
        let request = Request::builder().uri("/").body(()).unwrap();
        let id = UuidRequestId.make_request_id(&request).unwrap();
        let text = id.header_value().to_str().unwrap();
        assert!(Uuid::parse_str(text).is_ok());
    }
}
