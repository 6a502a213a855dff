//! Response handling and transformation.
//!
//! # Responsibilities
//! - Relay the backend response to the client
//! - Map forwarding failures to bare proxy status responses
//!
//! # Design Decisions
//! - Streaming responses avoid buffering entire body
//! - Framing headers stripped; the server recomputes them
//! - No internal details in proxy error bodies (they go to the log)

use axum::body::Body;
use axum::http::{Response, StatusCode};
use axum::response::IntoResponse;
use hyper::body::Incoming;
use thiserror::Error;

use crate::security::headers::sanitize_response_headers;

/// Outcomes of the proxy path that do not produce an upstream response.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// No route selected by the request host (or no backend configured).
    #[error("no route matches host {0:?}")]
    NoMatchingRoute(Option<String>),

    /// The upstream did not respond before the deadline.
    #[error("upstream timed out after {0} seconds")]
    UpstreamTimeout(u64),

    /// Connection refused, DNS failure, TLS or protocol error, ...
    #[error("upstream unreachable: {0}")]
    UpstreamUnreachable(String),

    /// The outbound request could not be built from the inbound one.
    #[error("cannot build upstream request: {0}")]
    InvalidUpstreamRequest(String),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::NoMatchingRoute(_) => StatusCode::NOT_FOUND,
            ProxyError::UpstreamTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ProxyError::UpstreamUnreachable(_) | ProxyError::InvalidUpstreamRequest(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let reason = status.canonical_reason().unwrap_or("Error");
        (status, reason).into_response()
    }
}

/// Convert an upstream response into the response sent to the client.
pub fn relay_response(response: Response<Incoming>) -> Response<Body> {
    let (mut parts, body) = response.into_parts();
    sanitize_response_headers(&mut parts.headers);
    Response::from_parts(parts, Body::new(body))
}
