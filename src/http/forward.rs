//! Upstream forwarding.
//!
//! # Responsibilities
//! - Send one prepared request to the resolved origin
//! - Enforce the per-request deadline
//! - Classify failures (timeout vs transport) for status mapping
//!
//! # Design Decisions
//! - Exactly one attempt per inbound request, no retries
//! - The deadline covers connect + request + response head; the body is
//!   streamed afterwards
//! - Redirects are never followed; the client sees them verbatim
//! - One connector serves both `http` and `https` origins; certificates are
//!   verified against the bundled webpki roots

use axum::body::Body;
use axum::http::{Request, Response};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use std::fmt;
use std::time::{Duration, Instant};

use crate::http::request::{prepare_outbound, request_id};
use crate::http::response::{relay_response, ProxyError};
use crate::routing::Origin;

/// Forwards requests to upstream origins.
#[derive(Clone)]
pub struct Forwarder {
    client: Client<HttpsConnector<HttpConnector>, Body>,
    deadline: Duration,
}

impl fmt::Debug for Forwarder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Forwarder").field("deadline", &self.deadline).finish()
    }
}

impl Forwarder {
    pub fn new(deadline: Duration) -> Self {
        let connector = HttpsConnectorBuilder::new()
            .with_webpki_roots()
            .https_or_http()
            .enable_http1()
            .build();
        let client = Client::builder(TokioExecutor::new()).build(connector);
        Self { client, deadline }
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Forward `request` to `origin` and relay the response.
    pub async fn forward(&self, origin: &Origin, request: Request<Body>) -> Result<Response<Body>, ProxyError> {
        let start = Instant::now();
        let request_id = request_id(&request);
        let method = request.method().clone();

        let outbound = prepare_outbound(origin, request).map_err(|e| {
            tracing::error!(request_id = %request_id, origin = %origin, error = %e, "Failed to build upstream request");
            ProxyError::InvalidUpstreamRequest(e.to_string())
        })?;
        let target = outbound.uri().clone();

        match tokio::time::timeout(self.deadline, self.client.request(outbound)).await {
            Ok(Ok(response)) => {
                tracing::debug!(
                    request_id = %request_id,
                    method = %method,
                    target = %target,
                    status = %response.status(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Upstream responded"
                );
                Ok(relay_response(response))
            }
            Ok(Err(e)) => {
                tracing::error!(request_id = %request_id, target = %target, error = %e, "Upstream error");
                Err(ProxyError::UpstreamUnreachable(e.to_string()))
            }
            Err(_) => {
                tracing::warn!(
                    request_id = %request_id,
                    target = %target,
                    deadline_secs = self.deadline.as_secs(),
                    "Upstream timed out"
                );
                Err(ProxyError::UpstreamTimeout(self.deadline.as_secs()))
            }
        }
    }
}
