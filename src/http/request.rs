//! Request handling and transformation.
//!
//! # Responsibilities
//! - Extract routing-relevant information (host, scheme)
//! - Prepare the outbound request for the resolved origin
//! - Request ID generation and propagation layers
//!
//! # Design Decisions
//! - Body is streamed through untouched (never buffered)
//! - Method, path and query preserved verbatim
//! - HTTP version is left to the client connector

use axum::body::Body;
use axum::http::{header, Request, Uri};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

use crate::routing::Origin;
use crate::security::headers::sanitize_request_headers;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Inbound host: the Host header, falling back to the URI authority.
pub fn request_host<B>(request: &Request<B>) -> Option<String> {
    request
        .headers()
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
        .or_else(|| request.uri().authority().map(|a| a.to_string()))
}

/// Scheme the client used to reach the proxy.
pub fn request_scheme<B>(request: &Request<B>) -> &str {
    request.uri().scheme_str().unwrap_or("http")
}

/// Request ID of an inbound request, for log correlation.
pub fn request_id<B>(request: &Request<B>) -> String {
    request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

/// Rewrite an inbound request into the request sent to `origin`.
pub fn prepare_outbound(origin: &Origin, request: Request<Body>) -> Result<Request<Body>, axum::http::Error> {
    let scheme = request_scheme(&request).to_string();
    let (parts, body) = request.into_parts();
    let uri: Uri = origin.uri_for(&parts.uri)?;

    let mut outbound = Request::builder()
        .method(parts.method)
        .uri(uri)
        .body(body)?;
    *outbound.headers_mut() = sanitize_request_headers(&parts.headers, &scheme);
    Ok(outbound)
}

/// Layer that assigns an `x-request-id` (UUID v4) to requests lacking one.
pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::x_request_id(MakeRequestUuid)
}

/// Layer that copies the request's `x-request-id` onto the response.
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::x_request_id()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Method;

    #[test]
    fn test_request_host_prefers_header() {
        let req = Request::builder()
            .uri("http://fallback.example.com/x")
            .header("Host", "ab12cd34.proxy.example.com")
            .body(())
            .unwrap();
        assert_eq!(request_host(&req).as_deref(), Some("ab12cd34.proxy.example.com"));

        let req = Request::builder()
            .uri("http://fallback.example.com/x")
            .body(())
            .unwrap();
        assert_eq!(request_host(&req).as_deref(), Some("fallback.example.com"));

        let req = Request::builder().uri("/x").body(()).unwrap();
        assert!(request_host(&req).is_none());
    }

    #[tokio::test]
    async fn test_prepare_outbound() {
        let origin = Origin::parse("http://10.0.0.1:8080").unwrap();
        let inbound = Request::builder()
            .method(Method::POST)
            .uri("/orders/7?expand=items")
            .header("Host", "ab12cd34.proxy.example.com")
            .header("Connection", "close")
            .header("Content-Type", "application/json")
            .body(Body::from(r#"{"qty":3}"#))
            .unwrap();

        let outbound = prepare_outbound(&origin, inbound).unwrap();
        assert_eq!(outbound.method(), Method::POST);
        assert_eq!(outbound.uri().to_string(), "http://10.0.0.1:8080/orders/7?expand=items");
        assert!(outbound.headers().get("connection").is_none());
        assert!(outbound.headers().get("host").is_none());
        assert_eq!(outbound.headers().get("x-forwarded-host").unwrap(), "ab12cd34.proxy.example.com");
        assert_eq!(outbound.headers().get("x-forwarded-proto").unwrap(), "http");
        assert_eq!(outbound.headers().get("content-type").unwrap(), "application/json");

        let body = axum::body::to_bytes(outbound.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], br#"{"qty":3}"#);
    }
}
