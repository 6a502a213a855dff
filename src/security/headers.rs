//! Header manipulation for forwarded traffic.
//!
//! # Responsibilities
//! - Strip hop-by-hop headers (RFC 7230 §6.1) from forwarded requests
//! - Add X-Forwarded-Proto and X-Forwarded-Host
//! - Strip framing headers from relayed responses
//!
//! # Design Decisions
//! - The inbound Host is not forwarded; the client derives it from the target
//! - X-Forwarded-* values are overwritten, never appended
//! - Response framing (content-length, transfer-encoding) is recomputed by
//!   the server when streaming the body back

use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue};

/// Headers meaningful only for a single transport leg.
pub const HOP_BY_HOP: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailers",
    "transfer-encoding",
    "upgrade",
];

pub const X_FORWARDED_PROTO: HeaderName = HeaderName::from_static("x-forwarded-proto");
pub const X_FORWARDED_HOST: HeaderName = HeaderName::from_static("x-forwarded-host");

/// Build the header set for the outbound request.
pub fn sanitize_request_headers(inbound: &HeaderMap, scheme: &str) -> HeaderMap {
    let mut cleaned = inbound.clone();
    for name in HOP_BY_HOP {
        cleaned.remove(name);
    }
    cleaned.remove(header::HOST);

    let forwarded_host = inbound
        .get(header::HOST)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static(""));
    let forwarded_proto =
        HeaderValue::from_str(scheme).unwrap_or_else(|_| HeaderValue::from_static("http"));

    cleaned.insert(X_FORWARDED_PROTO, forwarded_proto);
    cleaned.insert(X_FORWARDED_HOST, forwarded_host);
    cleaned
}

/// Remove headers the server recomputes when streaming the response.
pub fn sanitize_response_headers(headers: &mut HeaderMap) {
    headers.remove(header::CONTENT_LENGTH);
    headers.remove(header::TRANSFER_ENCODING);
}
