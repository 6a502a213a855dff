//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing)
//!     → routing::Resolver (host → origin, or round robin)
//!     → request.rs (rewrite URI, sanitize headers, add X-Forwarded-*)
//!     → forward.rs (upstream call under deadline)
//!     → response.rs (strip hop-by-hop, relay status/headers/body)
//!     → Send to client
//! ```

pub mod forward;
pub mod request;
pub mod response;
pub mod server;

pub use forward::Forwarder;
pub use request::X_REQUEST_ID;
pub use response::ProxyError;
pub use server::HttpServer;
