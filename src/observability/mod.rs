//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events with structured fields (route_id, request_id, origin)
//!     → logging.rs (filter + formatter, stdout)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Request ID flows through the proxy span and the forwarded request
//! - `RUST_LOG` overrides the configured level

pub mod logging;

pub use logging::init_tracing;
