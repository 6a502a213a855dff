//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → headers.rs (drop hop-by-hop and Host, add X-Forwarded-*)
//!     → Forward upstream
//!
//! Upstream response:
//!     → headers.rs (drop framing headers)
//!     → Relay to client
//! ```
//!
//! # Design Decisions
//! - No trust in client-supplied forwarding headers; they are overwritten
//! - The outbound Host comes from the target origin

pub mod headers;
