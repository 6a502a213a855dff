//! Load balancing subsystem (static mode).
//!
//! # Data Flow
//! ```text
//! Static mode request (host ignored)
//!     → round_robin.rs (read origin at cursor, advance cursor)
//!     → Return origin, or none for an empty list
//! ```
//!
//! # Design Decisions
//! - Backend list is fixed at startup; no health filtering
//! - Cursor is process-local and starts at zero
//! - Fairness is approximate under concurrency (relaxed atomics)

pub mod round_robin;

pub use round_robin::RoundRobin;
