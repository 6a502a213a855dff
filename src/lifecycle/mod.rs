//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Config → Open store → Build server → Watch store → Bind listeners → Serve
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Broadcast → Listeners stop accepting → Drain → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//!     SIGHUP → Reload the routing table
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then store and table, then listeners
//! - Fail fast: bind and watcher errors are fatal at startup
//! - Route load errors at startup are not fatal; the table starts empty

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{run, StartupError};
