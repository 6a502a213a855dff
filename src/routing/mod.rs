//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (host header)
//!     → mod.rs (Resolver: subdomain table or static rotation)
//!     → table.rs (snapshot scan with matcher.rs)
//!     → Return: origin.rs Origin, or no match
//!
//! Table Reload (startup, admin mutation, store change):
//!     RouteStore::list_routes()
//!     → parse each URL into an Origin (skip unusable ones)
//!     → build snapshot off to the side
//!     → atomic swap
//! ```
//!
//! # Design Decisions
//! - Table rebuilt wholesale, never patched
//! - Lookups are lock-free and never touch the store
//! - First match wins (store order)

pub mod matcher;
pub mod origin;
pub mod table;

use std::sync::Arc;

use crate::load_balancer::round_robin::RoundRobin;

pub use matcher::{HostMatchStrategy, HostMatcher};
pub use origin::{Origin, OriginError};
pub use table::{ReloadReport, RouteEntry, RouteSnapshot, RoutingTable};

/// Picks the origin for an inbound request.
#[derive(Debug, Clone)]
pub enum Resolver {
    /// Match the request host against the dynamic routing table.
    Subdomain(Arc<RoutingTable>),
    /// Rotate through a fixed backend list, ignoring the host.
    Static(Arc<RoundRobin>),
}

impl Resolver {
    /// Resolve a target origin. `host` is the raw inbound host value.
    pub fn resolve(&self, host: Option<&str>) -> Option<Origin> {
        match self {
            Resolver::Subdomain(table) => {
                let (route_id, origin) = table.match_host(host?)?;
                tracing::debug!(route_id = %route_id, origin = %origin, "Route matched");
                Some(origin)
            }
            Resolver::Static(rotation) => rotation.next_origin(),
        }
    }

    /// Mode name for logs and status output.
    pub fn mode(&self) -> &'static str {
        match self {
            Resolver::Subdomain(_) => "subdomain",
            Resolver::Static(_) => "static",
        }
    }
}
