//! Subdomain-routing reverse proxy library.
//!
//! Requests are routed by the leading label of their `Host` header to a
//! backend registered through the admin API, or rotated across a fixed
//! backend list in static mode.

pub mod admin;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod load_balancer;
pub mod observability;
pub mod routing;
pub mod security;
pub mod store;

pub use admin::RouteAdminService;
pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::RoutingTable;
