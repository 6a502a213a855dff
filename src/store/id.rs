//! Route id generation.
//!
//! Ids double as subdomain labels, so they use a DNS-safe alphabet only.

/// Length of a generated route id.
pub const ROUTE_ID_LEN: usize = 8;

/// Generate a random route id of lowercase ASCII letters.
pub fn generate_route_id() -> String {
    (0..ROUTE_ID_LEN).map(|_| fastrand::lowercase()).collect()
}
