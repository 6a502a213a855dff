//! Host matching logic.
//!
//! # Responsibilities
//! - Decide whether an inbound hostname selects a given route key
//! - Normalize hostnames (lowercase, port stripped) before matching
//!
//! # Design Decisions
//! - Matching is evaluated in table order; the first matching key wins
//! - `ContainsMatcher` is the default: a key matches when it appears anywhere
//!   in the hostname. A key that is a substring of another key, or that
//!   occurs in an unrelated label, can select the wrong route.
//! - `LeftmostLabelMatcher` compares the key to the leftmost label only and
//!   must be opted into through configuration

use serde::{Deserialize, Serialize};

/// Trait for matching a hostname against a route key.
pub trait HostMatcher: Send + Sync + std::fmt::Debug {
    /// Returns true if `host` (already normalized) selects `key`.
    fn matches(&self, host: &str, key: &str) -> bool;
}

/// Strategy names accepted in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostMatchStrategy {
    /// Key appears anywhere in the hostname.
    #[default]
    Contains,
    /// Key equals the leftmost hostname label.
    LeftmostLabel,
}

impl HostMatchStrategy {
    /// Build the matcher for this strategy.
    pub fn build(self, base_domain: &str) -> Box<dyn HostMatcher> {
        match self {
            HostMatchStrategy::Contains => Box::new(ContainsMatcher),
            HostMatchStrategy::LeftmostLabel => Box::new(LeftmostLabelMatcher::new(base_domain)),
        }
    }
}

/// Lowercase a host and strip any port.
pub fn normalize_host(host: &str) -> String {
    let host = host.trim();
    let without_port = if host.starts_with('[') {
        // [v6]:port
        match host.find(']') {
            Some(end) => &host[..=end],
            None => host,
        }
    } else {
        host.split(':').next().unwrap_or(host)
    };
    without_port.to_lowercase()
}

/// Substring containment match.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContainsMatcher;

impl HostMatcher for ContainsMatcher {
    fn matches(&self, host: &str, key: &str) -> bool {
        !key.is_empty() && host.contains(key)
    }
}

/// Exact match against the leftmost label.
///
/// When a base domain is configured the host must end with it, and the label
/// is taken from what precedes it.
#[derive(Debug, Clone)]
pub struct LeftmostLabelMatcher {
    base_domain: String,
}

impl LeftmostLabelMatcher {
    pub fn new(base_domain: impl Into<String>) -> Self {
        Self {
            base_domain: base_domain.into().trim_start_matches('.').to_lowercase(),
        }
    }

    fn label<'a>(&self, host: &'a str) -> Option<&'a str> {
        let subdomain = if self.base_domain.is_empty() {
            host
        } else {
            host.strip_suffix(self.base_domain.as_str())?.strip_suffix('.')?
        };
        subdomain.split('.').next().filter(|l| !l.is_empty())
    }
}

impl HostMatcher for LeftmostLabelMatcher {
    fn matches(&self, host: &str, key: &str) -> bool {
        self.label(host) == Some(key)
    }
}
