//! Route record types and store error definitions.

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// A persisted route: generated id → named target URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRecord {
    /// Generated identifier, also the subdomain label used in request hosts.
    pub id: String,
    /// Unique human label.
    pub name: String,
    /// Absolute origin URL requests are forwarded to.
    pub url: String,
    /// Inactive routes are kept but never resolved.
    #[serde(default = "default_active", deserialize_with = "flag")]
    pub is_active: bool,
}

/// Payload for creating a route. The id is never client-supplied.
#[derive(Debug, Clone, Deserialize)]
pub struct NewRoute {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
}

/// Partial update of a route record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "optional_flag", skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl RouteUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.url.is_none() && self.is_active.is_none()
    }
}

fn default_active() -> bool {
    true
}

/// Boolean flags arrive either as JSON booleans or as the integers 0/1.
#[derive(Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Int(i64),
}

impl From<Flag> for bool {
    fn from(flag: Flag) -> Self {
        match flag {
            Flag::Bool(b) => b,
            Flag::Int(i) => i != 0,
        }
    }
}

fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    Flag::deserialize(d).map(bool::from)
}

fn optional_flag<'de, D: Deserializer<'de>>(d: D) -> Result<Option<bool>, D::Error> {
    Option::<Flag>::deserialize(d).map(|f| f.map(bool::from))
}

/// Errors surfaced by route store implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Another record already uses this name.
    #[error("route name already exists: {0}")]
    DuplicateName(String),

    /// Another record already uses this id.
    #[error("route id already exists: {0}")]
    DuplicateId(String),

    /// The backing storage could not be read or written.
    #[error("route store unavailable: {0}")]
    Unavailable(String),
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Unavailable(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Unavailable(format!("corrupt route document: {}", e))
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
