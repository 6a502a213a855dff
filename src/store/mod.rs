//! Route store subsystem.
//!
//! # Data Flow
//! ```text
//! Admin service
//!     → RouteStore::insert_route / update_route / delete_route
//!     → memory.rs (process-local) or file.rs (JSON document on disk)
//!
//! Routing table reload
//!     → RouteStore::list_routes
//!     → full snapshot of persisted records
//! ```
//!
//! # Design Decisions
//! - The store is the source of truth; everything else is a derived cache
//! - Stores enforce uniqueness of `id` and `name`, nothing else
//! - No business validation here (URL/name checks live in the admin service)

pub mod file;
pub mod id;
pub mod memory;
pub mod types;
pub mod watcher;

use async_trait::async_trait;

pub use file::JsonFileRouteStore;
pub use memory::MemoryRouteStore;
pub use types::{NewRoute, RouteRecord, RouteUpdate, StoreError, StoreResult};

/// CRUD interface over the persisted collection of route records.
#[async_trait]
pub trait RouteStore: Send + Sync + std::fmt::Debug {
    /// Return every persisted record, in insertion order.
    async fn list_routes(&self) -> StoreResult<Vec<RouteRecord>>;

    /// Persist a new record. Fails on a duplicate `id` or `name`.
    async fn insert_route(&self, record: RouteRecord) -> StoreResult<RouteRecord>;

    /// Apply the supplied fields to the record with `id`.
    /// Returns `None` when no row matched.
    async fn update_route(&self, id: &str, update: &RouteUpdate) -> StoreResult<Option<RouteRecord>>;

    /// Remove the record with `id`, returning it if a row matched.
    async fn delete_route(&self, id: &str) -> StoreResult<Option<RouteRecord>>;
}

/// Apply an update to a record set in place, enforcing name uniqueness.
///
/// Shared by the store implementations so they agree on conflict semantics.
pub(crate) fn apply_update(
    records: &mut [RouteRecord],
    id: &str,
    update: &RouteUpdate,
) -> StoreResult<Option<RouteRecord>> {
    if let Some(name) = &update.name {
        if records.iter().any(|r| r.id != id && &r.name == name) {
            return Err(StoreError::DuplicateName(name.clone()));
        }
    }

    let Some(record) = records.iter_mut().find(|r| r.id == id) else {
        return Ok(None);
    };

    if let Some(name) = &update.name {
        record.name = name.clone();
    }
    if let Some(url) = &update.url {
        record.url = url.clone();
    }
    if let Some(active) = update.is_active {
        record.is_active = active;
    }
    Ok(Some(record.clone()))
}

/// Check an insert against the existing record set.
pub(crate) fn check_insert(records: &[RouteRecord], record: &RouteRecord) -> StoreResult<()> {
    if records.iter().any(|r| r.id == record.id) {
        return Err(StoreError::DuplicateId(record.id.clone()));
    }
    if records.iter().any(|r| r.name == record.name) {
        return Err(StoreError::DuplicateName(record.name.clone()));
    }
    Ok(())
}
