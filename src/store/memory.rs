//! Process-local route store.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::store::{apply_update, check_insert, RouteRecord, RouteStore, RouteUpdate, StoreError, StoreResult};

/// A route store kept entirely in memory.
///
/// Used when no store file is configured, and by tests.
#[derive(Debug, Default)]
pub struct MemoryRouteStore {
    records: Mutex<Vec<RouteRecord>>,
}

impl MemoryRouteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with records.
    pub fn with_records(records: Vec<RouteRecord>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }

    fn lock(&self) -> StoreResult<std::sync::MutexGuard<'_, Vec<RouteRecord>>> {
        self.records
            .lock()
            .map_err(|_| StoreError::Unavailable("route store lock poisoned".into()))
    }
}

#[async_trait]
impl RouteStore for MemoryRouteStore {
    async fn list_routes(&self) -> StoreResult<Vec<RouteRecord>> {
        Ok(self.lock()?.clone())
    }

    async fn insert_route(&self, record: RouteRecord) -> StoreResult<RouteRecord> {
        let mut records = self.lock()?;
        check_insert(&records, &record)?;
        records.push(record.clone());
        Ok(record)
    }

    async fn update_route(&self, id: &str, update: &RouteUpdate) -> StoreResult<Option<RouteRecord>> {
        let mut records = self.lock()?;
        apply_update(&mut records, id, update)
    }

    async fn delete_route(&self, id: &str) -> StoreResult<Option<RouteRecord>> {
        let mut records = self.lock()?;
        Ok(records
            .iter()
            .position(|r| r.id == id)
            .map(|pos| records.remove(pos)))
    }
}
