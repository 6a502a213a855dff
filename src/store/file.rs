//! JSON-file backed route store.
//!
//! # Responsibilities
//! - Persist the route collection as a single JSON array on disk
//! - Re-read the file on every operation (the file is the source of truth)
//! - Replace the file atomically on writes (temp file + rename)
//!
//! # Design Decisions
//! - A missing file is an empty collection, not an error
//! - Writes are serialized through an async mutex; reads are not
//! - IO and parse failures surface as `StoreError::Unavailable`

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use crate::store::{apply_update, check_insert, RouteRecord, RouteStore, RouteUpdate, StoreResult};

/// Route store persisted to a JSON document.
#[derive(Debug)]
pub struct JsonFileRouteStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileRouteStore {
    /// Open a store at `path`. The file is created on first write.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        tracing::info!(path = %path.display(), "Route store opened");
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> StoreResult<Vec<RouteRecord>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Vec::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_all(&self, records: &[RouteRecord]) -> StoreResult<()> {
        let json = serde_json::to_vec_pretty(records)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        tracing::debug!(path = %self.path.display(), routes = records.len(), "Route store written");
        Ok(())
    }
}

#[async_trait]
impl RouteStore for JsonFileRouteStore {
    async fn list_routes(&self) -> StoreResult<Vec<RouteRecord>> {
        self.read_all().await
    }

    async fn insert_route(&self, record: RouteRecord) -> StoreResult<RouteRecord> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.read_all().await?;
        check_insert(&records, &record)?;
        records.push(record.clone());
        self.write_all(&records).await?;
        Ok(record)
    }

    async fn update_route(&self, id: &str, update: &RouteUpdate) -> StoreResult<Option<RouteRecord>> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.read_all().await?;
        let updated = apply_update(&mut records, id, update)?;
        if updated.is_some() {
            self.write_all(&records).await?;
        }
        Ok(updated)
    }

    async fn delete_route(&self, id: &str) -> StoreResult<Option<RouteRecord>> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.read_all().await?;
        let Some(pos) = records.iter().position(|r| r.id == id) else {
            return Ok(None);
        };
        let deleted = records.remove(pos);
        self.write_all(&records).await?;
        Ok(Some(deleted))
    }
}
