//! Dynamic routing table.
//!
//! # Responsibilities
//! - Hold the current route id → origin mapping as an immutable snapshot
//! - Rebuild the snapshot wholesale from the route store on `reload()`
//! - Serve lock-free lookups to concurrent proxy requests
//!
//! # Design Decisions
//! - Snapshots are swapped atomically (`ArcSwap`); a lookup sees either the
//!   old table or the new one, never a mix
//! - Reloads are serialized so an older store read cannot replace a newer one
//! - Records with unusable URLs are skipped, not fatal
//! - On store failure the previous snapshot stays in place

use arc_swap::ArcSwap;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::routing::matcher::{normalize_host, HostMatcher};
use crate::routing::origin::Origin;
use crate::store::{RouteStore, StoreResult};

/// One routable entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    pub id: String,
    pub origin: Origin,
    pub active: bool,
}

/// An immutable view of the table at one reload generation.
#[derive(Debug, Default)]
pub struct RouteSnapshot {
    generation: u64,
    entries: Vec<RouteEntry>,
    index: HashMap<String, usize>,
}

impl RouteSnapshot {
    fn build(generation: u64, entries: Vec<RouteEntry>) -> Self {
        let index = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.id.clone(), i))
            .collect();
        Self {
            generation,
            entries,
            index,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&RouteEntry> {
        self.index.get(id).map(|&i| &self.entries[i])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Outcome of a successful reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReloadReport {
    pub generation: u64,
    pub loaded: usize,
    pub skipped: usize,
}

/// Routes hostnames to origins using records from a [`RouteStore`].
#[derive(Debug)]
pub struct RoutingTable {
    store: Arc<dyn RouteStore>,
    matcher: Box<dyn HostMatcher>,
    snapshot: ArcSwap<RouteSnapshot>,
    reload_lock: Mutex<()>,
}

impl RoutingTable {
    /// Create an empty table. Call [`reload`](Self::reload) to populate it.
    pub fn new(store: Arc<dyn RouteStore>, matcher: Box<dyn HostMatcher>) -> Self {
        Self {
            store,
            matcher,
            snapshot: ArcSwap::from_pointee(RouteSnapshot::default()),
            reload_lock: Mutex::new(()),
        }
    }

    /// Replace the whole table with the store's current contents.
    pub async fn reload(&self) -> StoreResult<ReloadReport> {
        let _guard = self.reload_lock.lock().await;

        let records = self.store.list_routes().await.map_err(|e| {
            tracing::error!(error = %e, "Route reload failed, keeping previous table");
            e
        })?;

        let mut entries = Vec::with_capacity(records.len());
        let mut skipped = 0;
        for record in records {
            match Origin::parse(&record.url) {
                Ok(origin) => entries.push(RouteEntry {
                    id: record.id,
                    origin,
                    active: record.is_active,
                }),
                Err(e) => {
                    skipped += 1;
                    tracing::warn!(route_id = %record.id, url = %record.url, error = %e, "Skipping route with unusable URL");
                }
            }
        }

        let generation = self.snapshot.load().generation + 1;
        let loaded = entries.len();
        self.snapshot.store(Arc::new(RouteSnapshot::build(generation, entries)));

        tracing::info!(generation, loaded, skipped, "Routing table reloaded");
        Ok(ReloadReport {
            generation,
            loaded,
            skipped,
        })
    }

    /// Look up the origin for an active route id.
    pub fn resolve(&self, key: &str) -> Option<Origin> {
        self.snapshot
            .load()
            .get(key)
            .filter(|e| e.active)
            .map(|e| e.origin.clone())
    }

    /// Whether the id is present in the table, active or not.
    pub fn contains(&self, key: &str) -> bool {
        self.snapshot.load().get(key).is_some()
    }

    /// Find the first active route selected by `host`.
    pub fn match_host(&self, host: &str) -> Option<(String, Origin)> {
        let host = normalize_host(host);
        let snapshot = self.snapshot.load();
        snapshot
            .entries
            .iter()
            .filter(|e| e.active)
            .find(|e| self.matcher.matches(&host, &e.id))
            .map(|e| (e.id.clone(), e.origin.clone()))
    }

    /// Current snapshot, for inspection.
    pub fn snapshot(&self) -> Arc<RouteSnapshot> {
        self.snapshot.load_full()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::matcher::ContainsMatcher;
    use crate::store::{MemoryRouteStore, RouteRecord, RouteUpdate, StoreError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

    fn record(id: &str, url: &str) -> RouteRecord {
        RouteRecord {
            id: id.into(),
            name: format!("name-{}", id),
            url: url.into(),
            is_active: true,
        }
    }

    fn table_with(records: Vec<RouteRecord>) -> (Arc<MemoryRouteStore>, RoutingTable) {
        let store = Arc::new(MemoryRouteStore::with_records(records));
        let table = RoutingTable::new(store.clone(), Box::new(ContainsMatcher));
        (store, table)
    }

    #[tokio::test]
    async fn test_reload_and_resolve() {
        let (_, table) = table_with(vec![record("ab12cd34", "http://10.0.0.1:8080")]);
        assert!(table.resolve("ab12cd34").is_none());

        let report = table.reload().await.unwrap();
        assert_eq!(report.loaded, 1);
        assert_eq!(report.generation, 1);
        assert_eq!(table.resolve("ab12cd34"), Some(Origin::parse("http://10.0.0.1:8080").unwrap()));
        assert!(table.resolve("missing").is_none());
    }

    #[tokio::test]
    async fn test_match_host_scenario() {
        let (_, table) = table_with(vec![record("ab12cd34", "http://10.0.0.1:8080")]);
        table.reload().await.unwrap();

        let (id, origin) = table.match_host("ab12cd34.proxy.example.com").unwrap();
        assert_eq!(id, "ab12cd34");
        assert_eq!(origin.to_string(), "http://10.0.0.1:8080");
        assert!(table.match_host("zz99yy88.proxy.example.com").is_none());
    }

    #[tokio::test]
    async fn test_first_match_wins_in_store_order() {
        // "abc" is contained in "abcdef"; whichever comes first in the store wins.
        let (_, table) = table_with(vec![
            record("abc", "http://10.0.0.1:1"),
            record("abcdef", "http://10.0.0.2:2"),
        ]);
        table.reload().await.unwrap();
        let (id, _) = table.match_host("abcdef.example.com").unwrap();
        assert_eq!(id, "abc");
    }

    #[tokio::test]
    async fn test_invalid_url_skipped() {
        let (_, table) = table_with(vec![
            record("goodgood", "http://10.0.0.1:8080"),
            record("badbadba", "not-a-url"),
        ]);
        let report = table.reload().await.unwrap();
        assert_eq!(report.loaded, 1);
        assert_eq!(report.skipped, 1);
        assert!(table.resolve("goodgood").is_some());
        assert!(!table.contains("badbadba"));
    }

    #[tokio::test]
    async fn test_inactive_routes_kept_but_not_resolved() {
        let mut inactive = record("sleeping", "http://10.0.0.1:8080");
        inactive.is_active = false;
        let (_, table) = table_with(vec![inactive]);
        table.reload().await.unwrap();

        assert!(table.contains("sleeping"));
        assert!(table.resolve("sleeping").is_none());
        assert!(table.match_host("sleeping.example.com").is_none());
    }

    #[tokio::test]
    async fn test_delete_then_reload_removes_entry() {
        let (store, table) = table_with(vec![record("ab12cd34", "http://10.0.0.1:8080")]);
        table.reload().await.unwrap();
        store.delete_route("ab12cd34").await.unwrap();

        // Stale until the next reload.
        assert!(table.resolve("ab12cd34").is_some());
        table.reload().await.unwrap();
        assert!(table.resolve("ab12cd34").is_none());
    }

    #[derive(Debug, Default)]
    struct FlakyStore {
        down: AtomicBool,
        inner: MemoryRouteStore,
    }

    #[async_trait]
    impl RouteStore for FlakyStore {
        async fn list_routes(&self) -> StoreResult<Vec<RouteRecord>> {
            if self.down.load(Ordering::SeqCst) {
                return Err(StoreError::Unavailable("connection refused".into()));
            }
            self.inner.list_routes().await
        }
        async fn insert_route(&self, record: RouteRecord) -> StoreResult<RouteRecord> {
            self.inner.insert_route(record).await
        }
        async fn update_route(&self, id: &str, update: &RouteUpdate) -> StoreResult<Option<RouteRecord>> {
            self.inner.update_route(id, update).await
        }
        async fn delete_route(&self, id: &str) -> StoreResult<Option<RouteRecord>> {
            self.inner.delete_route(id).await
        }
    }

    #[tokio::test]
    async fn test_store_failure_keeps_previous_table() {
        let store = Arc::new(FlakyStore::default());
        store.insert_route(record("ab12cd34", "http://10.0.0.1:8080")).await.unwrap();
        let table = RoutingTable::new(store.clone(), Box::new(ContainsMatcher));
        table.reload().await.unwrap();

        store.down.store(true, Ordering::SeqCst);
        let err = table.reload().await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
        assert!(table.resolve("ab12cd34").is_some());
        assert_eq!(table.snapshot().generation(), 1);
    }

    /// Every listing returns the same ids, all pointing at a port equal to
    /// the listing number, so a mixed snapshot would show differing ports.
    #[derive(Debug, Default)]
    struct GenerationalStore {
        calls: AtomicU64,
    }

    #[async_trait]
    impl RouteStore for GenerationalStore {
        async fn list_routes(&self) -> StoreResult<Vec<RouteRecord>> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            tokio::task::yield_now().await;
            Ok((0..20)
                .map(|i| record(&format!("route{:03}", i), &format!("http://127.0.0.1:{}", 1000 + n)))
                .collect())
        }
        async fn insert_route(&self, record: RouteRecord) -> StoreResult<RouteRecord> {
            Ok(record)
        }
        async fn update_route(&self, _: &str, _: &RouteUpdate) -> StoreResult<Option<RouteRecord>> {
            Ok(None)
        }
        async fn delete_route(&self, _: &str) -> StoreResult<Option<RouteRecord>> {
            Ok(None)
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_reloads_are_snapshot_isolated() {
        let table = Arc::new(RoutingTable::new(
            Arc::new(GenerationalStore::default()),
            Box::new(ContainsMatcher),
        ));
        table.reload().await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let table = table.clone();
            handles.push(tokio::spawn(async move {
                for _ in 0..25 {
                    table.reload().await.unwrap();
                }
            }));
        }
        for _ in 0..8 {
            let table = table.clone();
            handles.push(tokio::spawn(async move {
                for _ in 0..200 {
                    let snapshot = table.snapshot();
                    let first = snapshot.entries()[0].origin.clone();
                    assert!(snapshot.entries().iter().all(|e| e.origin == first));
                    tokio::task::yield_now().await;
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let snapshot = table.snapshot();
        assert_eq!(snapshot.generation(), 1 + 8 * 25);
        assert_eq!(snapshot.len(), 20);
    }

    #[tokio::test]
    async fn test_generations_never_regress() {
        let store = Arc::new(GenerationalStore::default());
        let table = Arc::new(RoutingTable::new(store, Box::new(ContainsMatcher)));
        let a = table.clone();
        let b = table.clone();
        let (ra, rb) = tokio::join!(a.reload(), b.reload());
        let (ra, rb) = (ra.unwrap(), rb.unwrap());
        assert_ne!(ra.generation, rb.generation);
        // The later generation read the later store listing.
        let port = table.snapshot().entries()[0].origin.authority().port_u16().unwrap();
        assert_eq!(port, 1002);
        assert_eq!(table.snapshot().generation(), 2);
    }
}
