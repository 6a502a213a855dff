//! Route administration.
//!
//! # Responsibilities
//! - Validate create/update input
//! - Apply mutations to the route store
//! - Reload the routing table before returning
//!
//! # Design Decisions
//! - Every mutation ends with a synchronous full reload, so a successful
//!   return means the change is already live
//! - A failed reload does not roll back the committed write; the error is
//!   returned and the table stays stale until the next good reload
//! - `update` checks existence against the live routing table, `delete`
//!   checks nothing, `create` relies on store uniqueness

use std::sync::Arc;

use crate::admin::error::{AdminError, AdminResult};
use crate::routing::{Origin, ReloadReport, RoutingTable};
use crate::store::id::generate_route_id;
use crate::store::{NewRoute, RouteRecord, RouteStore, RouteUpdate, StoreError};

/// Attempts at finding an unused id before giving up.
const MAX_ID_ATTEMPTS: usize = 5;

/// Validates and applies route mutations, then refreshes the routing table.
#[derive(Debug, Clone)]
pub struct RouteAdminService {
    store: Arc<dyn RouteStore>,
    table: Arc<RoutingTable>,
}

impl RouteAdminService {
    pub fn new(store: Arc<dyn RouteStore>, table: Arc<RoutingTable>) -> Self {
        Self { store, table }
    }

    /// All persisted routes.
    pub async fn list(&self) -> AdminResult<Vec<RouteRecord>> {
        Ok(self.store.list_routes().await?)
    }

    /// Create a route with a server-generated id.
    pub async fn create(&self, route: NewRoute) -> AdminResult<RouteRecord> {
        let name = validate_name(&route.name)?;
        validate_url(&route.url)?;

        let mut attempts = 0;
        let created = loop {
            attempts += 1;
            let record = RouteRecord {
                id: generate_route_id(),
                name: name.clone(),
                url: route.url.trim().to_string(),
                is_active: true,
            };
            match self.store.insert_route(record).await {
                Ok(created) => break created,
                Err(StoreError::DuplicateId(id)) if attempts < MAX_ID_ATTEMPTS => {
                    tracing::debug!(route_id = %id, "Generated id already taken, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        };

        tracing::info!(route_id = %created.id, name = %created.name, url = %created.url, "Route created");
        self.reload_after_write().await?;
        Ok(created)
    }

    /// Apply a partial update to an existing route.
    pub async fn update(&self, id: &str, mut update: RouteUpdate) -> AdminResult<RouteRecord> {
        if !self.table.contains(id) {
            return Err(AdminError::RouteNotFound(id.to_string()));
        }

        if let Some(name) = &update.name {
            update.name = Some(validate_name(name)?);
        }
        if let Some(url) = &update.url {
            validate_url(url)?;
            update.url = Some(url.trim().to_string());
        }

        let updated = self
            .store
            .update_route(id, &update)
            .await?
            .ok_or_else(|| AdminError::RouteNotFound(id.to_string()))?;

        tracing::info!(route_id = %id, update = ?update, "Route updated");
        self.reload_after_write().await?;
        Ok(updated)
    }

    /// Delete a route, returning the removed record.
    pub async fn delete(&self, id: &str) -> AdminResult<RouteRecord> {
        let deleted = self.store.delete_route(id).await?;
        self.reload_after_write().await?;

        match deleted {
            Some(record) => {
                tracing::info!(route_id = %id, name = %record.name, "Route deleted");
                Ok(record)
            }
            None => Err(AdminError::RouteNotFound(id.to_string())),
        }
    }

    /// Force a routing table reload.
    pub async fn reload(&self) -> AdminResult<ReloadReport> {
        Ok(self.table.reload().await?)
    }

    /// The routing table this service refreshes.
    pub fn table(&self) -> &Arc<RoutingTable> {
        &self.table
    }

    async fn reload_after_write(&self) -> AdminResult<()> {
        self.table.reload().await.map(|_| ()).map_err(|e| {
            tracing::error!(error = %e, "Route change committed but routing table reload failed");
            AdminError::from(e)
        })
    }
}

fn validate_name(name: &str) -> AdminResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AdminError::InvalidName("name must not be empty".into()));
    }
    Ok(name.to_string())
}

fn validate_url(url: &str) -> AdminResult<()> {
    Origin::parse(url)
        .map(|_| ())
        .map_err(|e| AdminError::InvalidUrl(format!("{:?}: {}", url, e)))
}
