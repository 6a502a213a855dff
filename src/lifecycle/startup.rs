//! Startup orchestration.
//!
//! # Responsibilities
//! - Open the configured route store
//! - Build the server and start background tasks (store watcher, SIGHUP reload)
//! - Bind listeners and begin accepting traffic
//!
//! # Design Decisions
//! - Fail fast: any bind or watcher error is fatal
//! - Listeners start last (traffic only when ready)

use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::{ProxyConfig, StoreConfig};
use crate::http::HttpServer;
use crate::lifecycle::signals::reload_on_hangup;
use crate::lifecycle::Shutdown;
use crate::store::watcher::{run_reload_loop, StoreWatcher};
use crate::store::{JsonFileRouteStore, MemoryRouteStore, RouteStore};

/// Fatal startup and serve errors.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },

    #[error("store watcher failed: {0}")]
    Watch(#[from] notify::Error),

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Open the route store described by `config`.
pub fn open_store(config: &StoreConfig) -> Arc<dyn RouteStore> {
    match config.path.as_deref() {
        Some(path) => {
            tracing::info!(path = %path, "Using JSON file route store");
            Arc::new(JsonFileRouteStore::open(path))
        }
        None => {
            tracing::warn!("No store path configured; routes are kept in memory and lost on exit");
            Arc::new(MemoryRouteStore::new())
        }
    }
}

async fn bind(address: &str) -> Result<TcpListener, StartupError> {
    TcpListener::bind(address).await.map_err(|source| StartupError::Bind {
        address: address.to_string(),
        source,
    })
}

/// Run the proxy until `shutdown` is triggered.
pub async fn run(config: ProxyConfig, shutdown: Shutdown) -> Result<(), StartupError> {
    let store = open_store(&config.store);
    let server = HttpServer::new(config.clone(), store);
    let table = server.routing_table();

    // Dropping the watcher handle stops notifications, so it lives until return.
    let _watcher = match (&config.store.path, config.store.watch) {
        (Some(path), true) => {
            let (watcher, triggers) = StoreWatcher::new(Path::new(path));
            let handle = watcher.run()?;
            tokio::spawn(run_reload_loop(table.clone(), triggers, shutdown.subscribe()));
            Some(handle)
        }
        _ => None,
    };

    tokio::spawn(reload_on_hangup(table, shutdown.subscribe()));

    let listener = bind(&config.listener.bind_address).await?;
    let admin_listener = if config.admin.enabled {
        Some(bind(&config.admin.bind_address).await?)
    } else {
        tracing::info!("Admin API disabled");
        None
    };

    server.run(listener, admin_listener, shutdown.subscribe()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::RouteRecord;

    #[tokio::test]
    async fn test_open_store_file_backed() {
        let path = std::env::temp_dir().join(format!("startup-store-{}.json", fastrand::u64(..)));
        let config = StoreConfig {
            path: Some(path.to_string_lossy().into_owned()),
            watch: false,
        };
        let store = open_store(&config);
        store
            .insert_route(RouteRecord {
                id: "persistd".into(),
                name: "persisted".into(),
                url: "http://127.0.0.1:9000".into(),
                is_active: true,
            })
            .await
            .unwrap();

        let reopened = open_store(&config);
        assert_eq!(reopened.list_routes().await.unwrap().len(), 1);
        std::fs::remove_file(&path).unwrap_or_default();
    }

    #[tokio::test]
    async fn test_bind_error_names_address() {
        let held = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = held.local_addr().unwrap().to_string();
        let err = bind(&address).await.unwrap_err();
        assert!(err.to_string().contains(&address));
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let mut config = ProxyConfig::default();
        config.listener.bind_address = "127.0.0.1:0".into();
        config.admin.bind_address = "127.0.0.1:0".into();

        let shutdown = Shutdown::new();
        let handle = tokio::spawn(run(config, shutdown.clone()));

        // Wait until the server has subscribed.
        for _ in 0..100 {
            if shutdown.receiver_count() >= 2 {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        shutdown.trigger();

        let result = tokio::time::timeout(std::time::Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
        assert!(result.is_ok());
    }
}
