//! Store file watcher.
//!
//! Emits a reload trigger whenever the route document changes on disk,
//! including edits made outside this process.

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};

use crate::routing::RoutingTable;

/// Watches the directory holding the store file.
///
/// The directory is watched rather than the file because writes replace the
/// file by rename, which would orphan a watch on the old inode.
pub struct StoreWatcher {
    path: PathBuf,
    trigger_tx: mpsc::UnboundedSender<()>,
}

impl StoreWatcher {
    /// Create a new StoreWatcher.
    ///
    /// Returns the watcher and a receiver of reload triggers.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<()>) {
        let (trigger_tx, trigger_rx) = mpsc::unbounded_channel();
        (
            Self {
                path: path.to_path_buf(),
                trigger_tx,
            },
            trigger_rx,
        )
    }

    /// Start watching. The returned handle must be kept alive.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.trigger_tx.clone();
        let file_name = self.path.file_name().map(|n| n.to_os_string());
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    let touches_store = event
                        .paths
                        .iter()
                        .any(|p| p.file_name().map(|n| n.to_os_string()) == file_name);
                    if touches_store && (event.kind.is_modify() || event.kind.is_create() || event.kind.is_remove()) {
                        let _ = tx.send(());
                    }
                }
                Err(e) => tracing::error!("Store watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Store watcher started");
        Ok(watcher)
    }
}

/// Reload the routing table for every trigger until shutdown.
///
/// Bursts of triggers collapse into a single reload.
pub async fn run_reload_loop(
    table: Arc<RoutingTable>,
    mut triggers: mpsc::UnboundedReceiver<()>,
    mut shutdown: broadcast::Receiver<()>,
) {
    loop {
        tokio::select! {
            trigger = triggers.recv() => {
                if trigger.is_none() {
                    break;
                }
                while triggers.try_recv().is_ok() {}
                tracing::info!("Store file change detected, reloading routes...");
                if let Err(e) = table.reload().await {
                    tracing::error!(error = %e, "Reload after store change failed. Keeping current routes.");
                }
            }
            _ = shutdown.recv() => {
                tracing::info!("Store watcher received shutdown signal, exiting loop");
                break;
            }
        }
    }
}
