//! OS signal handling.
//!
//! # Responsibilities
//! - Register signal handlers (SIGTERM, SIGINT, SIGHUP)
//! - Translate signals to internal events
//! - Trigger appropriate actions (shutdown, route reload)
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - SIGHUP reloads routes from the store, not shutdown

use std::sync::Arc;
use tokio::sync::broadcast;

use crate::lifecycle::Shutdown;
use crate::routing::RoutingTable;

/// Resolve when SIGINT (Ctrl+C) or SIGTERM arrives.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received SIGINT"),
        _ = terminate => tracing::info!("Received SIGTERM"),
    }
}

/// Wait for a termination signal, then broadcast shutdown.
pub async fn trigger_on_signal(shutdown: Shutdown) {
    shutdown_signal().await;
    shutdown.trigger();
}

/// Reload the routing table on every SIGHUP until shutdown.
#[cfg(unix)]
pub async fn reload_on_hangup(table: Arc<RoutingTable>, mut shutdown: broadcast::Receiver<()>) {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangup = match signal(SignalKind::hangup()) {
        Ok(sig) => sig,
        Err(e) => {
            tracing::warn!(error = %e, "SIGHUP route reload unavailable");
            return;
        }
    };

    loop {
        tokio::select! {
            _ = hangup.recv() => {
                tracing::info!("Received SIGHUP, reloading routes");
                match table.reload().await {
                    Ok(report) => tracing::info!(generation = report.generation, loaded = report.loaded, "Routes reloaded"),
                    Err(e) => tracing::error!(error = %e, "SIGHUP reload failed. Keeping current routes."),
                }
            }
            _ = shutdown.recv() => break,
        }
    }
}

#[cfg(not(unix))]
pub async fn reload_on_hangup(_table: Arc<RoutingTable>, mut shutdown: broadcast::Receiver<()>) {
    let _ = shutdown.recv().await;
}
