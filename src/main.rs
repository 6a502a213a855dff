//! Subdomain-routing reverse proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client ──▶ proxy listener ──▶ Resolver ──────────────▶ Forwarder ──▶ Backend
//!                                     │ subdomain: RoutingTable  │ deadline, no redirects
//!                                     │ static:    RoundRobin    │
//!                                     ▼
//!                               RoutingTable ◀── reload ── RouteAdminService ◀── admin listener
//!                                     ▲                          │
//!                                     └──── reload ── store ◀────┘
//!                                         (watcher, SIGHUP)
//! ```

use clap::Parser;
use std::path::PathBuf;

use subdomain_proxy::config::load_config;
use subdomain_proxy::lifecycle::{self, signals::trigger_on_signal, Shutdown};
use subdomain_proxy::observability::init_tracing;

#[derive(Parser)]
#[command(name = "subdomain-proxy")]
#[command(about = "Reverse proxy routing requests by subdomain", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long, env = "PROXY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    init_tracing(&config.observability)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "subdomain-proxy starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        admin_address = %config.admin.bind_address,
        mode = ?config.routing.mode,
        proxy_domain = %config.routing.proxy_domain,
        upstream_timeout_secs = config.timeouts.upstream_secs,
        "Configuration loaded"
    );

    let shutdown = Shutdown::new();
    tokio::spawn(trigger_on_signal(shutdown.clone()));

    lifecycle::run(config, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
