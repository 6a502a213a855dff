//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the proxy and admin Axum routers
//! - Wire up middleware (tracing, request ID, CORS on admin)
//! - Load the routing table before accepting traffic
//! - Dispatch requests to the resolver and forward them upstream
//! - Serve both listeners until shutdown

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, watch};
use tower_http::trace::TraceLayer;

use crate::admin::{setup_admin_router, AdminState, RouteAdminService};
use crate::config::{ProxyConfig, RoutingMode};
use crate::http::forward::Forwarder;
use crate::http::request::{propagate_request_id_layer, request_host, request_id, set_request_id_layer};
use crate::http::response::ProxyError;
use crate::load_balancer::RoundRobin;
use crate::routing::{Origin, Resolver, RoutingTable};
use crate::store::RouteStore;

/// State injected into the proxy handler.
#[derive(Clone)]
pub struct ProxyState {
    pub resolver: Resolver,
    pub forwarder: Forwarder,
}

/// HTTP server for the reverse proxy and its admin API.
pub struct HttpServer {
    config: ProxyConfig,
    table: Arc<RoutingTable>,
    admin: Arc<RouteAdminService>,
    resolver: Resolver,
    proxy_router: Router,
    admin_router: Router,
}

impl HttpServer {
    /// Create a new HTTP server over the given route store.
    pub fn new(config: ProxyConfig, store: Arc<dyn RouteStore>) -> Self {
        let matcher = config.routing.host_match.build(&config.routing.proxy_domain);
        let table = Arc::new(RoutingTable::new(store.clone(), matcher));
        let admin = Arc::new(RouteAdminService::new(store, table.clone()));

        let resolver = match config.routing.mode {
            RoutingMode::Subdomain => Resolver::Subdomain(table.clone()),
            RoutingMode::Static => Resolver::Static(Arc::new(RoundRobin::new(static_origins(&config)))),
        };

        let forwarder = Forwarder::new(Duration::from_secs(config.timeouts.upstream_secs));
        let proxy_router = Self::build_proxy_router(ProxyState {
            resolver: resolver.clone(),
            forwarder,
        });
        let admin_router = setup_admin_router(AdminState {
            service: admin.clone(),
            api_key: config.admin.api_key.clone(),
            mode: resolver.mode(),
        });

        Self {
            config,
            table,
            admin,
            resolver,
            proxy_router,
            admin_router,
        }
    }

    /// Build the proxy router: every method and path goes to the proxy handler.
    fn build_proxy_router(state: ProxyState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
    }

    /// Run the server until `shutdown` fires.
    ///
    /// `admin_listener` is served only when provided.
    pub async fn run(
        self,
        listener: TcpListener,
        admin_listener: Option<TcpListener>,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        if matches!(self.resolver, Resolver::Subdomain(_)) {
            if let Err(e) = self.table.reload().await {
                tracing::error!(error = %e, "Initial route load failed; starting with an empty table");
            }
        }

        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, mode = self.resolver.mode(), "Proxy server starting");

        // Fan the single broadcast receiver out to both listeners.
        let (stop_tx, stop_rx) = watch::channel(false);
        let mut shutdown = shutdown;
        tokio::spawn(async move {
            let _ = shutdown.recv().await;
            let _ = stop_tx.send(true);
        });
        let stopped = |mut rx: watch::Receiver<bool>| async move {
            let _ = rx.wait_for(|stop| *stop).await;
        };

        let proxy = axum::serve(listener, self.proxy_router).with_graceful_shutdown(stopped(stop_rx.clone()));

        match admin_listener {
            Some(admin_listener) => {
                tracing::info!(address = %admin_listener.local_addr()?, "Admin API starting");
                let admin = axum::serve(admin_listener, self.admin_router).with_graceful_shutdown(stopped(stop_rx));
                tokio::try_join!(
                    async { proxy.await },
                    async { admin.await },
                )?;
            }
            None => proxy.await?,
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    pub fn routing_table(&self) -> Arc<RoutingTable> {
        self.table.clone()
    }

    pub fn admin(&self) -> Arc<RouteAdminService> {
        self.admin.clone()
    }

    /// Router serving proxied traffic, for in-process use.
    pub fn proxy_router(&self) -> Router {
        self.proxy_router.clone()
    }

    /// Router serving the admin API, for in-process use.
    pub fn admin_router(&self) -> Router {
        self.admin_router.clone()
    }
}

fn static_origins(config: &ProxyConfig) -> Vec<Origin> {
    config
        .routing
        .static_backends
        .iter()
        .filter_map(|raw| match Origin::parse(raw) {
            Ok(origin) => Some(origin),
            Err(e) => {
                tracing::warn!(backend = %raw, error = %e, "Invalid static backend");
                None
            }
        })
        .collect()
}

/// Main proxy handler.
/// Resolves the target origin and forwards the request.
async fn proxy_handler(State(state): State<ProxyState>, request: Request<Body>) -> Response {
    let host = request_host(&request);

    let Some(origin) = state.resolver.resolve(host.as_deref()) else {
        tracing::warn!(
            request_id = %request_id(&request),
            host = ?host,
            path = %request.uri().path(),
            "No route matched"
        );
        return ProxyError::NoMatchingRoute(host).into_response();
    };

    match state.forwarder.forward(&origin, request).await {
        Ok(response) => response,
        Err(e) => e.into_response(),
    }
}
