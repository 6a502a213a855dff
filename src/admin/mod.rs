//! Route administration API.
//!
//! # Data Flow
//! ```text
//! HTTP request (admin listener)
//!     → auth.rs (optional bearer key)
//!     → handlers.rs (JSON extraction)
//!     → service.rs (validate → store write → table reload)
//!     → JSON response or error.rs body
//! ```

pub mod auth;
pub mod error;
pub mod handlers;
pub mod service;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use self::auth::admin_auth_middleware;
use self::handlers::*;

pub use error::{AdminError, AdminResult};
pub use service::RouteAdminService;

/// State shared by the admin handlers.
#[derive(Debug, Clone)]
pub struct AdminState {
    pub service: Arc<RouteAdminService>,
    pub api_key: Option<String>,
    pub mode: &'static str,
}

pub fn setup_admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/route", get(list_routes).post(create_route))
        .route("/route/reload", post(reload_routes))
        .route("/route/{id}", put(update_route).delete(delete_route))
        .route("/admin/status", get(get_status))
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
