use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::admin::error::AdminResult;
use crate::admin::AdminState;
use crate::routing::ReloadReport;
use crate::store::{NewRoute, RouteRecord, RouteUpdate};

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub mode: &'static str,
    pub routes: usize,
    pub generation: u64,
}

pub async fn list_routes(State(state): State<AdminState>) -> AdminResult<Json<Vec<RouteRecord>>> {
    Ok(Json(state.service.list().await?))
}

pub async fn create_route(
    State(state): State<AdminState>,
    payload: Result<Json<NewRoute>, JsonRejection>,
) -> AdminResult<(StatusCode, Json<RouteRecord>)> {
    let Json(route) = payload?;
    let record = state.service.create(route).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn update_route(
    State(state): State<AdminState>,
    Path(id): Path<String>,
    payload: Result<Json<RouteUpdate>, JsonRejection>,
) -> AdminResult<Json<RouteRecord>> {
    let Json(update) = payload?;
    Ok(Json(state.service.update(&id, update).await?))
}

pub async fn delete_route(
    State(state): State<AdminState>,
    Path(id): Path<String>,
) -> AdminResult<Json<RouteRecord>> {
    Ok(Json(state.service.delete(&id).await?))
}

pub async fn reload_routes(State(state): State<AdminState>) -> AdminResult<Json<ReloadReport>> {
    let report = state.service.reload().await?;
    tracing::info!(generation = report.generation, loaded = report.loaded, "Manual route reload");
    Ok(Json(report))
}

pub async fn get_status(State(state): State<AdminState>) -> Json<SystemStatus> {
    let snapshot = state.service.table().snapshot();
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        mode: state.mode,
        routes: snapshot.len(),
        generation: snapshot.generation(),
    })
}
