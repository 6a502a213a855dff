//! Admin error taxonomy and its HTTP representation.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::store::StoreError;

/// Errors returned by route administration.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Target URL is not an absolute http(s) URL with a host.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Route name is missing or blank.
    #[error("invalid name: {0}")]
    InvalidName(String),

    /// Another route already uses this name.
    #[error("route name already exists: {0}")]
    DuplicateName(String),

    /// The route id is unknown.
    #[error("route does not exist: {0}")]
    RouteNotFound(String),

    /// The route store could not be read or written.
    #[error("route store unavailable: {0}")]
    StoreUnavailable(String),

    /// The request body is not a JSON document of the expected shape.
    #[error("invalid request body: {details}")]
    InvalidBody { status: StatusCode, details: String },
}

impl AdminError {
    pub fn status(&self) -> StatusCode {
        match self {
            AdminError::InvalidUrl(_) | AdminError::InvalidName(_) => StatusCode::BAD_REQUEST,
            AdminError::DuplicateName(_) => StatusCode::CONFLICT,
            AdminError::RouteNotFound(_) => StatusCode::NOT_FOUND,
            AdminError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AdminError::InvalidBody { status, .. } => *status,
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            AdminError::InvalidUrl(_) => "InvalidUrl",
            AdminError::InvalidName(_) => "InvalidName",
            AdminError::DuplicateName(_) => "DuplicateName",
            AdminError::RouteNotFound(_) => "RouteNotFound",
            AdminError::StoreUnavailable(_) => "StoreUnavailable",
            AdminError::InvalidBody { .. } => "InvalidBody",
        }
    }
}

impl From<StoreError> for AdminError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateName(name) => AdminError::DuplicateName(name),
            StoreError::DuplicateId(id) => AdminError::StoreUnavailable(format!("id collision on {}", id)),
            StoreError::Unavailable(msg) => AdminError::StoreUnavailable(msg),
        }
    }
}

// Keeps axum's status: 400 syntax, 415 content type, 422 shape.
impl From<JsonRejection> for AdminError {
    fn from(rejection: JsonRejection) -> Self {
        AdminError::InvalidBody {
            status: rejection.status(),
            details: rejection.body_text(),
        }
    }
}

/// Result type for admin operations.
pub type AdminResult<T> = Result<T, AdminError>;

/// JSON error body returned by the admin API.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub status: u16,
    pub details: String,
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: self.code(),
            status: status.as_u16(),
            details: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
