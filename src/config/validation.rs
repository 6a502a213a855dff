//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Check mode requirements (static mode needs backends)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::{ProxyConfig, RoutingMode};
use crate::routing::Origin;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Validate a configuration, collecting every error.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("not a socket address: {}", config.listener.bind_address),
        ));
    }

    if config.admin.enabled {
        if config.admin.bind_address.parse::<SocketAddr>().is_err() {
            errors.push(ValidationError::new(
                "admin.bind_address",
                format!("not a socket address: {}", config.admin.bind_address),
            ));
        } else if config.admin.bind_address == config.listener.bind_address {
            errors.push(ValidationError::new(
                "admin.bind_address",
                "must differ from listener.bind_address",
            ));
        }
        if matches!(&config.admin.api_key, Some(key) if key.trim().is_empty()) {
            errors.push(ValidationError::new("admin.api_key", "must not be empty when set"));
        }
    }

    if config.timeouts.upstream_secs == 0 {
        errors.push(ValidationError::new("timeouts.upstream_secs", "must be greater than 0"));
    }

    if config.routing.mode == RoutingMode::Static {
        if config.routing.static_backends.is_empty() {
            errors.push(ValidationError::new(
                "routing.static_backends",
                "static mode requires at least one backend",
            ));
        }
        for (i, backend) in config.routing.static_backends.iter().enumerate() {
            if let Err(e) = Origin::parse(backend) {
                errors.push(ValidationError::new(format!("routing.static_backends[{}]", i), e.to_string()));
            }
        }
    }

    if matches!(&config.store.path, Some(p) if p.trim().is_empty()) {
        errors.push(ValidationError::new("store.path", "must not be empty when set"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
