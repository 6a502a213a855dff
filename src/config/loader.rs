//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::ProxyConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid environment variable {name}: {value:?}")]
    Env { name: &'static str, value: String },

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration: optional TOML file, then environment overrides, then validation.
pub fn load_config(path: Option<&Path>) -> Result<ProxyConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => ProxyConfig::default(),
    };

    apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply `PROXY_PORT`, `API_PORT`, `PROXY_DOMAIN` and `DB_FILE_NAME`.
///
/// Empty values are ignored. Ports replace only the port of the configured
/// bind address.
pub fn apply_env_overrides<F>(config: &mut ProxyConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(port) = var("PROXY_PORT") {
        let port = parse_port("PROXY_PORT", &port)?;
        config.listener.bind_address = with_port(&config.listener.bind_address, port);
    }
    if let Some(port) = var("API_PORT") {
        let port = parse_port("API_PORT", &port)?;
        config.admin.bind_address = with_port(&config.admin.bind_address, port);
    }
    if let Some(domain) = var("PROXY_DOMAIN") {
        config.routing.proxy_domain = domain;
    }
    if let Some(path) = var("DB_FILE_NAME") {
        config.store.path = Some(path);
    }
    Ok(())
}

fn parse_port(name: &'static str, value: &str) -> Result<u16, ConfigError> {
    match value.trim().parse::<u16>() {
        Ok(port) if port > 0 => Ok(port),
        _ => Err(ConfigError::Env {
            name,
            value: value.to_string(),
        }),
    }
}

fn with_port(bind_address: &str, port: u16) -> String {
    let host = match bind_address.rsplit_once(':') {
        Some((host, _)) if !host.is_empty() => host,
        _ => "0.0.0.0",
    };
    format!("{}:{}", host, port)
}
