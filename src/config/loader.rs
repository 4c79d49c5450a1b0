//! Configuration loading from disk and from the environment.
//!
//! The source of truth is a TOML file; `GATEWAY_*` environment variables
//! override individual fields on top of whatever the file (or the
//! defaults) provided, since deployments of this gateway are typically
//! driven by a handful of environment knobs rather than a full file.

use std::env;
use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {var}: {value:?}")]
    Env { var: &'static str, value: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load a TOML config file, apply environment overrides, and validate.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: GatewayConfig = toml::from_str(&content)?;
    from_env(config)
}

/// Apply `GATEWAY_*` environment overrides to a base config and validate
/// the result.
pub fn from_env(mut config: GatewayConfig) -> Result<GatewayConfig, ConfigError> {
    if let Some(port) = env_parsed::<u16>("GATEWAY_PORT")? {
        let host = config
            .listener
            .bind_address
            .rsplit_once(':')
            .map(|(host, _)| host.to_string())
            .unwrap_or_else(|| "127.0.0.1".to_string());
        config.listener.bind_address = format!("{}:{}", host, port);
    }
    if let Ok(origin) = env::var("GATEWAY_UPSTREAM_ORIGIN") {
        config.upstream.origin = origin;
    }
    if let Ok(host) = env::var("GATEWAY_HOST_HEADER") {
        config.upstream.host_header = host;
    }
    if let Some(verify) = env_parsed::<bool>("GATEWAY_TLS_VERIFY")? {
        config.upstream.tls_verify = verify;
    }
    if let Ok(prefix) = env::var("GATEWAY_MOUNT_PREFIX") {
        config.route.mount_prefix = prefix;
    }
    if let Some(strip) = env_parsed::<bool>("GATEWAY_STRIP_PREFIX")? {
        config.route.strip_prefix = strip;
    }
    if let Ok(headers) = env::var("GATEWAY_ALLOWED_HEADERS") {
        config.cors.allowed_headers = headers
            .split(',')
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty())
            .collect();
    }

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

fn env_parsed<T: std::str::FromStr>(var: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(var) {
        Ok(value) => value
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Env { var, value }),
        Err(_) => Ok(None),
    }
}
