//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the upstream origin is an absolute http(s) URL with no path
//! - Validate value ranges (timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is a pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::header::HeaderName;
use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic configuration error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field (e.g., "upstream.origin").
    pub field: String,
    /// Human-readable description.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn err(field: &str, message: impl Into<String>) -> ValidationError {
    ValidationError {
        field: field.to_string(),
        message: message.into(),
    }
}

/// Validate a configuration, collecting every violation.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(err(
            "listener.bind_address",
            format!("not a socket address: {:?}", config.listener.bind_address),
        ));
    }

    match Url::parse(&config.upstream.origin) {
        Ok(url) => {
            if url.scheme() != "http" && url.scheme() != "https" {
                errors.push(err(
                    "upstream.origin",
                    format!("scheme must be http or https, got {:?}", url.scheme()),
                ));
            }
            if url.host_str().is_none() {
                errors.push(err("upstream.origin", "missing host"));
            }
            if url.path() != "/" && !url.path().is_empty() {
                errors.push(err(
                    "upstream.origin",
                    format!("must not carry a path, got {:?}", url.path()),
                ));
            }
            if url.query().is_some() {
                errors.push(err("upstream.origin", "must not carry a query string"));
            }
        }
        Err(e) => {
            errors.push(err("upstream.origin", format!("not a URL: {}", e)));
        }
    }

    if !config.route.mount_prefix.starts_with('/') {
        errors.push(err(
            "route.mount_prefix",
            format!("must start with '/', got {:?}", config.route.mount_prefix),
        ));
    }

    if config.cors.allowed_headers.is_empty() {
        errors.push(err("cors.allowed_headers", "must not be empty"));
    }
    for name in &config.cors.allowed_headers {
        if name.parse::<HeaderName>().is_err() {
            errors.push(err(
                "cors.allowed_headers",
                format!("invalid header name: {:?}", name),
            ));
        }
    }

    if config.timeouts.request_secs == 0 {
        errors.push(err("timeouts.request_secs", "must be greater than zero"));
    }

    if config
        .observability
        .log_level
        .parse::<tracing::Level>()
        .is_err()
    {
        errors.push(err(
            "observability.log_level",
            format!(
                "must be one of trace, debug, info, warn, error; got {:?}",
                config.observability.log_level
            ),
        ));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(err(
            "observability.metrics_address",
            format!(
                "not a socket address: {:?}",
                config.observability.metrics_address
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
