//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the
//! gateway. All types derive Serde traits for deserialization from
//! config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the forwarding gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Upstream origin the gateway forwards to.
    pub upstream: UpstreamConfig,

    /// Mount prefix and path translation mode.
    pub route: RouteConfig,

    /// CORS override header set.
    pub cors: CorsConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:3002").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:3002".to_string(),
        }
    }
}

/// Upstream origin configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Origin to forward to: scheme + host + optional port, no path
    /// (e.g., "https://devdb.sphereemr.com").
    pub origin: String,

    /// Value forced into the outbound `Host` header. Empty means derive
    /// it from `origin`.
    pub host_header: String,

    /// Whether to validate the upstream's TLS certificate.
    pub tls_verify: bool,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            origin: "https://devdb.sphereemr.com".to_string(),
            host_header: String::new(),
            tls_verify: true,
        }
    }
}

/// Mount prefix and path translation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RouteConfig {
    /// Path prefix the gateway is mounted at (e.g., "/fmi").
    pub mount_prefix: String,

    /// Strip the mount prefix before forwarding. When false the upstream
    /// must itself expose the mount prefix.
    pub strip_prefix: bool,

    /// Serve `GET /health` locally.
    pub health_enabled: bool,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            mount_prefix: "/fmi".to_string(),
            strip_prefix: false,
            health_enabled: true,
        }
    }
}

/// CORS override configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Header names advertised in `Access-Control-Allow-Headers`.
    pub allowed_headers: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_headers: vec![
                "Content-Type".to_string(),
                "Authorization".to_string(),
                "Accept".to_string(),
            ],
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
