//! CORS override policy.
//!
//! The gateway exists so browser clients can reach an upstream that does
//! not (or wrongly does) speak CORS. The policy here is deliberately
//! blunt: the final response always carries exactly the configured
//! header set, whatever the upstream returned.
//!
//! # Design Decisions
//! - Headers are inserted (replaced), never appended: duplicate
//!   `Access-Control-Allow-Origin` values break strict clients
//! - Preflights are answered locally with 200 and an empty body, the
//!   behavior of every source variant of this gateway

use axum::body::Body;
use axum::http::header::{
    HeaderMap, HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN,
};
use axum::http::{Response, StatusCode};
use thiserror::Error;

use crate::config::schema::CorsConfig;

/// Methods advertised on every response.
pub const ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, PATCH, OPTIONS";

/// Error compiling a [`CorsPolicy`] from configuration.
#[derive(Debug, Error)]
#[error("invalid allowed header list {0:?}")]
pub struct CorsPolicyError(String);

/// Fixed CORS header set overlaid on every response.
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    allow_origin: HeaderValue,
    allow_methods: HeaderValue,
    allow_headers: HeaderValue,
}

impl CorsPolicy {
    /// Compile the policy from the configured allow-list.
    pub fn from_config(config: &CorsConfig) -> Result<Self, CorsPolicyError> {
        let joined = config.allowed_headers.join(", ");
        let allow_headers =
            HeaderValue::from_str(&joined).map_err(|_| CorsPolicyError(joined.clone()))?;
        Ok(Self {
            allow_origin: HeaderValue::from_static("*"),
            allow_methods: HeaderValue::from_static(ALLOW_METHODS),
            allow_headers,
        })
    }

    /// Overwrite the CORS headers on a response header map. `insert`
    /// drops any previous values for the name, so upstream CORS headers
    /// are discarded rather than merged.
    pub fn apply(&self, headers: &mut HeaderMap) {
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, self.allow_origin.clone());
        headers.insert(ACCESS_CONTROL_ALLOW_METHODS, self.allow_methods.clone());
        headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, self.allow_headers.clone());
    }

    /// Local answer for an `OPTIONS` preflight: 200, CORS set, no body.
    pub fn preflight_response(&self) -> Response<Body> {
        let mut response = Response::new(Body::empty());
        *response.status_mut() = StatusCode::OK;
        self.apply(response.headers_mut());
        response
    }
}
