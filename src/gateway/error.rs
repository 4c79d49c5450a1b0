//! Per-request error taxonomy.
//!
//! Transport failures are terminal for the request: the client gets a
//! 502 with a small JSON diagnostic, the full error is logged
//! server-side, and nothing is retried. Upstream HTTP error statuses are
//! not errors here; they are relayed as-is.

use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Response, StatusCode};
use axum::response::IntoResponse;
use thiserror::Error;

/// A failure producing or dispatching the outbound request.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid outbound uri: {0}")]
    BadUri(#[from] axum::http::Error),

    #[error("upstream request failed: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),

    #[error("no upstream response within {0:?}")]
    Timeout(Duration),
}

impl GatewayError {
    /// Stable kind string used in the JSON diagnostic body.
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::BadUri(_) => "bad_uri",
            GatewayError::Upstream(e) if e.is_connect() => "connect",
            GatewayError::Upstream(_) => "upstream",
            GatewayError::Timeout(_) => "timeout",
        }
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::BAD_GATEWAY
    }

    /// Short diagnostic, safe to hand to the client. The full chain only
    /// goes to the server log.
    pub fn detail(&self) -> String {
        match self {
            GatewayError::BadUri(_) => "could not build upstream request".to_string(),
            GatewayError::Upstream(e) => e.to_string(),
            GatewayError::Timeout(limit) => {
                format!("no upstream response within {}s", limit.as_secs())
            }
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> axum::response::Response {
        let body = serde_json::json!({
            "error": self.kind(),
            "detail": self.detail(),
        });
        Response::builder()
            .status(self.status())
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap_or_else(|_| {
                (StatusCode::BAD_GATEWAY, "upstream request failed").into_response()
            })
    }
}
