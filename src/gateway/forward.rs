//! Outbound request construction and upstream dispatch.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → pre_forward (log)
//!     → outbound URI (rule), Host forced, x-forwarded-* appended
//!     → hyper client dispatch (body streamed, never buffered)
//!     → post_relay (log)
//!     → relayed response (status + headers + streamed body)
//! ```
//!
//! The pre-forward, post-relay, and error stages are ordinary functions
//! invoked in order inside the request task; there is no callback
//! registry.

use std::net::SocketAddr;
use std::time::Duration;

use axum::body::Body;
use axum::http::header::{HeaderMap, HeaderValue, HOST};
use axum::http::{Method, Request, Response, StatusCode};
use hyper_tls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;

use crate::gateway::error::GatewayError;
use crate::gateway::rule::ForwardingRule;

/// Shared outbound HTTP/HTTPS client.
pub type UpstreamClient = Client<HttpsConnector<HttpConnector>, Body>;

/// Build the outbound client. `tls_verify = false` disables upstream
/// certificate validation (self-signed dev upstreams).
pub fn build_client(tls_verify: bool) -> Result<UpstreamClient, hyper_tls::native_tls::Error> {
    let mut http = HttpConnector::new();
    http.enforce_http(false);
    let tls = hyper_tls::native_tls::TlsConnector::builder()
        .danger_accept_invalid_certs(!tls_verify)
        .build()?;
    let https = HttpsConnector::from((http, tls.into()));
    Ok(Client::builder(TokioExecutor::new()).build(https))
}

/// Forward one inbound request to the upstream and relay the response.
/// Exactly one outbound request; failures are terminal. The dispatch is
/// bounded by `timeout` so a stalled upstream surfaces as
/// [`GatewayError::Timeout`] and takes the regular 502-JSON path instead
/// of hanging the inbound connection.
pub async fn forward(
    client: &UpstreamClient,
    rule: &ForwardingRule,
    peer: SocketAddr,
    timeout: Duration,
    request: Request<Body>,
) -> Result<Response<Body>, GatewayError> {
    let method = request.method().clone();
    let original_path = request.uri().path().to_string();

    let uri = rule.outbound_uri(request.uri())?;
    pre_forward(&method, &original_path, &uri.to_string());

    let (parts, body) = request.into_parts();
    let mut headers = parts.headers;
    prepare_headers(&mut headers, rule, peer);

    let mut outbound = Request::new(body);
    *outbound.method_mut() = parts.method;
    *outbound.uri_mut() = uri;
    *outbound.headers_mut() = headers;

    let response: Response<hyper::body::Incoming> =
        match tokio::time::timeout(timeout, client.request(outbound)).await {
            Ok(result) => result?,
            Err(_) => return Err(GatewayError::Timeout(timeout)),
        };
    post_relay(response.status(), &method, &original_path);

    let (parts, body) = response.into_parts();
    Ok(Response::from_parts(parts, Body::new(body)))
}

/// Rewrite inbound headers for the outbound request: force `Host` to the
/// upstream and append the de-facto forwarding headers. Everything else
/// passes through untouched.
pub fn prepare_headers(headers: &mut HeaderMap, rule: &ForwardingRule, peer: SocketAddr) {
    headers.insert(HOST, rule.host_value().clone());

    let client_ip = peer.ip().to_string();
    let forwarded_for = match headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        Some(prev) => format!("{}, {}", prev, client_ip),
        None => client_ip,
    };
    if let Ok(value) = HeaderValue::from_str(&forwarded_for) {
        headers.insert("x-forwarded-for", value);
    }

    // Same append semantics as x-forwarded-for: a hop already behind a
    // proxy extends the chain, it does not lose the earlier entries.
    let forwarded_proto = match headers.get("x-forwarded-proto").and_then(|v| v.to_str().ok()) {
        Some(prev) => format!("{}, http", prev),
        None => "http".to_string(),
    };
    if let Ok(value) = HeaderValue::from_str(&forwarded_proto) {
        headers.insert("x-forwarded-proto", value);
    }
}

/// Pre-forward stage: log the dispatch.
fn pre_forward(method: &Method, path: &str, upstream: &str) {
    tracing::info!(method = %method, path = %path, upstream = %upstream, "Forwarding request");
}

/// Post-relay stage: log the relayed status.
fn post_relay(status: StatusCode, method: &Method, path: &str) {
    tracing::info!(status = %status.as_u16(), method = %method, path = %path, "Relayed response");
}

/// Error stage: full detail goes to the log, only a short message to the
/// client.
pub fn on_error(error: &GatewayError, method: &Method, path: &str) {
    tracing::error!(
        method = %method,
        path = %path,
        kind = error.kind(),
        error = %error,
        "Upstream request failed"
    );
}
