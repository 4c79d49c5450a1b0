//! HTTP server setup and request handling.
//!
//! # Responsibilities
//! - Create Axum Router with the health route and catch-all handler
//! - Wire up middleware (request ID, tracing)
//! - Answer preflights locally, forward everything else under the prefix
//! - Overlay the CORS header set on every response
//! - Serve with graceful shutdown

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Method, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get},
    Router,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::GatewayConfig;
use crate::gateway::cors::CorsPolicyError;
use crate::gateway::forward::{self, UpstreamClient};
use crate::gateway::rule::RuleError;
use crate::gateway::{CorsPolicy, ForwardingRule};
use crate::observability::metrics;

/// Error constructing the server from configuration.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("forwarding rule: {0}")]
    Rule(#[from] RuleError),

    #[error("cors policy: {0}")]
    Cors(#[from] CorsPolicyError),

    #[error("tls setup: {0}")]
    Tls(#[from] hyper_tls::native_tls::Error),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub rule: Arc<ForwardingRule>,
    pub cors: Arc<CorsPolicy>,
    pub client: UpstreamClient,
    /// Upper bound on the upstream dispatch. Enforced inside the forward
    /// pipeline so an elapse surfaces as a 502 JSON diagnostic with the
    /// CORS set, not as a bare middleware-generated status.
    pub request_timeout: Duration,
}

/// HTTP server for the forwarding gateway.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, ServerError> {
        let rule = Arc::new(ForwardingRule::from_config(&config.upstream, &config.route)?);
        let cors = Arc::new(CorsPolicy::from_config(&config.cors)?);
        let client = forward::build_client(config.upstream.tls_verify)?;

        let state = AppState {
            rule,
            cors,
            client,
            request_timeout: Duration::from_secs(config.timeouts.request_secs),
        };
        let router = Self::build_router(&config, state);
        Ok(Self { router })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let mut router = Router::new();
        if config.route.health_enabled {
            router = router.route("/health", get(health_handler));
        }
        router
            .route("/{*path}", any(gateway_handler))
            .route("/", any(gateway_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Local health probe. Never touches the upstream.
async fn health_handler() -> &'static str {
    "ok"
}

/// Main gateway handler: preflight short-circuit, prefix check, forward.
async fn gateway_handler(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Response {
    let start_time = Instant::now();
    let method = request.method().clone();
    let method_str = method.to_string();
    let path = request.uri().path().to_string();

    if !state.rule.matches(&path) {
        tracing::debug!(method = %method, path = %path, "No route matched");
        metrics::record_request(&method_str, 404, start_time);
        return (StatusCode::NOT_FOUND, "No matching route found").into_response();
    }

    // Preflights are answered locally, before any forwarding logic.
    if method == Method::OPTIONS {
        metrics::record_request(&method_str, 200, start_time);
        return state.cors.preflight_response();
    }

    match forward::forward(
        &state.client,
        &state.rule,
        peer,
        state.request_timeout,
        request,
    )
    .await
    {
        Ok(mut response) => {
            state.cors.apply(response.headers_mut());
            metrics::record_request(&method_str, response.status().as_u16(), start_time);
            response
        }
        Err(error) => {
            forward::on_error(&error, &method, &path);
            metrics::record_request(&method_str, error.status().as_u16(), start_time);
            let mut response = error.into_response();
            state.cors.apply(response.headers_mut());
            response
        }
    }
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received");
}
