//! CORS Forwarding Gateway
//!
//! A local reverse proxy built with Tokio and Axum. It forwards requests
//! under a mount prefix to a single fixed upstream origin, answers CORS
//! preflights locally, and overwrites the response's CORS headers with a
//! configured set.
//!
//! ```text
//!                    ┌──────────────────────────────────────────────┐
//!                    │               FORWARDING GATEWAY              │
//!                    │                                               │
//!   Client Request   │  ┌────────┐   ┌──────────┐   ┌────────────┐  │
//!   ─────────────────┼─▶│  http  │──▶│ preflight│──▶│ forwarding │  │
//!                    │  │ server │   │  / route │   │    rule    │  │
//!                    │  └────────┘   └──────────┘   └─────┬──────┘  │
//!                    │                                    │          │
//!   Client Response  │  ┌────────┐   ┌──────────┐   ┌─────▼──────┐  │
//!   ◀────────────────┼──│  CORS  │◀──│  relay   │◀──│   hyper    │◀─┼── Upstream
//!                    │  │overlay │   │          │   │   client   │  │    origin
//!                    │  └────────┘   └──────────┘   └────────────┘  │
//!                    └──────────────────────────────────────────────┘
//! ```

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cors_gateway::config::{self, GatewayConfig};
use cors_gateway::http::HttpServer;

/// Command line arguments. Configuration beyond the file path comes from
/// the config file and `GATEWAY_*` environment variables.
#[derive(Debug, Parser)]
#[command(name = "cors-gateway", version)]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(long)]
    config: Option<std::path::PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config: GatewayConfig = match args.config {
        Some(path) => config::load_config(&path)?,
        None => config::from_env(GatewayConfig::default())?,
    };

    // Initialize tracing subscriber. RUST_LOG wins; otherwise the
    // configured level drives the crate's own events.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(format!(
                    "cors_gateway={},tower_http=info",
                    config.observability.log_level
                ))
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("cors-gateway v0.1.0 starting");

    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.origin,
        mount_prefix = %config.route.mount_prefix,
        strip_prefix = config.route.strip_prefix,
        "Configuration loaded"
    );

    // Bind TCP listener
    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(
        address = %local_addr,
        "Listening for connections"
    );

    // Optional Prometheus endpoint
    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            cors_gateway::observability::metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    // Create and run HTTP server
    let server = HttpServer::new(config)?;
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
