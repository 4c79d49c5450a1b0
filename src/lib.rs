//! Forwarding gateway library.

pub mod config;
pub mod gateway;
pub mod http;
pub mod observability;

pub use config::GatewayConfig;
pub use http::HttpServer;
