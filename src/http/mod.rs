//! HTTP server subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware: request ID, trace, timeout)
//!     → /health handled locally (no upstream I/O)
//!     → OPTIONS under the prefix → preflight short-circuit
//!     → everything else under the prefix → gateway::forward
//!     → outside the prefix → 404
//! ```

pub mod server;

pub use server::HttpServer;
