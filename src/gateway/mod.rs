//! Forwarding gateway core.
//!
//! # Data Flow
//! ```text
//! Inbound request (method, path, headers, body stream)
//!     → rule.rs (prefix match, path translation, outbound URI)
//!     → forward.rs (outbound request build, upstream dispatch)
//!     → cors.rs (override CORS headers on the relayed response)
//!     → Client
//!
//! OPTIONS requests under the prefix never reach forward.rs: cors.rs
//! answers them locally.
//! ```
//!
//! # Design Decisions
//! - Rule and policy compiled once at startup, immutable at runtime
//! - Exactly one outbound request per forwarded inbound request; no retry
//! - Upstream status and body relayed untouched; only the CORS header
//!   set is rewritten

pub mod cors;
pub mod error;
pub mod forward;
pub mod rule;

pub use cors::CorsPolicy;
pub use error::GatewayError;
pub use rule::ForwardingRule;
