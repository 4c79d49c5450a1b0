//! Observability subsystem.
//!
//! Logging is handled with `tracing` at the call sites (the forward
//! pipeline logs each dispatch and relay); this module only carries the
//! optional Prometheus metrics endpoint.

pub mod metrics;
