//! Rolodex Telemetry
//!
//! Structured logging setup for the API process.

pub mod tracer;

pub use tracer::{init_tracing, LogFormat, TelemetryConfig};
