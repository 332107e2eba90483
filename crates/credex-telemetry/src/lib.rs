//! Structured logging and Prometheus metrics for the credex exchange.
//!
//! - Structured JSON logging with tracing
//! - Prometheus metrics for order flow, matching and bot evaluation

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::init_logging;
