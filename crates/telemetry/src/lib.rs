//! Logging, metrics and health for the form intake service.
//!
//! Metrics are kept in-process and exposed through the health endpoint.

pub mod health;
pub mod metrics;
pub mod tracing_setup;

pub use health::*;
pub use metrics::*;
pub use tracing_setup::*;
