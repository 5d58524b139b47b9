//! Internal telemetry: structured logging, metrics, and health reporting.

pub mod health;
pub mod metrics;
pub mod tracing_setup;

pub use health::{health, HealthRegistry, HealthStatus};
pub use metrics::{metrics, Metrics};
pub use tracing_setup::{init_tracing, init_tracing_from_env, TracingConfig};
