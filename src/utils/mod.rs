//! # Utility Modules
//!
//! Supporting utilities for logging and observability.
//!
//! ## Components
//! - **Logging**: `tracing-subscriber` setup driven by [`LoggingConfig`](crate::config::LoggingConfig)
//! - **Metrics**: thread-safe counters for meshes, vertices and ranges moved

pub mod logging;
pub mod metrics;

pub use metrics::{ExchangeMetrics, MetricsSnapshot};
