//! Logging, metrics and request spans.
//!
//! # Data Flow
//! ```text
//! Host::process
//!     → tracing.rs   request span (request_id, method, path)
//!     → logging.rs   fmt subscriber on stdout, EnvFilter levels
//!     → metrics.rs   request count, latency, filter chain length
//!                    → Prometheus listener when enabled
//! ```
//!
//! # Design Decisions
//! - Request ID flows from the HTTP layer into the pipeline span
//! - Metrics are cheap (atomic increments); recording without an installed
//!   exporter is a no-op

pub mod logging;
pub mod metrics;
pub mod tracing;
