//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Rewrite layer and proxy handler produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Metric updates are no-ops until an exporter is installed

pub mod logging;
pub mod metrics;
