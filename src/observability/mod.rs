//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Manager pipeline and REST handlers produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → Log aggregation (stdout, human or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging with `kind`, `name`, `stage` fields on pipeline events
//! - Request ID flows through the REST layer
//! - Metrics are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
