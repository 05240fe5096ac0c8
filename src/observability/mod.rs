//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! registry + dispatcher produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (dispatch counters and latency histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every dispatch log event
//! - Metrics are cheap (no-op until a recorder is installed)

pub mod logging;
pub mod metrics;
