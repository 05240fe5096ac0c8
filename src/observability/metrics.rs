//! Metrics collection and exposition.
//!
//! # Metrics
//! - `jwa_requests_total` (counter): dispatches by route and outcome
//! - `jwa_request_duration_seconds` (histogram): time from receipt to done
//!
//! # Design Decisions
//! - Recorded by the dispatcher itself, outside the user callback chains
//! - Without an installed recorder every call is a no-op
//! - Prometheus exporter is opt-in via configuration

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::dispatch::Outcome;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record one finished dispatch.
pub fn record_dispatch(route: &str, outcome: Outcome, elapsed: Duration) {
    counter!(
        "jwa_requests_total",
        "route" => route.to_string(),
        "outcome" => outcome.as_str()
    )
    .increment(1);
    histogram!("jwa_request_duration_seconds", "route" => route.to_string())
        .record(elapsed.as_secs_f64());
}
