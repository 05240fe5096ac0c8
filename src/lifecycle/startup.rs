//! Startup orchestration.
//!
//! # Responsibilities
//! - Compile the registry (freezing it)
//! - Start optional background services (metrics endpoint)
//! - Bind the listener and begin accepting traffic
//!
//! # Design Decisions
//! - Fail fast: any startup error is returned, nothing is retried
//! - Routes are compiled before binding, so traffic only arrives once the
//!   dispatch table is complete

use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::dispatch::RegistryBuilder;
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid {field} {value:?}")]
    Address { field: &'static str, value: String },

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to install metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Compile every registered message and serve them until `shutdown` fires.
///
/// # Panics
/// If the registry was already compiled or two messages share a URL.
pub async fn compile_and_listen(
    registry: &mut RegistryBuilder,
    config: ServerConfig,
    shutdown: &Shutdown,
) -> Result<(), StartupError> {
    let table = registry.compile();
    tracing::info!(routes = table.len(), prefix = %registry.path_prefix(), "Dispatch table ready");
    for route in table.routes() {
        tracing::debug!(
            url = %route.url(),
            pre = ?route.pre_chain().names(),
            post = ?route.post_chain().names(),
            "Route pipeline"
        );
    }

    if config.observability.metrics_enabled {
        let addr = parse_addr("observability.metrics_address", &config.observability.metrics_address)?;
        metrics::init_metrics(addr)?;
    }

    let addr = parse_addr("listener.bind_address", &config.listener.bind_address)?;
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| StartupError::Bind { addr, source })?;

    let server = HttpServer::new(table, config);
    server.run(listener, shutdown.subscribe()).await?;
    Ok(())
}

fn parse_addr(field: &'static str, value: &str) -> Result<SocketAddr, StartupError> {
    value.parse().map_err(|_| StartupError::Address {
        field,
        value: value.to_string(),
    })
}
