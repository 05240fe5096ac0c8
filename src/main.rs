//! JWA message server.
//!
//! # Architecture Overview
//!
//! ```text
//!                   ┌──────────────────────────────────────────────────────┐
//!                   │                     JWA SERVER                        │
//!   set-up routine  │  ┌──────────┐   compile()   ┌────────────────┐        │
//!   ────────────────┼─▶│ registry │──────────────▶│ dispatch table │        │
//!                   │  └──────────┘   (freeze)    └───────┬────────┘        │
//!                   │                                     │                 │
//!   POST <prefix>   │  ┌─────────┐    ┌──────────┐   ┌────▼───────┐         │
//!   ────────────────┼─▶│  axum   │───▶│  lookup  │──▶│ dispatcher │         │
//!                   │  │ server  │    │ by path  │   │ pre → proc │         │
//!   ◀───────────────┼──│         │◀───│          │◀──│ → post     │         │
//!                   │  └─────────┘    └──────────┘   └────────────┘         │
//!                   │                                                        │
//!                   │   config · logging · metrics · lifecycle               │
//!                   └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use jwa::config::{load_config, ServerConfig};
use jwa::lifecycle::{compile_and_listen, signals, Shutdown};
use jwa::observability::logging;
use jwa::{demo, RegistryBuilder};

#[derive(Parser)]
#[command(name = "jwa")]
#[command(about = "Serve named messages over HTTP POST", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };

    logging::init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "jwa starting");

    tracing::info!(
        bind_address = %config.listener.bind_address,
        path_prefix = %config.dispatch.path_prefix,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    let mut registry = RegistryBuilder::new();
    registry.set_path_prefix(&config.dispatch.path_prefix);
    demo::install(&mut registry);

    let shutdown = Shutdown::new();
    tokio::spawn(signals::forward_signals(shutdown.clone()));

    compile_and_listen(&mut registry, config, &shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
