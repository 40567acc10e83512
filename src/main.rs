//! LogiCraft load balancer.
//!
//! Spreads inbound HTTP traffic round-robin over a fixed pool of backends
//! while a background task per backend keeps its liveness current.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────┐
//!                     │                LOAD BALANCER                 │
//!                     │                                              │
//!   Client Request    │  ┌────────┐    ┌──────────┐    ┌──────────┐  │
//!   ──────────────────┼─▶│  http  │───▶│ routing  │───▶│   pool   │  │
//!                     │  │ server │    │  router  │    │ (cursor) │  │
//!                     │  └────────┘    └────┬─────┘    └──────────┘  │
//!                     │                     │ alive?                 │
//!                     │             no ◀────┴────▶ yes               │
//!   503 Service not   │             │             ┌──────────┐       │
//!   available ◀───────┼─────────────┘             │ forward  │◀──────┼──── Backend
//!   Client Response ◀─┼───────────────────────────│transport │───────┼───▶ Server
//!                     │                           └──────────┘       │
//!                     │  ┌────────────────────────────────────────┐  │
//!                     │  │ health: one prober task per backend    │  │
//!                     │  │ GET base URL every 5s, 2s timeout      │  │
//!                     │  └────────────────────────────────────────┘  │
//!                     └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use logicraft_lb::config::{load_config, LbConfig};
use logicraft_lb::lifecycle::{wait_for_signal, Shutdown};
use logicraft_lb::observability::{logging, metrics};
use logicraft_lb::HttpServer;

#[derive(Debug, Parser)]
#[command(name = "logicraft-lb", version, about = "Round-robin HTTP load balancer")]
struct Cli {
    /// Path to a TOML config file. Built-in defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => LbConfig::default(),
    };

    logging::init_logging(&config.observability.log_level);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "logicraft-lb starting");
    tracing::info!(
        config = ?cli.config,
        bind_address = %config.listener.bind_address,
        backends = config.backends.len(),
        probe_interval_secs = config.health_check.interval_secs,
        probe_timeout_secs = config.health_check.timeout_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        metrics::init_metrics(config.observability.metrics_address.parse()?)?;
    }

    let server = HttpServer::new(config)?;
    let listener = TcpListener::bind(&server.config().listener.bind_address).await?;

    let shutdown = Shutdown::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        wait_for_signal().await;
        trigger.trigger();
    });

    server.run(listener, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
