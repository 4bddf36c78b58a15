//! Route-access gate server.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌────────────────────────────────────────────┐
//!                        │                RENTAL GATE                  │
//!                        │                                             │
//!   Client Request       │  ┌──────────┐   ┌──────────────────────┐    │
//!   ─────────────────────┼─▶│  axum    │──▶│ gate middleware      │    │
//!                        │  │ + layers │   │ exempt? protected?   │    │
//!                        │  └──────────┘   │ session cookie?      │    │
//!                        │                 └───────┬──────┬───────┘    │
//!                        │                  Allow  │      │ Redirect   │
//!                        │                         ▼      ▼            │
//!                        │                 ┌──────────┐ ┌───────────┐  │
//!   Client Response      │                 │ upstream │ │302 → login│  │
//!   ◀────────────────────┼─────────────────│ forward  │ └───────────┘  │
//!                        │                 └────┬─────┘                │
//!                        └──────────────────────┼──────────────────────┘
//!                                               ▼
//!                                        Site renderer
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use rental_gate::config::{load_config, GateServiceConfig};
use rental_gate::lifecycle::Shutdown;
use rental_gate::observability::{logging, metrics};
use rental_gate::HttpServer;

#[derive(Parser)]
#[command(name = "rental-gate")]
#[command(about = "Route-access gate for the car-rental website", long_about = None)]
struct Args {
    /// Path to the TOML configuration file. Defaults are used when omitted.
    #[arg(short, long, env = "RENTAL_GATE_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match args.config.as_deref() {
        Some(path) => load_config(path)?,
        None => GateServiceConfig::default(),
    };

    logging::init(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "rental-gate starting");

    tracing::info!(
        bind_address = %config.listener.bind_address,
        login_path = %config.gate.login_path,
        upstream = ?config.upstream.url,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        if let Err(e) = metrics::init_metrics(addr) {
            tracing::error!(error = %e, "Failed to start metrics endpoint");
        }
    }

    let server = HttpServer::new(config.clone())?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    shutdown.trigger_on_signal();

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
