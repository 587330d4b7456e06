//! Route registrar (v1)
//!
//! Control-plane service that maps hostnames onto containers behind Traefik.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌───────────────────────────────────────────────────────────┐
//!                     │                     ROUTE REGISTRAR                        │
//!                     │                                                            │
//!  POST /add-domain   │  ┌──────────┐   ┌───────────┐   ┌─────────────┐            │
//!  ───────────────────┼─▶│  http    │──▶│ validator │──▶│ synthesizer │            │
//!                     │  │ handlers │   └───────────┘   └──────┬──────┘            │
//!                     │  └──────────┘                          ▼                   │
//!                     │                                 ┌─────────────┐  rename    │   {domain}.yaml
//!                     │                                 │   writer    │────────────┼──▶ dynamic dir
//!                     │                                 └──────┬──────┘            │        │
//!                     │                                        ▼                   │        │ watch
//!                     │                                 ┌─────────────┐  restart   │        ▼
//!                     │                                 │   reload    │────────────┼──▶  Traefik
//!                     │                                 │ (coalesced) │            │
//!                     │                                 └─────────────┘            │
//!  POST /invite       │  ┌──────────┐                                              │
//!  ───────────────────┼─▶│  invite  │──────────────────────────────────────────────┼──▶ team web app
//!                     │  └──────────┘                                              │
//!                     └───────────────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use route_registrar::config::loader::{load_config, load_default};
use route_registrar::http::{AppState, HttpServer};
use route_registrar::observability::{logging, metrics};
use route_registrar::{invite, reload, RoutingService, Shutdown};

#[derive(Parser)]
#[command(name = "route-registrar")]
#[command(about = "Registers domains with a Traefik reverse proxy", long_about = None)]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long, env = "ROUTE_REGISTRAR_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => load_default()?,
    };

    logging::init_logging(&config.observability);
    tracing::info!("route-registrar v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        dynamic_dir = %config.dynamic_config.directory,
        reload_strategy = config.reload.strategy.as_str(),
        "Configuration loaded"
    );

    if let Err(e) = std::fs::create_dir_all(&config.dynamic_config.directory) {
        tracing::warn!(
            directory = %config.dynamic_config.directory,
            error = %e,
            "Dynamic configuration directory is not available"
        );
    }

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let control_plane = reload::from_config(&config.reload)?;
    let state = AppState {
        routing: Arc::new(RoutingService::from_config(&config, control_plane)),
        invites: invite::from_config(&config.invite),
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    HttpServer::new(&config, state)
        .run(listener, shutdown.subscribe())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
