//! Transaction broadcast proxy.
//!
//! ```text
//!                    ┌──────────────────────────────────────────────┐
//!                    │               BROADCAST PROXY                │
//!   POST /transactions/broadcast                                    │
//!   ─────────────────┼─▶ http ──▶ validate ──▶ forward ─────────────┼──▶ POST /broadcast
//!                    │                           │                  │         Upstream
//!                    │                           ▼                  │
//!                    │                    poll_until_terminal ──────┼──▶ GET /check/{hash}
//!   ◀────────────────┼── { tx_status } ◀─────────┘   (fixed delay)  │
//!                    │                                              │
//!                    │   config · observability · lifecycle         │
//!                    └──────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use tx_broadcast_proxy::config::load_config;
use tx_broadcast_proxy::lifecycle::{signals, Shutdown};
use tx_broadcast_proxy::observability::{logging, metrics};
use tx_broadcast_proxy::HttpServer;

#[derive(Parser)]
#[command(name = "tx-broadcast-proxy")]
#[command(about = "Broadcast transactions upstream and wait for a terminal status", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "configs/config.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    logging::init_logging(&config.observability);

    tracing::info!("tx-broadcast-proxy v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        upstream = %config.upstream.address,
        bind_address = %config.listener.bind_address(),
        poll_interval_secs = config.monitor.poll_interval_secs,
        max_attempts = config.monitor.max_attempts,
        max_wait_secs = config.monitor.max_wait_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        // Validated at load time.
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr);
    }

    let listener = TcpListener::bind(config.listener.bind_address()).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Arc::new(Shutdown::new());
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            let signal = signals::wait_for_signal().await;
            tracing::info!(signal, "Shutdown signal received");
            shutdown.trigger();
        });
    }

    let server = HttpServer::new(config, shutdown)?;
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
