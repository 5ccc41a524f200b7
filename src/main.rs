//! Round-robin HTTP load balancer.
//!
//! # Architecture Overview
//!
//! ```text
//!                       ┌────────────────────────────────────────────────┐
//!                       │                 LOAD BALANCER                  │
//!     Client Request    │  ┌─────────┐    ┌────────────┐    ┌─────────┐  │
//!     ──────────────────┼─▶│  http   │───▶│ dispatcher │───▶│registry │  │
//!                       │  │ server  │    │ round-robin│    │backends │  │
//!                       │  └────┬────┘    └────────────┘    └─────────┘  │
//!                       │       │ 503 if no healthy backend              │
//!                       │       ▼                                        │
//!     Client Response   │  ┌─────────┐    ┌────────────┐                 │
//!     ◀─────────────────┼──│response │◀───│ http client│◀────────────────┼──── Backend
//!                       │  │ relay   │    │ (hyper)    │                 │
//!                       │  └─────────┘    └────────────┘                 │
//!                       └────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use balancer_proxy::config::{self, Overrides};
use balancer_proxy::lifecycle::{signals, Shutdown};
use balancer_proxy::observability;
use balancer_proxy::{BackendRegistry, Dispatcher, HttpServer};

#[derive(Parser)]
#[command(name = "balancer-proxy")]
#[command(about = "Round-robin HTTP load balancer", long_about = None)]
struct Cli {
    /// TOML configuration file. Built-in defaults apply without one.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,

    /// Override the backend list (repeatable).
    #[arg(long = "backend")]
    backends: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = config::resolve_config(
        cli.config.as_deref(),
        Overrides {
            bind_address: cli.bind,
            backends: cli.backends,
        },
    )?;

    observability::init_logging(&config.observability)?;

    tracing::info!("balancer-proxy v{} starting", env!("CARGO_PKG_VERSION"));

    let registry = match BackendRegistry::new(config.backends.addresses()) {
        Ok(registry) => Arc::new(registry),
        Err(e) => {
            tracing::error!(error = %e, "Failed to create load balancer");
            return Err(e.into());
        }
    };

    tracing::info!(
        bind_address = %config.listener.bind_address,
        backends = registry.len(),
        upstream_timeout_secs = ?config.timeouts.upstream_secs,
        "Configuration loaded"
    );
    for backend in registry.iter() {
        tracing::info!(backend = %backend, "Backend registered");
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let dispatcher = Arc::new(Dispatcher::new(registry));
    let server = HttpServer::new(dispatcher, &config);

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        signals::wait_for_signal().await;
        shutdown.trigger();
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
