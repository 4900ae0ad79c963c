//! Sticky-session reverse proxy (v1)
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌──────────────────────────────────────────────────┐
//!                         │                  STICKY PROXY                    │
//!                         │                                                  │
//!     Client Request      │  ┌─────────┐    ┌──────────────┐                 │
//!     ────────────────────┼─▶│  http   │───▶│   affinity   │── lookup ──┐    │
//!     (user_id header)    │  │ server  │    │ StickySession│            ▼    │
//!                         │  └─────────┘    └──────┬───────┘     ┌─────────┐ │
//!                         │                        │ + Cookie    │  LRU    │ │
//!                         │                        ▼             │  cache  │ │
//!                         │                 ┌──────────────┐     └─────────┘ │
//!                         │                 │   upstream   │───────────────┼────▶ Upstream
//!                         │                 │  forwarder   │◀──────────────┼───── Server
//!                         │                 └──────┬───────┘   Set-Cookie    │
//!                         │                        ▼                         │
//!     Client Response     │  ┌──────────┐   ┌──────────────┐                 │
//!     ◀───────────────────┼──│ response │◀──│   recorder   │── update ──▶ cache
//!                         │  │  writer  │   │ (capture +   │                 │
//!                         │  └──────────┘   │  replay)     │                 │
//!                         │                 └──────────────┘                 │
//!                         └──────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use sticky_proxy::config::{load_config, validate_config, ConfigError, ProxyConfig};
use sticky_proxy::observability::{logging, metrics};
use sticky_proxy::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "sticky-proxy")]
#[command(about = "Reverse proxy with header-based session affinity", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => {
            let config = ProxyConfig::default();
            validate_config(&config).map_err(ConfigError::Validation)?;
            config
        }
    };

    logging::init(&config.observability);
    tracing::info!("sticky-proxy v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.address,
        cache_size = config.affinity.cache_size,
        header_name = %config.affinity.header_name,
        cookie_name = %config.affinity.cookie_name,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(config)?;
    let shutdown = Shutdown::new();
    shutdown.trigger_on_signal();

    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
