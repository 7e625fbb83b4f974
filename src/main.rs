//! Dashboard API server.
//!
//! # Architecture Overview
//!
//! ```text
//!                       ┌──────────────────────────────────────────────┐
//!                       │                DASHBOARD API                 │
//!   GET /<tile>         │  ┌────────┐   ┌───────────┐   ┌──────────┐   │
//!   ────────────────────┼─▶│  http  │──▶│ dashboard │──▶│ sources  │───┼──▶ New Relic
//!                       │  │ server │   │ handlers  │   │ clients  │───┼──▶ Appfigures
//!                       │  └────────┘   └─────┬─────┘   └──────────┘───┼──▶ Navitia
//!                       │                     │              │         │
//!   JSON summary        │              ┌──────▼─────┐        └─────────┼──▶ realtime.json
//!   ◀───────────────────┼──────────────│ summaries  │                  │
//!                       │              └────────────┘                  │
//!                       │  config · observability · lifecycle          │
//!                       └──────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use kisiowall_api::config::{load_config, watcher::ConfigWatcher};
use kisiowall_api::http::HttpServer;
use kisiowall_api::lifecycle::{signals, Shutdown};
use kisiowall_api::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "kisiowall-api")]
#[command(about = "JSON tiles for the dashboard wall", long_about = None)]
struct Cli {
    /// Configuration file.
    #[arg(short, long, default_value = "kisiowall-api.toml")]
    config: PathBuf,

    /// Reload the configuration when the file changes.
    #[arg(short, long)]
    watch: bool,

    /// Validate the configuration and exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();

    let config = load_config(&cli.config)?;
    if cli.check {
        println!("{}: configuration OK", cli.config.display());
        return Ok(());
    }

    logging::init_logging(&config.observability)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "kisiowall-api starting");
    tracing::info!(
        config = %cli.config.display(),
        bind_address = %config.listener.bind_address,
        upstream_timeout_secs = config.timeouts.upstream_secs,
        export_path = %config.analytics.export_path.display(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr);
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(config)?;

    // The watcher stops delivering updates once dropped.
    let (_watcher, config_updates) = if cli.watch {
        let (watcher, updates) = ConfigWatcher::new(&cli.config);
        (Some(watcher.run()?), updates)
    } else {
        let (_, updates) = mpsc::unbounded_channel();
        (None, updates)
    };

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(shutdown.clone());

    server.run(listener, config_updates, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
