//! rewrite-headers
//!
//! Reverse proxy that forwards every request to one upstream and rewrites
//! the response headers on the way back.
//!
//! ```text
//!     Client ──▶ listener ──▶ request id ──▶ timeout ──▶ header rewrite ──▶ proxy handler ──▶ Upstream
//!     Client ◀── head (rewritten) + body (untouched) ◀──────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use rewrite_headers::config::{load_config, ProxyConfig};
use rewrite_headers::http::HttpServer;
use rewrite_headers::lifecycle::{signals, Shutdown};
use rewrite_headers::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "rewrite-headers")]
#[command(about = "Reverse proxy that rewrites response headers with regex rules", long_about = None)]
struct Cli {
    /// Path to the configuration file (TOML, or JSON with a .json extension).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Validate the configuration and compile the rewrite rules, then exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };

    logging::init_logging(&config.observability);
    tracing::info!("rewrite-headers v{} starting", env!("CARGO_PKG_VERSION"));

    // Compiles the rewrite rules; an invalid pattern stops startup here.
    let server = HttpServer::new(config)?;
    let config = server.config();

    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.address,
        instance = %config.rewrite.name,
        rules = config.rewrite.config.rewrites.len(),
        "Configuration loaded"
    );

    if cli.check {
        tracing::info!("Configuration OK");
        return Ok(());
    }

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let shutdown = Arc::new(Shutdown::new());
    let server_shutdown = shutdown.subscribe();
    signals::spawn_signal_listener(shutdown);

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
