//! Page bootstrap server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ request id / trace / timeout layers
//!                         │
//!                         ▼
//!                     page handler ──▶ route table (first answer wins)
//!                                         │
//!          ┌──────────────┬───────────────┼──────────────────┬─────────────┐
//!          ▼              ▼               ▼                  ▼             ▼
//!     home redirect   legacy /sites   /discover /plans    /theme      sections
//!                                                                        │
//!                                           session gate ◀───────────────┘
//!                                        (identity service)
//!                                                │
//!                                                ▼
//!     Client Response ◀── X-Frame-Options ◀── shell renderer ◀── context + assets
//! ```

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use page_bootstrap::config::loader::load_config;
use page_bootstrap::observability::{logging, metrics};
use page_bootstrap::{HttpServer, ServerConfig, Shutdown};

#[derive(Parser)]
#[command(name = "page-bootstrap")]
#[command(about = "Server-side route bootstrap for the single-page app", long_about = None)]
struct Cli {
    /// Configuration file (TOML). Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,

    /// Validate the configuration and exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    if cli.check {
        println!("configuration ok: {} sections", config.sections.len());
        return Ok(());
    }

    logging::init_logging(&config.observability.log_level);

    tracing::info!("page-bootstrap v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        env = %config.env,
        user_bootstrap = config.auth.user_bootstrap,
        sections = config.sections.len(),
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
    let shutdown = Shutdown::new();
    let server = HttpServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
