use anyhow::{Context, Result};
use clap::Parser;
use liveclass_relay::{RelayConfig, router, spawn_sweeper};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "liveclass-relay")]
#[command(about = "Signaling relay for live-class WebRTC negotiation")]
struct Cli {
    /// TOML config file with classes and session tokens.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long)]
    bind: Option<SocketAddr>,

    /// Lifetime of undelivered signals, in seconds.
    #[arg(long)]
    ttl_secs: Option<u64>,

    #[arg(long)]
    sweep_secs: Option<u64>,

    /// Used when RUST_LOG is not set.
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut config = match &cli.config {
        Some(path) => RelayConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => RelayConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.bind_addr = bind;
    }
    if let Some(ttl) = cli.ttl_secs {
        config.signal_ttl_secs = ttl;
    }
    if let Some(sweep) = cli.sweep_secs {
        config.sweep_interval_secs = sweep;
    }
    config.validate().context("Invalid relay configuration")?;

    if config.sessions.is_empty() {
        warn!("No session tokens configured; every request will be rejected");
    }

    let service = config.build_service();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweeper = spawn_sweeper(service.store().clone(), config.sweep_interval(), shutdown_rx);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    info!(
        "Relay listening on {} ({} classes, ttl {}s)",
        config.bind_addr,
        config.classes.len(),
        config.signal_ttl_secs
    );

    axum::serve(listener, router(service))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown requested");
        })
        .await
        .context("Relay server failed")?;

    let _ = shutdown_tx.send(true);
    let _ = sweeper.await;
    info!("Relay stopped");
    Ok(())
}
