use anyhow::{Context, Result};
use clap::Parser;
use liveclass_client::{
    ClientConfig, HttpRelayClient, LiveClassSession, RosterSource, WebRtcPeerFactory,
};
use liveclass_core::{ClassId, ParticipantId};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "liveclass-peer")]
#[command(about = "Joins a live class and negotiates WebRTC connections through the relay")]
struct Cli {
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long)]
    relay_url: Option<String>,

    /// Session token issued by the relay.
    #[arg(long)]
    token: Option<String>,

    /// Expected participant id; checked against the relay's answer.
    #[arg(long)]
    participant: Option<ParticipantId>,

    #[arg(long)]
    class: Option<ClassId>,

    #[arg(long)]
    poll_ms: Option<u64>,

    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut config = match &cli.config {
        Some(path) => ClientConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => ClientConfig::default(),
    };
    if let Some(url) = cli.relay_url {
        config.relay_url = url;
    }
    if let Some(token) = cli.token {
        config.token = token;
    }
    if cli.participant.is_some() {
        config.participant_id = cli.participant;
    }
    if cli.class.is_some() {
        config.class_id = cli.class;
    }
    if let Some(ms) = cli.poll_ms {
        config.poll_interval_ms = ms;
    }
    config.validate().context("Invalid client configuration")?;

    let class_id = config.class_id.context("class id missing")?;

    let relay = Arc::new(HttpRelayClient::new(config.relay_url.clone(), config.token.clone())?);
    let reported = relay
        .identity()
        .await
        .context("Failed to resolve our identity from the relay")?;
    let local_id = config.resolve_identity(reported)?;
    info!("Authenticated as {}", local_id);

    let roster = relay
        .participants(&class_id)
        .await
        .context("Failed to fetch class roster")?;
    info!("Class {} has {} participant(s)", class_id, roster.len());

    let factory = Arc::new(WebRtcPeerFactory::new(config.ice_servers.clone()));
    let mut session = LiveClassSession::new(
        class_id,
        local_id,
        relay,
        factory,
        config.session_options(),
    );
    session.join(&roster).await?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        info!("Leaving class");
        let _ = shutdown_tx.send(true);
    });

    session.run(shutdown_rx).await?;
    info!("Session ended");
    Ok(())
}
