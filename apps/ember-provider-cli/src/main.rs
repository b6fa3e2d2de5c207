//! ember-provider-cli: loads a snapshot file and serves it to any number of
//! connecting consumers until interrupted.

mod cli;
mod config;

use std::time::Duration;

use ember_provider::{Provider, ProviderEvent};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
enum AppError {
    #[error("snapshot error: {0}")]
    Snapshot(#[from] ember_snapshot::SnapshotError),
    #[error("provider error: {0}")]
    Provider(#[from] ember_provider::ProviderError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")))
        .init();

    let cli = cli::Cli::parse();
    info!(version = env!("CARGO_PKG_VERSION"), "ember-provider-cli starting");

    let mut cfg = match config::load_config_from_path(std::path::Path::new(&cli.config)) {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("FATAL: failed to load config: {err}");
            std::process::exit(1);
        }
    };
    if let Some(snapshot) = cli.snapshot {
        cfg.snapshot_path = snapshot;
    }
    if let Some(port) = cli.port {
        cfg.port = port;
    }

    if let Err(err) = run(cfg).await {
        tracing::error!(error = %err, "ember-provider-cli exiting with an error");
        std::process::exit(1);
    }
}

async fn run(cfg: config::Config) -> Result<(), AppError> {
    let json = std::fs::read_to_string(&cfg.snapshot_path)?;
    let snapshot = ember_snapshot::load_json(&json)?;
    info!(path = %cfg.snapshot_path, device = %snapshot.device_name, "snapshot loaded");

    let mut provider = Provider::new();
    provider.load(&snapshot)?;
    provider.set_idle_timeout(cfg.idle_timeout_secs.map(Duration::from_secs));

    let mut events = provider.start_listening_on(&cfg.bind_address, cfg.port).await?;
    info!(bind_address = %cfg.bind_address, port = cfg.port, "serving");

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else {
                    warn!("provider event stream ended");
                    break;
                };
                log_event(&event);
            }
            _ = tokio::signal::ctrl_c() => {
                info!("received Ctrl-C, shutting down");
                break;
            }
        }
    }

    Ok(())
}

fn log_event(event: &ProviderEvent) {
    match event {
        ProviderEvent::ClientConnected(addr) => info!(peer = %addr, "client connected"),
        ProviderEvent::ClientDisconnected(addr) => info!(peer = %addr, "client disconnected"),
        ProviderEvent::RequestReceived { path, kind } => info!(%path, ?kind, "request received"),
        ProviderEvent::Error(detail) => warn!(detail = %detail, "provider error"),
    }
}
