//! ember-consumer-cli: connects to a device, walks its tree, and on
//! completion or Ctrl-C writes out a snapshot file.

mod cli;
mod collector;
mod config;

use ember_consumer::{Consumer, ConsumerError, Event};
use ember_glow::Path;
use thiserror::Error;
use tracing::{error, info, warn};

use collector::TreeCollector;

#[derive(Debug, Error)]
enum AppError {
    #[error("consumer error: {0}")]
    Consumer(#[from] ConsumerError),
    #[error("snapshot error: {0}")]
    Snapshot(#[from] ember_snapshot::SnapshotError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")))
        .init();

    let cli = cli::Cli::parse();
    info!(version = env!("CARGO_PKG_VERSION"), "ember-consumer-cli starting");

    let mut cfg = match config::load_config_from_path(std::path::Path::new(&cli.config)) {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("FATAL: failed to load config: {err}");
            std::process::exit(1);
        }
    };
    if let Some(host) = cli.host {
        cfg.host = host;
    }
    if let Some(port) = cli.port {
        cfg.port = port;
    }
    if let Some(output) = cli.output {
        cfg.snapshot_output_path = output;
    }

    if let Err(err) = run(cfg).await {
        error!(error = %err, "ember-consumer-cli exiting with an error");
        std::process::exit(1);
    }
}

async fn run(cfg: config::Config) -> Result<(), AppError> {
    info!(host = %cfg.host, port = cfg.port, "connecting");
    let (consumer, mut events) = Consumer::connect(&cfg.host, cfg.port).await?;

    let extra_roots: Vec<Path> = cfg.expand_paths.iter().filter_map(|p| Path::parse(p)).collect();
    consumer.fetch_complete_tree(extra_roots).await?;

    let mut collector = TreeCollector::new();

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else {
                    warn!("consumer event stream ended");
                    break;
                };
                let done = matches!(event, Event::TreeFetchComplete);
                collector.record(&event);
                if done {
                    info!("tree fetch complete");
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("received Ctrl-C, writing snapshot early");
                break;
            }
        }
    }

    consumer.disconnect().await.ok();

    let store = collector.finish();
    let capture_time = chrono::Utc::now().to_rfc3339();
    let snapshot = ember_snapshot::from_store(&store, &cfg.host, &capture_time, &cfg.host, cfg.port);
    let json = ember_snapshot::save_json(&snapshot)?;
    std::fs::write(&cfg.snapshot_output_path, json)?;
    info!(path = %cfg.snapshot_output_path, "snapshot written");

    Ok(())
}
