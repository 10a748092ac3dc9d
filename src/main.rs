//! PollDaemon - bounded-concurrency endpoint poller
//!
//! CLI entry point: loads configuration, wires up signal handling, and runs
//! the poll engine until interrupted.

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use eyre::{Context, Result};
use tokio::sync::mpsc;
use tracing::info;

use polldaemon::cli::Cli;
use polldaemon::config::Config;
use polldaemon::engine::PollEngine;

fn setup_logging(verbose: bool) -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("polldaemon")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Setup tracing subscriber - write to log file, not stdout/stderr, so
    // stdout stays reserved for the per-batch progress lines
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    let log_file = fs::File::create(log_dir.join("polldaemon.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (verbose: {})", verbose);
    Ok(())
}

/// Forward termination signals into the shutdown channel
async fn listen_for_shutdown(shutdown_tx: mpsc::Sender<()>) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut sigint = match signal(SignalKind::interrupt()) {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGINT handler");
                return;
            }
        };
        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                return;
            }
        };

        tokio::select! {
            _ = sigint.recv() => {
                tracing::warn!("SIGINT received");
            }
            _ = sigterm.recv() => {
                tracing::warn!("SIGTERM received");
            }
        }
        let _ = shutdown_tx.send(()).await;
    }

    #[cfg(not(unix))]
    {
        // On non-Unix, just wait for Ctrl+C
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_tx.send(()).await;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    setup_logging(cli.verbose).context("Failed to setup logging")?;

    // Load configuration and apply CLI overrides
    let mut config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    cli.apply_overrides(&mut config);
    config.validate()?;

    info!(
        url = %config.endpoint.url,
        count = config.batch.count,
        concurrency = config.batch.concurrency,
        "PollDaemon loaded config"
    );

    let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
    tokio::spawn(listen_for_shutdown(shutdown_tx));

    let mut engine = PollEngine::new(config)?;
    engine.run(shutdown_rx).await?;

    println!("Interrupted, shutting down");
    Ok(())
}
