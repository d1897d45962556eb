//! Quarry CLI
//!
//! Command-line interface for the asynchronous compilation and verification service.

mod commands;
mod config;
mod sources;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use tokio_util::sync::CancellationToken;
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "quarry")]
#[command(about = "Compile and verify contracts against a remote compilation service", long_about = None)]
struct Cli {
    /// Compilation service URL
    #[arg(long, env = "QUARRY_SERVICE_URL", default_value = "http://localhost:3000")]
    service_url: String,

    /// Delay between two status polls, in milliseconds
    #[arg(long, env = "QUARRY_POLL_INTERVAL_MS", default_value_t = 1000)]
    poll_interval_ms: u64,

    /// Give up waiting for a job after this many seconds (0 waits forever)
    #[arg(long, env = "QUARRY_MAX_WAIT_SECS", default_value_t = 600)]
    max_wait_secs: u64,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so command output stays pipeable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quarry=info,quarry_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config::new(cli.service_url, cli.poll_interval_ms, cli.max_wait_secs);
    config.validate()?;

    let cancel = CancellationToken::new();
    spawn_ctrl_c_handler(cancel.clone());

    handle_command(cli.command, &config, &cancel).await
}

/// Cancel outstanding job waits on Ctrl-C
fn spawn_ctrl_c_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling outstanding jobs");
            cancel.cancel();
        }
    });
}
