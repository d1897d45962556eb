//! Job command handlers
//!
//! Direct access to the job protocol: submit to any endpoint, probe a status,
//! or wait for a job and dump its raw result.

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use quarry_client::{JobId, JobStatus};
use serde_json::Value as JsonValue;
use std::path::Path;
use tokio_util::sync::CancellationToken;

use crate::config::Config;

/// Job subcommands
#[derive(Subcommand)]
pub enum JobCommands {
    /// Submit a job and print its id
    Submit {
        /// Endpoint name (e.g. compile-async)
        endpoint: String,

        /// JSON file posted as the request body; without it a GET is sent
        #[arg(short, long)]
        payload: Option<String>,
    },
    /// Probe the status of a job once
    Status {
        /// Job id
        id: String,
    },
    /// Wait for a job and print its result
    Wait {
        /// Job id
        id: String,

        /// Result endpoint prefix (e.g. compile-result)
        #[arg(short, long)]
        result: String,
    },
}

/// Handle job commands
///
/// Routes job subcommands to their respective handlers.
///
/// # Arguments
/// * `command` - The job command to execute
/// * `config` - The CLI configuration
/// * `cancel` - Cancels a pending wait
pub async fn handle_job_command(
    command: JobCommands,
    config: &Config,
    cancel: &CancellationToken,
) -> Result<()> {
    match command {
        JobCommands::Submit { endpoint, payload } => {
            submit_job(config, &endpoint, payload.as_deref()).await
        }
        JobCommands::Status { id } => job_status(config, &JobId::new(id)).await,
        JobCommands::Wait { id, result } => {
            wait_job(config, &JobId::new(id), &result, cancel).await
        }
    }
}

/// Submit a raw job
async fn submit_job(config: &Config, endpoint: &str, payload: Option<&str>) -> Result<()> {
    let body = payload.map(read_payload).transpose()?;

    let job_id = config
        .client()
        .submit_job(endpoint, body.as_ref())
        .await
        .context("Failed to submit job")?;

    println!("{}", job_id);

    Ok(())
}

/// Print the current status of a job
async fn job_status(config: &Config, job_id: &JobId) -> Result<()> {
    let status = config
        .client()
        .job_status(job_id)
        .await
        .context("Failed to fetch job status")?;

    println!("  Job:    {}", job_id.to_string().cyan());
    println!("  Status: {}", colorize_status(&status));
    if !status.raw().is_empty() {
        println!("  Detail: {}", status.raw().dimmed());
    }

    Ok(())
}

/// Wait for a job and print its raw result
async fn wait_job(
    config: &Config,
    job_id: &JobId,
    result_endpoint: &str,
    cancel: &CancellationToken,
) -> Result<()> {
    let payload = config
        .client()
        .await_result_with_cancel(job_id, result_endpoint, cancel)
        .await
        .with_context(|| format!("Failed to wait for job {}", job_id))?;

    match payload.json::<JsonValue>() {
        Ok(value) => println!("{}", serde_json::to_string_pretty(&value)?),
        Err(_) => println!("{}", payload.text()),
    }

    Ok(())
}

/// Read a JSON request body from disk
fn read_payload(path: &str) -> Result<JsonValue> {
    let content = std::fs::read_to_string(Path::new(path))
        .with_context(|| format!("Failed to read payload file: {}", path))?;

    serde_json::from_str(&content)
        .with_context(|| format!("Payload file is not valid JSON: {}", path))
}

/// Colorize job status for display
fn colorize_status(status: &JobStatus) -> ColoredString {
    let label = status.label();
    match status {
        JobStatus::Completed(_) => label.green(),
        JobStatus::Errored(_) => label.red(),
        JobStatus::InProgress(_) => label.yellow(),
    }
}
