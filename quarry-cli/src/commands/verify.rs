//! Verify command handler

use anyhow::{Context, Result};
use clap::Args;
use colored::*;
use quarry_client::ClientError;
use quarry_core::dto::verify::{VerifyRequest, VerifyResult};
use quarry_core::endpoints::VERIFY_RESULT;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

use super::print_job_failure;
use crate::config::Config;
use crate::sources::collect_sources;

/// Arguments of the verify command
#[derive(Args)]
pub struct VerifyArgs {
    /// Project directory
    #[arg(default_value = ".")]
    pub dir: PathBuf,

    /// Address of the deployed contract
    #[arg(short, long)]
    pub address: String,

    /// Network the contract is deployed on
    #[arg(short, long)]
    pub network: String,

    /// Contract to verify when the project holds several
    #[arg(long)]
    pub contract: Option<String>,

    /// Compiler version used for the deployment
    #[arg(short = 'c', long)]
    pub compiler_version: Option<String>,

    /// Only send files with these extensions (comma-separated)
    #[arg(short, long, value_delimiter = ',')]
    pub ext: Vec<String>,
}

/// Handle the verify command
pub async fn handle_verify_command(
    args: VerifyArgs,
    config: &Config,
    cancel: &CancellationToken,
) -> Result<()> {
    let client = config.client();

    let files = collect_sources(&args.dir, &args.ext)?;
    if files.is_empty() {
        anyhow::bail!("No source files found in {}", args.dir.display());
    }

    println!(
        "{}",
        format!("Verifying {} on {}", args.address, args.network).bold()
    );

    let req = VerifyRequest {
        address: args.address,
        network: args.network,
        contract_name: args.contract,
        version: args.compiler_version,
        files,
    };

    let job_id = client
        .submit_verify(&req)
        .await
        .context("Failed to submit verification job")?;
    println!("  Job: {}", job_id.to_string().dimmed());

    let payload = match client
        .await_result_with_cancel(&job_id, VERIFY_RESULT, cancel)
        .await
    {
        Ok(payload) => payload,
        Err(ClientError::JobFailed { message, .. }) => {
            println!("{}", "✗ Verification job failed".red().bold());
            println!();
            print_job_failure(&message);
            anyhow::bail!("Verification job {} failed", job_id);
        }
        Err(e) => {
            return Err(anyhow::Error::from(e).context("Failed to wait for verification job"));
        }
    };

    let result: VerifyResult = payload.json().context("Unexpected verification result")?;
    print_verify_result(&result);

    if !result.is_verified() {
        anyhow::bail!("Contract {} was not verified", req.address);
    }

    Ok(())
}

fn print_verify_result(result: &VerifyResult) {
    if result.is_verified() {
        println!("{}", "✓ Contract verified!".green().bold());
    } else {
        println!("{}", "✗ Contract not verified".red().bold());
    }
    println!("  Status:  {}", result.status);
    if !result.message.is_empty() {
        println!("  Message: {}", result.message.dimmed());
    }
}
