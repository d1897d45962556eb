//! Versions command handler

use anyhow::{Context, Result};
use colored::*;

use crate::config::Config;

/// Print the service version and the accepted compiler versions
pub async fn handle_versions_command(config: &Config) -> Result<()> {
    let client = config.client();

    let service_version = client
        .service_version()
        .await
        .context("Failed to fetch service version")?;
    let versions = client
        .allowed_versions()
        .await
        .context("Failed to fetch allowed compiler versions")?;

    println!("Service:  {}", service_version.cyan());

    if versions.is_empty() {
        println!("{}", "No compiler versions advertised.".yellow());
    } else {
        println!("{}", "Compiler versions:".bold());
        for version in versions {
            println!("  {} {}", "▸".cyan(), version);
        }
    }

    Ok(())
}
