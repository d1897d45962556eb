//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod compile;
mod job;
mod verify;
mod versions;

pub use compile::CompileArgs;
pub use job::JobCommands;
pub use verify::VerifyArgs;

use anyhow::Result;
use clap::Subcommand;
use colored::*;
use quarry_core::diagnostics::{Diagnostic, DiagnosticKind, parse_diagnostics};
use tokio_util::sync::CancellationToken;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Compile a contract project
    Compile(CompileArgs),
    /// Verify a deployed contract against its sources
    Verify(VerifyArgs),
    /// Low-level job operations
    Job {
        #[command(subcommand)]
        command: JobCommands,
    },
    /// Show compiler versions accepted by the service
    Versions,
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
///
/// # Arguments
/// * `command` - The command to execute
/// * `config` - The CLI configuration
/// * `cancel` - Cancels any job the command is waiting on
pub async fn handle_command(
    command: Commands,
    config: &Config,
    cancel: &CancellationToken,
) -> Result<()> {
    match command {
        Commands::Compile(args) => compile::handle_compile_command(args, config, cancel).await,
        Commands::Verify(args) => verify::handle_verify_command(args, config, cancel).await,
        Commands::Job { command } => job::handle_job_command(command, config, cancel).await,
        Commands::Versions => versions::handle_versions_command(config).await,
    }
}

/// Print the diagnostics found in a failed job's message
///
/// Falls back to the raw message when nothing could be parsed.
fn print_job_failure(message: &str) {
    let diagnostics = parse_diagnostics(message);

    if diagnostics.is_empty() {
        println!("{}", message.red());
        return;
    }

    for diagnostic in &diagnostics {
        print_diagnostic(diagnostic);
    }

    let errors = diagnostics
        .iter()
        .filter(|d| d.kind == DiagnosticKind::Error)
        .count();
    println!();
    println!(
        "{}",
        format!("{} diagnostic(s), {} error(s)", diagnostics.len(), errors).bold()
    );
}

fn print_diagnostic(diagnostic: &Diagnostic) {
    let kind = match &diagnostic.code {
        Some(code) => format!("{}[{}]", diagnostic.kind, code),
        None => diagnostic.kind.to_string(),
    };
    let kind = match diagnostic.kind {
        DiagnosticKind::Error => kind.red().bold(),
        DiagnosticKind::Warning => kind.yellow().bold(),
        DiagnosticKind::Note | DiagnosticKind::Help => kind.cyan(),
    };

    println!("{}: {}", kind, diagnostic.message);
    if let Some(location) = diagnostic.location() {
        println!("  {} {}", "-->".dimmed(), location.dimmed());
    }
}
