//! Compile command handler
//!
//! Collects the sources of a project, runs them through the compilation
//! service and writes the returned artifacts to disk.

use anyhow::{Context, Result};
use clap::Args;
use colored::*;
use quarry_client::ClientError;
use quarry_core::dto::compile::{Artifact, CompileRequest, CompileResult};
use quarry_core::endpoints::COMPILE_RESULT;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tokio_util::sync::CancellationToken;

use super::print_job_failure;
use crate::config::Config;
use crate::sources::collect_sources;

/// Arguments of the compile command
#[derive(Args)]
pub struct CompileArgs {
    /// Project directory
    #[arg(default_value = ".")]
    pub dir: PathBuf,

    /// Compiler version (see `quarry versions`)
    #[arg(short = 'c', long)]
    pub compiler_version: Option<String>,

    /// Only send files with these extensions (comma-separated)
    #[arg(short, long, value_delimiter = ',')]
    pub ext: Vec<String>,

    /// Artifact output directory (defaults to <dir>/artifacts)
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

/// Handle the compile command
pub async fn handle_compile_command(
    args: CompileArgs,
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
        format!("Compiling {} file(s) from {}", files.len(), args.dir.display()).bold()
    );

    let req = CompileRequest {
        version: args.compiler_version,
        files,
    };

    let job_id = client
        .submit_compile(&req)
        .await
        .context("Failed to submit compilation job")?;
    println!("  Job: {}", job_id.to_string().dimmed());

    let payload = match client
        .await_result_with_cancel(&job_id, COMPILE_RESULT, cancel)
        .await
    {
        Ok(payload) => payload,
        Err(ClientError::JobFailed { message, .. }) => {
            println!("{}", "✗ Compilation failed".red().bold());
            println!();
            print_job_failure(&message);
            anyhow::bail!("Compilation job {} failed", job_id);
        }
        Err(e) => {
            return Err(anyhow::Error::from(e).context("Failed to wait for compilation job"));
        }
    };

    let result: CompileResult = payload.json().context("Unexpected compilation result")?;

    let out_dir = args.out.unwrap_or_else(|| args.dir.join("artifacts"));
    write_artifacts(&out_dir, &result.artifacts)?;

    println!("{}", "✓ Compilation succeeded!".green().bold());
    if let Some(message) = result.message.as_deref().filter(|m| !m.is_empty()) {
        println!("  {}", message.dimmed());
    }
    for artifact in &result.artifacts {
        println!(
            "  {} {} {}",
            "▸".cyan(),
            artifact.name,
            format!("({})", artifact.artifact_type).dimmed()
        );
    }
    println!("  Written to {}", out_dir.display().to_string().cyan());

    Ok(())
}

/// Write every artifact below `out_dir`
fn write_artifacts(out_dir: &Path, artifacts: &[Artifact]) -> Result<()> {
    for artifact in artifacts {
        let path = artifact_path(out_dir, &artifact.name)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        fs::write(&path, &artifact.content)
            .with_context(|| format!("Failed to write artifact: {}", path.display()))?;
    }

    Ok(())
}

/// Resolve an artifact name to a path that stays inside `out_dir`
fn artifact_path(out_dir: &Path, name: &str) -> Result<PathBuf> {
    let relative = Path::new(name);
    let is_contained = relative
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));

    if name.is_empty() || !is_contained {
        anyhow::bail!("Refusing to write artifact with unsafe name: {:?}", name);
    }

    Ok(out_dir.join(relative))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_artifact_path_stays_inside_output() {
        let out = Path::new("/tmp/out");
        assert_eq!(
            artifact_path(out, "abi/counter.json").unwrap(),
            PathBuf::from("/tmp/out/abi/counter.json")
        );
        assert!(artifact_path(out, "../escape").is_err());
        assert!(artifact_path(out, "/etc/passwd").is_err());
        assert!(artifact_path(out, "").is_err());
    }

    #[test]
    fn test_write_artifacts() {
        let dir = TempDir::new().unwrap();
        let artifacts = vec![
            Artifact {
                name: "counter.wasm".to_string(),
                content: "AGFzbQ==".to_string(),
                artifact_type: "wasm".to_string(),
            },
            Artifact {
                name: "abi/counter.json".to_string(),
                content: "[]".to_string(),
                artifact_type: "abi".to_string(),
            },
        ];

        write_artifacts(dir.path(), &artifacts).unwrap();

        assert_eq!(
            fs::read_to_string(dir.path().join("abi/counter.json")).unwrap(),
            "[]"
        );
        assert!(dir.path().join("counter.wasm").exists());
    }
}
