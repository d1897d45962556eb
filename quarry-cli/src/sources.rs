//! Project source collection
//!
//! Walks a contract project and gathers the files sent to the service.

use anyhow::{Context, Result};
use quarry_core::dto::SourceFile;
use std::fs;
use std::path::Path;
use tracing::warn;

/// Directories that never hold sources
const SKIPPED_DIRS: &[&str] = &["target", "artifacts", "node_modules"];

/// Collect source files under `root`
///
/// Hidden entries, build output directories and files that are not valid
/// UTF-8 are skipped. When `extensions`
/// is non-empty only files with one of those extensions are kept. Paths are
/// relative to `root`, use `/` separators and come back sorted.
pub fn collect_sources(root: &Path, extensions: &[String]) -> Result<Vec<SourceFile>> {
    if !root.is_dir() {
        anyhow::bail!("{} is not a directory", root.display());
    }

    let mut files = Vec::new();
    walk(root, root, extensions, &mut files)?;
    files.sort_by(|a, b| a.path.cmp(&b.path));

    Ok(files)
}

fn walk(root: &Path, dir: &Path, extensions: &[String], files: &mut Vec<SourceFile>) -> Result<()> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("Failed to read directory: {}", dir.display()))?;

    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        let name = entry.file_name();
        let name = name.to_string_lossy();

        if name.starts_with('.') {
            continue;
        }

        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            if !SKIPPED_DIRS.contains(&&*name) {
                walk(root, &path, extensions, files)?;
            }
            continue;
        }

        if !file_type.is_file() || !has_extension(&path, extensions) {
            continue;
        }

        let bytes =
            fs::read(&path).with_context(|| format!("Failed to read source file: {}", path.display()))?;
        match String::from_utf8(bytes) {
            Ok(content) => files.push(SourceFile::new(relative_path(root, &path), content)),
            Err(_) => warn!(path = %path.display(), "Skipping file that is not valid UTF-8"),
        }
    }

    Ok(())
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    if extensions.is_empty() {
        return true;
    }

    path.extension()
        .map(|ext| ext.to_string_lossy())
        .is_some_and(|ext| {
            extensions
                .iter()
                .any(|wanted| wanted.trim_start_matches('.').eq_ignore_ascii_case(&ext))
        })
}

fn relative_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
