use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tempfile::{NamedTempFile, TempDir};

/// Returns a fresh temporary directory and a path named `file_name` inside it.
/// Everything in the directory is removed when the `TempDir` is dropped.
pub fn create_temp_file<P: AsRef<Path>>(file_name: P) -> Result<(TempDir, PathBuf)> {
    let temp_dir = tempfile::tempdir().context("Failed to create temporary directory")?;
    let temp_path = temp_dir.path().join(
        file_name
            .as_ref()
            .file_name()
            .ok_or_else(|| anyhow::anyhow!("Invalid temporary file name"))?,
    );

    Ok((temp_dir, temp_path))
}

/// Creates an empty temporary file next to `path` with the same extension, so
/// tools that pick a format from the extension still work and the result can
/// later be renamed over `path` without leaving the filesystem.
pub fn create_sibling_temp_file<P: AsRef<Path>>(path: P) -> Result<NamedTempFile> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let stem = path
        .file_stem()
        .ok_or_else(|| anyhow::anyhow!("Invalid file name: {}", path.display()))?;
    let suffix = path
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();

    let mut prefix = stem.to_os_string();
    prefix.push("_tmp_out");

    tempfile::Builder::new()
        .prefix(&prefix)
        .suffix(&suffix)
        .tempfile_in(dir)
        .with_context(|| format!("Failed to create temporary file in {}", dir.display()))
}
