//! Filesystem utilities and the staleness-aware installer.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use anyhow::{Context, Result};
use walkdir::WalkDir;

use crate::util::errors::StageError;

/// Result of a single [`install`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    Copied,
    Skipped,
}

/// Totals for a batch of installs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstallSummary {
    pub copied: usize,
    pub skipped: usize,
}

impl InstallSummary {
    pub fn record(&mut self, outcome: InstallOutcome) {
        match outcome {
            InstallOutcome::Copied => self.copied += 1,
            InstallOutcome::Skipped => self.skipped += 1,
        }
    }

    pub fn merge(&mut self, other: InstallSummary) {
        self.copied += other.copied;
        self.skipped += other.skipped;
    }
}

fn modified(path: &Path) -> Result<SystemTime> {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .with_context(|| format!("failed to read modification time: {}", path.display()))
}

/// `dest` itself, or `dest/<source name>` when `dest` is an existing directory.
fn resolve_dest(source: &Path, dest: &Path) -> PathBuf {
    match source.file_name() {
        Some(name) if dest.is_dir() => dest.join(name),
        _ => dest.to_path_buf(),
    }
}

/// Copy `source` to `dest` unless `dest` is strictly newer.
///
/// If `dest` is an existing directory the file keeps its own name inside it.
/// A missing source fails with [`StageError::MissingSource`] before anything
/// is touched.
pub fn install(source: &Path, dest: &Path) -> Result<InstallOutcome> {
    if !source.is_file() {
        return Err(StageError::MissingSource {
            path: source.to_path_buf(),
        }
        .into());
    }

    let dest = resolve_dest(source, dest);

    let source_mtime = modified(source)?;
    if dest.exists() && modified(&dest)? > source_mtime {
        tracing::debug!("fresh: {}", dest.display());
        return Ok(InstallOutcome::Skipped);
    }

    fs::copy(source, &dest).with_context(|| {
        format!("failed to copy {} to {}", source.display(), dest.display())
    })?;

    // Coarse filesystem clocks can give the copy the source's timestamp,
    // which would make the next check recopy.
    if modified(&dest)? <= source_mtime {
        let file = fs::OpenOptions::new()
            .write(true)
            .open(&dest)
            .with_context(|| format!("failed to open {}", dest.display()))?;
        file.set_modified(source_mtime + Duration::from_millis(1))
            .with_context(|| format!("failed to stamp {}", dest.display()))?;
    }

    tracing::debug!("copy: {} -> {}", source.display(), dest.display());
    Ok(InstallOutcome::Copied)
}

/// Install `source_dir/source_name` as `dest_dir/dest_name`.
pub fn install_as(
    source_dir: &Path,
    source_name: &str,
    dest_dir: &Path,
    dest_name: &str,
) -> Result<InstallOutcome> {
    install(&source_dir.join(source_name), &dest_dir.join(dest_name))
}

/// Install optional debug symbols. Absent symbols are not an error.
///
/// A directory bundle (`.dSYM`) is mirrored file by file and reported as
/// copied if any file in it was.
pub fn install_symbols(source: &Path, dest: &Path) -> Result<Option<InstallOutcome>> {
    if !source.exists() {
        tracing::debug!("no debug symbols at {}", source.display());
        return Ok(None);
    }
    if source.is_dir() {
        let summary = install_tree(source, &resolve_dest(source, dest))?;
        let outcome = if summary.copied > 0 {
            InstallOutcome::Copied
        } else {
            InstallOutcome::Skipped
        };
        return Ok(Some(outcome));
    }
    install(source, dest).map(Some)
}

/// Mirror every file under `source_dir` into `dest_dir`.
pub fn install_tree(source_dir: &Path, dest_dir: &Path) -> Result<InstallSummary> {
    if !source_dir.is_dir() {
        return Err(StageError::MissingSource {
            path: source_dir.to_path_buf(),
        }
        .into());
    }

    let mut summary = InstallSummary::default();
    for entry in WalkDir::new(source_dir).sort_by_file_name() {
        let entry = entry
            .with_context(|| format!("failed to walk directory: {}", source_dir.display()))?;
        let rel = entry
            .path()
            .strip_prefix(source_dir)
            .with_context(|| format!("{} escaped {}", entry.path().display(), source_dir.display()))?;
        let target = dest_dir.join(rel);

        if entry.file_type().is_dir() {
            ensure_dir(&target)?;
        } else {
            summary.record(install(entry.path(), &target)?);
        }
    }
    Ok(summary)
}

/// Remove a directory and all its contents, if it exists.
pub fn remove_dir_all_if_exists(path: &Path) -> Result<bool> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => {
            Err(e).with_context(|| format!("failed to remove directory: {}", path.display()))
        }
    }
}

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Get the relative path from `base` to `path`.
pub fn relative_path(base: &Path, path: &Path) -> PathBuf {
    pathdiff::diff_paths(path, base).unwrap_or_else(|| path.to_path_buf())
}
