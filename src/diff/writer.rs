//! Output directory for corrected files and exported patches.
//!
//! Artifact names come from patch headers written by the generation
//! service, so they are resolved segment by segment against the
//! canonical output root and never leave it. Every write lands in a
//! sibling temp file first and is renamed into place.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::{AppError, Result};

/// Outcome of writing one artifact.
#[derive(Debug, Clone)]
pub struct WriteSummary {
    /// Absolute path of the written file.
    pub path: PathBuf,
    /// Number of bytes written.
    pub bytes_written: usize,
}

/// An existing directory that artifacts are written beneath.
#[derive(Debug, Clone)]
pub struct OutputDir {
    root: PathBuf,
}

impl OutputDir {
    /// Create `root` (and its parents) if missing.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Io` if the directory cannot be created or
    /// resolved.
    pub fn create(root: &Path) -> Result<Self> {
        std::fs::create_dir_all(root).map_err(|err| {
            AppError::Io(format!(
                "failed to create output directory {}: {err}",
                root.display()
            ))
        })?;
        let root = root.canonicalize().map_err(|err| {
            AppError::Io(format!("cannot resolve output directory {}: {err}", root.display()))
        })?;
        Ok(Self { root })
    }

    /// Canonical directory this handle writes under.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map an artifact name onto a path inside the root.
    ///
    /// Both `/` and `\` separate segments. `.` and empty segments are
    /// dropped, `..` climbs one segment, and a leading `/` or drive-less
    /// absolute name is taken as relative to the root.
    ///
    /// # Errors
    ///
    /// Returns `AppError::PathViolation` when the name is empty, climbs
    /// above the root, or runs through a symlink that points outside it.
    pub fn resolve(&self, name: &str) -> Result<PathBuf> {
        let mut segments: Vec<&str> = Vec::new();
        for segment in name.split(['/', '\\']) {
            match segment {
                "" | "." => {}
                ".." => {
                    if segments.pop().is_none() {
                        return Err(AppError::PathViolation(format!(
                            "{name} climbs above the output directory"
                        )));
                    }
                }
                other => segments.push(other),
            }
        }
        if segments.is_empty() {
            return Err(AppError::PathViolation(format!("{name:?} names no file")));
        }

        let target: PathBuf = segments.iter().fold(self.root.clone(), |path, seg| path.join(seg));
        self.ensure_contained(&target, name)?;
        Ok(target)
    }

    /// Reject `target` when its deepest existing ancestor resolves outside
    /// the root.
    fn ensure_contained(&self, target: &Path, name: &str) -> Result<()> {
        let Some(existing) = target.ancestors().find(|path| path.exists()) else {
            return Ok(());
        };
        let resolved = existing
            .canonicalize()
            .map_err(|err| AppError::PathViolation(format!("cannot resolve {name}: {err}")))?;
        if resolved.starts_with(&self.root) {
            Ok(())
        } else {
            Err(AppError::PathViolation(format!(
                "{name} resolves outside the output directory"
            )))
        }
    }

    /// Write `content` to `name`, resolved inside the root.
    ///
    /// # Errors
    ///
    /// Returns `AppError::PathViolation` if `name` escapes the root and
    /// `AppError::Io` if the write fails.
    pub fn write(&self, name: &str, content: &str) -> Result<WriteSummary> {
        let target = self.resolve(name)?;
        persist_atomic(&target, content.as_bytes())?;
        debug!(path = %target.display(), bytes = content.len(), "artifact written");
        Ok(WriteSummary {
            path: target,
            bytes_written: content.len(),
        })
    }
}

/// Replace `target` with `bytes` via a temp file in the same directory.
///
/// Missing parent directories are created. A bare file name is written in
/// the current directory.
///
/// # Errors
///
/// Returns `AppError::Io` on directory, temp file, or rename failures.
pub fn persist_atomic(target: &Path, bytes: &[u8]) -> Result<()> {
    let parent = match target.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(|err| {
        AppError::Io(format!("failed to create {}: {err}", parent.display()))
    })?;

    let mut tmp = NamedTempFile::new_in(parent)
        .map_err(|err| AppError::Io(format!("failed to create temporary file: {err}")))?;
    tmp.write_all(bytes)
        .map_err(|err| AppError::Io(format!("failed to write temporary file: {err}")))?;
    tmp.persist(target).map_err(|err| {
        AppError::Io(format!("failed to persist {}: {err}", target.display()))
    })?;
    Ok(())
}
