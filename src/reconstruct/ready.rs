//! Ready-to-use output of reconstructed files.

use std::path::Path;

use tracing::info;

use crate::diff::writer::{OutputDir, WriteSummary};
use crate::models::ReconstructedFile;
use crate::Result;

/// Download name used when several files are bundled together.
pub const BUNDLE_FILENAME: &str = "corrected-files.txt";

/// A single downloadable artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadyExport {
    /// Suggested file name.
    pub filename: String,
    /// Raw content.
    pub content: String,
}

/// Build the ready-file download for `files`.
///
/// One file keeps its name and raw content. Several files are concatenated
/// with `=== <filename> ===` separators. No files yields `None`.
#[must_use]
pub fn ready_export(files: &[ReconstructedFile]) -> Option<ReadyExport> {
    match files {
        [] => None,
        [only] => Some(ReadyExport {
            filename: only.filename.clone(),
            content: only.corrected_content.clone(),
        }),
        many => {
            let sections: Vec<String> = many
                .iter()
                .map(|file| format!("=== {} ===\n{}", file.filename, file.corrected_content))
                .collect();
            Some(ReadyExport {
                filename: BUNDLE_FILENAME.to_owned(),
                content: sections.join("\n\n"),
            })
        }
    }
}

/// Write every corrected file under `output_root`, creating it if needed.
///
/// # Errors
///
/// Returns `AppError::Io` if the output root cannot be created or a write
/// fails, and `AppError::PathViolation` if a file name escapes the root.
pub fn write_ready_files(
    files: &[ReconstructedFile],
    output_root: &Path,
) -> Result<Vec<WriteSummary>> {
    let out = OutputDir::create(output_root)?;
    let mut written = Vec::with_capacity(files.len());
    for file in files {
        let summary = out.write(&file.filename, &file.corrected_content)?;
        info!(path = %summary.path.display(), bytes = summary.bytes_written, "corrected file written");
        written.push(summary);
    }
    Ok(written)
}
