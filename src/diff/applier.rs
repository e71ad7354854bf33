//! Patch application against an in-memory source buffer.
//!
//! Replays hunk operations on a mutable line array with a single cursor.
//! Application never aborts: malformed hunk headers leave the cursor where
//! it is and out-of-range deletions are skipped and counted. CRLF sources
//! are normalized to LF for the walk and restored afterwards.

use tracing::{debug, warn};

use crate::models::{PatchFormat, PatchPayload};
use crate::{AppError, Result};

use super::parser::{file_header_mask, parse_hunk_header};

/// Result of applying one patch with bookkeeping about skipped work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyReport {
    /// Patched content.
    pub content: String,
    /// Deletions that pointed past the end of the buffer.
    pub skipped_deletions: usize,
    /// Hunk headers that did not parse and were ignored.
    pub malformed_headers: usize,
}

/// Apply unified-diff dialect text to `original`.
///
/// ```
/// let out = planpatch::diff::applier::apply_patch("a\nb\nc", "@@ -1,3 +1,4 @@\n a\n+x\n b\n c");
/// assert_eq!(out, "a\nx\nb\nc");
/// ```
#[must_use]
pub fn apply_patch(original: &str, diff_text: &str) -> String {
    apply_patch_with_report(original, diff_text).content
}

/// Apply unified-diff dialect text and report what had to be skipped.
#[must_use]
pub fn apply_patch_with_report(original: &str, diff_text: &str) -> ApplyReport {
    let has_crlf = original.contains("\r\n");
    let source = if has_crlf {
        original.replace("\r\n", "\n")
    } else {
        original.to_owned()
    };

    let mut lines: Vec<String> = source.split('\n').map(str::to_owned).collect();
    let mut pos = 0usize;
    let mut skipped_deletions = 0usize;
    let mut malformed_headers = 0usize;

    let raw_lines: Vec<&str> = diff_text.lines().collect();
    let headers = file_header_mask(&raw_lines);

    for (&raw, is_header) in raw_lines.iter().zip(headers) {
        if raw.starts_with("@@") {
            match parse_hunk_header(raw) {
                Some(header) => pos = header.old_start.saturating_sub(1),
                None => {
                    malformed_headers += 1;
                    debug!(line = raw, "malformed hunk header; cursor unchanged");
                }
            }
        } else if is_header {
            // File headers carry no edit.
        } else if raw.starts_with('-') {
            if pos < lines.len() {
                lines.remove(pos);
            } else {
                skipped_deletions += 1;
                debug!(pos, len = lines.len(), "deletion out of range; skipped");
            }
        } else if let Some(added) = raw.strip_prefix('+') {
            let at = pos.min(lines.len());
            lines.insert(at, added.to_owned());
            pos = at + 1;
        } else {
            pos += 1;
        }
    }

    let joined = lines.join("\n");
    let content = if has_crlf {
        joined.replace('\n', "\r\n")
    } else {
        joined
    };

    ApplyReport {
        content,
        skipped_deletions,
        malformed_headers,
    }
}

/// Whether the text contains anything the applier can act on.
fn has_operations(diff_text: &str) -> bool {
    let lines: Vec<&str> = diff_text.lines().collect();
    let headers = file_header_mask(&lines);
    lines.iter().zip(headers).any(|(line, is_header)| {
        line.starts_with("@@") || (!is_header && (line.starts_with('+') || line.starts_with('-')))
    })
}

/// Apply a normalized payload, honoring its format.
///
/// Full-file payloads replace the content wholesale.
///
/// # Errors
///
/// Returns `AppError::Diff` when the payload text is blank, or when a
/// unified diff has neither a hunk header nor any `+`/`-` line.
pub fn apply_payload(original: &str, payload: &PatchPayload) -> Result<ApplyReport> {
    if payload.diff_text.trim().is_empty() {
        return Err(AppError::Diff(format!(
            "patch for step {} is empty",
            payload.step_id
        )));
    }

    match payload.format {
        PatchFormat::FullFile => Ok(ApplyReport {
            content: payload.diff_text.clone(),
            skipped_deletions: 0,
            malformed_headers: 0,
        }),
        PatchFormat::UnifiedDiff => {
            if !has_operations(&payload.diff_text) {
                return Err(AppError::Diff(format!(
                    "patch for step {} has no hunks or changed lines",
                    payload.step_id
                )));
            }
            Ok(apply_patch_with_report(original, &payload.diff_text))
        }
    }
}

/// Totals from folding several patches into one buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceOutcome {
    /// Content after the last successful patch.
    pub content: String,
    /// Patches that were applied.
    pub applied: usize,
    /// Patches that failed and were skipped.
    pub failed: usize,
    /// Out-of-range deletions across all applied patches.
    pub skipped_deletions: usize,
}

/// Apply payloads one after another, each output feeding the next.
///
/// A failing payload is logged and skipped; the content it would have
/// replaced is kept and the chain continues.
#[must_use]
pub fn apply_sequence<'a, I>(original: &str, payloads: I) -> SequenceOutcome
where
    I: IntoIterator<Item = &'a PatchPayload>,
{
    let mut outcome = SequenceOutcome {
        content: original.to_owned(),
        applied: 0,
        failed: 0,
        skipped_deletions: 0,
    };

    for payload in payloads {
        match apply_payload(&outcome.content, payload) {
            Ok(report) => {
                if report.skipped_deletions > 0 {
                    warn!(
                        step_id = %payload.step_id,
                        skipped = report.skipped_deletions,
                        "patch applied partially"
                    );
                }
                outcome.content = report.content;
                outcome.applied += 1;
                outcome.skipped_deletions += report.skipped_deletions;
            }
            Err(err) => {
                warn!(step_id = %payload.step_id, %err, "patch skipped; keeping prior content");
                outcome.failed += 1;
            }
        }
    }

    outcome
}
