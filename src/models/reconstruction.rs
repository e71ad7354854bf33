//! Reconstructed files and the accepted-step join rows that feed them.

use serde::{Deserialize, Serialize};

use super::patch::PatchPayload;
use super::plan::PlanStep;

/// A file with every accepted patch for it folded in.
///
/// Recomputed from scratch whenever the accepted set changes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct ReconstructedFile {
    /// File name from the split result or the patch header.
    pub filename: String,
    /// Content before any patch.
    pub original_content: String,
    /// Content after all accepted patches, in acceptance order.
    pub corrected_content: String,
    /// Display language.
    pub language: String,
    /// Net lines gained.
    pub lines_added: usize,
    /// Net lines lost.
    pub lines_removed: usize,
    /// Position-based change count.
    pub total_changes: usize,
    /// Human-readable summary line.
    pub changes_summary: String,
    /// Patches that contributed to `corrected_content`.
    pub patches_applied: usize,
    /// Patches skipped because nothing in them could be applied.
    pub failed_patches: usize,
    /// Deletions skipped because they pointed past the end of the file.
    pub skipped_deletions: usize,
}

impl ReconstructedFile {
    /// Whether the corrected content differs from the original.
    #[must_use]
    pub fn is_modified(&self) -> bool {
        self.original_content != self.corrected_content
    }

    /// Render original vs. corrected content as a unified diff for review.
    #[must_use]
    pub fn unified_diff(&self) -> String {
        let patch = diffy::create_patch(&self.original_content, &self.corrected_content);
        let body = patch.to_string();
        // diffy emits `--- original` / `+++ modified`; name the real file.
        body.replacen(
            "--- original",
            &format!("--- a/{}", self.filename),
            1,
        )
        .replacen("+++ modified", &format!("+++ b/{}", self.filename), 1)
    }
}

/// Join row between a plan step, its latest execution, and acceptance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedStep {
    /// The plan step.
    pub step: PlanStep,
    /// Latest execution result, if the step has been executed.
    pub execution: Option<PatchPayload>,
    /// Whether the user approved the execution.
    pub accepted: bool,
}

impl AcceptedStep {
    /// Only executed and accepted steps take part in reconstruction and export.
    #[must_use]
    pub fn participates(&self) -> bool {
        self.accepted && self.execution.is_some()
    }
}
