//! Fold accepted patches into corrected files.

use tracing::{debug, info, warn};

use crate::context::language::{detect_language, language_for_filename};
use crate::context::split_context;
use crate::diff::apply_sequence;
use crate::models::{PatchPayload, ReconstructedFile, SplitResult};

use super::resolver::{creates_file, match_split_file, resolve_target};

/// Position-based change statistics between two buffers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeStats {
    /// Net lines gained.
    pub lines_added: usize,
    /// Net lines lost.
    pub lines_removed: usize,
    /// Positions within the common length whose lines differ.
    pub changed_lines: usize,
    /// `changed_lines + lines_added + lines_removed`.
    pub total_changes: usize,
}

impl ChangeStats {
    /// Compare `original` and `corrected` line by line, by position.
    ///
    /// This is not an alignment-based diff: an insertion near the top
    /// shifts every following line and counts each as changed.
    #[must_use]
    pub fn between(original: &str, corrected: &str) -> Self {
        let before: Vec<&str> = original.split('\n').collect();
        let after: Vec<&str> = corrected.split('\n').collect();

        let lines_added = after.len().saturating_sub(before.len());
        let lines_removed = before.len().saturating_sub(after.len());
        let changed_lines = before
            .iter()
            .zip(after.iter())
            .filter(|(old, new)| old != new)
            .count();

        Self {
            lines_added,
            lines_removed,
            changed_lines,
            total_changes: changed_lines + lines_added + lines_removed,
        }
    }
}

/// Summary line shown next to a reconstructed file.
#[must_use]
pub fn changes_summary(patches_applied: usize, stats: &ChangeStats) -> String {
    if stats.total_changes == 0 {
        return "No changes applied".to_owned();
    }
    let noun = if patches_applied == 1 { "patch" } else { "patches" };
    format!(
        "{patches_applied} {noun} applied: +{} lines, -{} lines",
        stats.lines_added, stats.lines_removed
    )
}

/// Patches grouped under one target file, in acceptance order.
struct TargetGroup<'a> {
    filename: String,
    patches: Vec<&'a PatchPayload>,
}

/// Context file a patch is grouped under.
///
/// A declared path that matches no context file falls back to the first
/// context file, unless the patch creates its file or there is no context.
fn group_filename(payload: &PatchPayload, split: &SplitResult) -> String {
    let resolved = resolve_target(payload, split);
    if let Some(matched) = match_split_file(&resolved, split) {
        return matched.to_owned();
    }
    match split.files.first() {
        Some(first) if !creates_file(&payload.diff_text) => {
            warn!(
                step_id = %payload.step_id,
                declared = %resolved,
                fallback = %first.filename,
                "declared target not in context; using first file"
            );
            first.filename.clone()
        }
        _ => resolved,
    }
}

fn group_by_target<'a>(split: &SplitResult, accepted: &'a [PatchPayload]) -> Vec<TargetGroup<'a>> {
    let mut groups: Vec<TargetGroup<'a>> = Vec::new();
    for payload in accepted {
        let filename = group_filename(payload, split);
        debug!(step_id = %payload.step_id, %filename, "patch target resolved");
        match groups.iter_mut().find(|group| group.filename == filename) {
            Some(group) => group.patches.push(payload),
            None => groups.push(TargetGroup {
                filename,
                patches: vec![payload],
            }),
        }
    }
    groups
}

fn build_file(
    filename: String,
    original: &str,
    language: String,
    patches: &[&PatchPayload],
) -> ReconstructedFile {
    let outcome = apply_sequence(original, patches.iter().copied());
    let stats = ChangeStats::between(original, &outcome.content);
    ReconstructedFile {
        changes_summary: changes_summary(outcome.applied, &stats),
        filename,
        original_content: original.to_owned(),
        corrected_content: outcome.content,
        language,
        lines_added: stats.lines_added,
        lines_removed: stats.lines_removed,
        total_changes: stats.total_changes,
        patches_applied: outcome.applied,
        failed_patches: outcome.failed,
        skipped_deletions: outcome.skipped_deletions,
    }
}

/// Reconstruct every file of `code_context` with `accepted` patches applied.
///
/// Files in the context without patches come back unchanged. A patch whose
/// declared target matches no context file is applied to the first context
/// file. Only file-creating patches (`--- /dev/null`), or any patch when the
/// context is empty, produce a new file that starts empty, appended after
/// the context files in first-acceptance order.
#[must_use]
pub fn reconstruct(code_context: &str, accepted: &[PatchPayload]) -> Vec<ReconstructedFile> {
    let split = split_context(code_context);
    reconstruct_split(&split, accepted)
}

/// [`reconstruct`] over an already split context.
#[must_use]
pub fn reconstruct_split(split: &SplitResult, accepted: &[PatchPayload]) -> Vec<ReconstructedFile> {
    let mut groups = group_by_target(split, accepted);
    let mut files = Vec::with_capacity(split.files.len() + groups.len());

    for source in &split.files {
        let patches = groups
            .iter()
            .position(|group| group.filename == source.filename)
            .map(|idx| groups.remove(idx).patches)
            .unwrap_or_default();
        files.push(build_file(
            source.filename.clone(),
            &source.content,
            source.language.clone(),
            &patches,
        ));
    }

    for group in groups {
        let language = language_for_filename(&group.filename).map_or_else(
            || {
                let first = group.patches.first().map_or("", |p| p.diff_text.as_str());
                detect_language(first).to_owned()
            },
            str::to_owned,
        );
        files.push(build_file(group.filename, "", language, &group.patches));
    }

    info!(
        files = files.len(),
        patches = accepted.len(),
        modified = files.iter().filter(|file| file.is_modified()).count(),
        "reconstruction complete"
    );
    files
}
