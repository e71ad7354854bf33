//! Combined patch export.
//!
//! Serializes accepted per-step patches into one `.patch` artifact,
//! independently of reconstruction.

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::context::split_context;
use crate::diff::parser::has_file_headers;
use crate::models::{AcceptedStep, PatchFormat};
use crate::reconstruct::resolve_target;

/// Layout of the exported patch file.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    /// Diffs concatenated as emitted.
    #[default]
    Plain,
    /// Each diff wrapped with `diff --git` headers.
    Git,
    /// Each diff preceded by commented step details.
    Annotated,
}

/// Inputs for one export.
#[derive(Debug, Clone)]
pub struct ExportRequest<'a> {
    /// Task line from the plan.
    pub task: &'a str,
    /// Every plan step with its execution and acceptance state.
    pub steps: &'a [AcceptedStep],
    /// Code context, used to name targets in git format.
    pub code_context: &'a str,
    /// Output layout.
    pub format: ExportFormat,
    /// Whether to prepend the metadata comment block.
    pub include_metadata: bool,
    /// Timestamp written into the metadata block and file name.
    pub generated_at: DateTime<Utc>,
}

/// A rendered patch artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchExport {
    /// Suggested download name, ending in `.patch`.
    pub filename: String,
    /// File body.
    pub content: String,
    /// Steps included.
    pub steps_applied: usize,
}

/// Download name for an export generated at `at`.
#[must_use]
pub fn export_filename(at: &DateTime<Utc>) -> String {
    format!("planpatch-{}.patch", at.format("%Y%m%d-%H%M%S"))
}

/// Render the accepted steps of `request` into one patch file.
#[must_use]
pub fn export_patches(request: &ExportRequest<'_>) -> PatchExport {
    let split = split_context(request.code_context);
    let included: Vec<&AcceptedStep> = request
        .steps
        .iter()
        .filter(|entry| entry.participates())
        .collect();

    let mut sections = Vec::with_capacity(included.len() + 1);
    if request.include_metadata {
        sections.push(metadata_block(request, included.len()));
    }

    for entry in &included {
        let Some(execution) = entry.execution.as_ref() else {
            continue;
        };
        let diff = execution.diff_text.trim_end_matches('\n');
        let section = match request.format {
            ExportFormat::Plain => diff.to_owned(),
            ExportFormat::Git => {
                let target = resolve_target(execution, &split);
                git_wrap(&target, diff, execution.format)
            }
            ExportFormat::Annotated => {
                let mut lines = vec![
                    format!("# Step: {}", entry.step.id),
                    format!("# Title: {}", entry.step.title),
                ];
                lines.extend(comment_lines("Description", &entry.step.description));
                lines.extend(comment_lines("Explanation", &execution.explanation));
                lines.push(diff.to_owned());
                lines.join("\n")
            }
        };
        sections.push(section);
    }

    let mut content = sections.join("\n\n");
    content.push('\n');

    PatchExport {
        filename: export_filename(&request.generated_at),
        content,
        steps_applied: included.len(),
    }
}

fn metadata_block(request: &ExportRequest<'_>, applied: usize) -> String {
    [
        "# Generated by planpatch".to_owned(),
        format!("# Generated: {}", request.generated_at.to_rfc3339()),
        format!("# Task: {}", request.task),
        format!("# Steps Applied: {applied}/{}", request.steps.len()),
    ]
    .join("\n")
}

fn comment_lines(label: &str, text: &str) -> Vec<String> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }
    let mut lines = text.lines();
    let first = lines.next().unwrap_or_default();
    std::iter::once(format!("# {label}: {first}"))
        .chain(lines.map(|line| format!("#   {line}")))
        .collect()
}

/// Wrap `diff` with git headers for `target`.
///
/// Existing `---` / `+++` headers are kept; missing ones are added. Full
/// file payloads are emitted as whole-file additions.
fn git_wrap(target: &str, diff: &str, format: PatchFormat) -> String {
    let mut out = format!("diff --git a/{target} b/{target}\n");
    match format {
        PatchFormat::FullFile => {
            let count = diff.lines().count();
            out.push_str(&format!("--- a/{target}\n+++ b/{target}\n@@ -0,0 +1,{count} @@\n"));
            let body: Vec<String> = diff.lines().map(|line| format!("+{line}")).collect();
            out.push_str(&body.join("\n"));
        }
        PatchFormat::UnifiedDiff => {
            if !has_file_headers(diff) {
                out.push_str(&format!("--- a/{target}\n+++ b/{target}\n"));
            }
            out.push_str(diff);
        }
    }
    out
}
