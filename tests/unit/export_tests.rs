//! Unit tests for combined patch export.

use chrono::{TimeZone, Utc};

use planpatch::export::{export_filename, export_patches, ExportFormat, ExportRequest};
use planpatch::models::{AcceptedStep, PatchFormat, PatchPayload, PlanStep};

fn entry(id: &str, diff: &str, accepted: bool) -> AcceptedStep {
    AcceptedStep {
        step: PlanStep::new(id, format!("Title {id}"), format!("Describe {id}")),
        execution: Some(PatchPayload::unified(id, diff, format!("Because {id}"))),
        accepted,
    }
}

fn request<'a>(steps: &'a [AcceptedStep], format: ExportFormat, include_metadata: bool) -> ExportRequest<'a> {
    ExportRequest {
        task: "Rename helper",
        steps,
        code_context: "File: app.py\n```python\nx = 1\n```",
        format,
        include_metadata,
        generated_at: Utc.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap(),
    }
}

#[test]
fn filename_embeds_timestamp() {
    let at = Utc.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap();
    assert_eq!(export_filename(&at), "planpatch-20260304-050607.patch");
}

#[test]
fn plain_export_includes_only_accepted_executed_steps() {
    let steps = vec![
        entry("s1", "@@ -1 +1 @@\n-x = 1\n+x = 2", true),
        entry("s2", "@@ -1 +1 @@\n-x = 2\n+x = 3", false),
        AcceptedStep {
            step: PlanStep::new("s3", "T", "D"),
            execution: None,
            accepted: true,
        },
    ];
    let export = export_patches(&request(&steps, ExportFormat::Plain, false));

    assert_eq!(export.steps_applied, 1);
    assert_eq!(export.content, "@@ -1 +1 @@\n-x = 1\n+x = 2\n");
    assert!(export.filename.ends_with(".patch"));
}

#[test]
fn metadata_block_counts_applied_over_total() {
    let steps = vec![
        entry("s1", "+a", true),
        entry("s2", "+b", true),
        entry("s3", "+c", false),
    ];
    let export = export_patches(&request(&steps, ExportFormat::Plain, true));

    let mut lines = export.content.lines();
    assert_eq!(lines.next(), Some("# Generated by planpatch"));
    assert_eq!(lines.next(), Some("# Generated: 2026-03-04T05:06:07+00:00"));
    assert_eq!(lines.next(), Some("# Task: Rename helper"));
    assert_eq!(lines.next(), Some("# Steps Applied: 2/3"));
    assert!(export.content.contains("+a\n\n+b"));
}

#[test]
fn git_export_wraps_with_resolved_target() {
    let steps = vec![entry("s1", "@@ -1 +1 @@\n-x = 1\n+x = 2", true)];
    let export = export_patches(&request(&steps, ExportFormat::Git, false));
    assert!(export.content.starts_with(
        "diff --git a/app.py b/app.py\n--- a/app.py\n+++ b/app.py\n@@ -1 +1 @@"
    ));
}

#[test]
fn git_export_renders_full_file_as_addition() {
    let steps = vec![AcceptedStep {
        step: PlanStep::new("s1", "T", "D"),
        execution: Some(PatchPayload {
            step_id: "s1".into(),
            format: PatchFormat::FullFile,
            diff_text: "x = 2\ny = 3".into(),
            explanation: String::new(),
        }),
        accepted: true,
    }];
    let export = export_patches(&request(&steps, ExportFormat::Git, false));
    assert!(export.content.contains("@@ -0,0 +1,2 @@\n+x = 2\n+y = 3"));
}

#[test]
fn annotated_export_comments_step_details() {
    let steps = vec![entry("s1", "+line", true)];
    let export = export_patches(&request(&steps, ExportFormat::Annotated, false));
    assert_eq!(
        export.content,
        "# Step: s1\n# Title: Title s1\n# Description: Describe s1\n# Explanation: Because s1\n+line\n"
    );
}

#[test]
fn export_follows_plan_order() {
    let steps = vec![entry("s1", "+first", true), entry("s2", "+second", true)];
    let export = export_patches(&request(&steps, ExportFormat::Plain, false));
    assert_eq!(export.content, "+first\n\n+second\n");
}
