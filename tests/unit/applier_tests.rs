//! Unit tests for patch application.

use planpatch::diff::applier::{apply_patch, apply_patch_with_report, apply_payload, apply_sequence};
use planpatch::models::{PatchFormat, PatchPayload};
use planpatch::AppError;

#[test]
fn inserts_line_after_context() {
    let out = apply_patch("a\nb\nc", "@@ -1,3 +1,4 @@\n a\n+x\n b\n c");
    assert_eq!(out, "a\nx\nb\nc");
}

#[test]
fn deletes_middle_line() {
    let out = apply_patch("a\nb\nc", "@@ -1,3 +1,2 @@\n a\n-b\n c");
    assert_eq!(out, "a\nc");
}

#[test]
fn replaces_line() {
    let out = apply_patch("fn main() {\n    old();\n}", "@@ -1,3 +1,3 @@\n fn main() {\n-    old();\n+    new();\n }");
    assert_eq!(out, "fn main() {\n    new();\n}");
}

#[test]
fn context_only_patch_is_identity() {
    let original = "one\ntwo\nthree\n";
    let out = apply_patch(original, "@@ -1,3 +1,3 @@\n one\n two\n three");
    assert_eq!(out, original);
}

#[test]
fn addition_then_removal_restores_original() {
    let original = "alpha\nbeta\ngamma";
    let added = apply_patch(original, "@@ -2,1 +2,2 @@\n+inserted\n beta");
    assert_eq!(added, "alpha\ninserted\nbeta\ngamma");
    let restored = apply_patch(&added, "@@ -2,2 +2,1 @@\n-inserted\n beta");
    assert_eq!(restored, original);
}

#[test]
fn multiple_hunks_apply_against_shifted_positions() {
    let original = "1\n2\n3\n4\n5\n6";
    let diff = "@@ -1,2 +1,3 @@\n 1\n+1b\n 2\n@@ -6,1 +7,1 @@\n-5\n+five";
    // The second hunk's old_start points into the already-shifted buffer.
    let out = apply_patch(original, diff);
    assert_eq!(out, "1\n1b\n2\n3\n4\nfive\n6");
}

#[test]
fn out_of_range_deletion_is_skipped_and_counted() {
    let report = apply_patch_with_report("a\nb", "@@ -10,1 +10,0 @@\n-missing");
    assert_eq!(report.content, "a\nb");
    assert_eq!(report.skipped_deletions, 1);
}

#[test]
fn malformed_header_leaves_cursor_in_place() {
    let report = apply_patch_with_report("a\nb\nc", "@@ -2,1 +2,1 @@\n@@ nonsense @@\n-b\n+B");
    assert_eq!(report.content, "a\nB\nc");
    assert_eq!(report.malformed_headers, 1);
}

#[test]
fn crlf_line_endings_are_preserved() {
    let out = apply_patch("a\r\nb\r\nc", "@@ -1,3 +1,3 @@\n a\n-b\n+B\n c");
    assert_eq!(out, "a\r\nB\r\nc");
}

#[test]
fn new_file_patch_builds_from_empty() {
    let out = apply_patch("", "--- /dev/null\n+++ b/new.py\n@@ -0,0 +1,2 @@\n+print(1)\n+print(2)");
    assert_eq!(out, "print(1)\nprint(2)\n");
}

#[test]
fn blank_payload_is_a_diff_error() {
    let payload = PatchPayload::unified("s1", "   \n", "");
    let err = apply_payload("a", &payload).unwrap_err();
    assert!(matches!(err, AppError::Diff(_)));
}

#[test]
fn operation_free_payload_is_a_diff_error() {
    let payload = PatchPayload::unified("s1", "Here is what I would change.", "");
    assert!(matches!(apply_payload("a", &payload), Err(AppError::Diff(_))));
}

#[test]
fn full_file_payload_replaces_content() {
    let payload = PatchPayload {
        step_id: "s1".into(),
        format: PatchFormat::FullFile,
        diff_text: "brand new".into(),
        explanation: String::new(),
    };
    let report = apply_payload("old\ncontent", &payload).expect("applies");
    assert_eq!(report.content, "brand new");
}

#[test]
fn sequence_skips_failures_and_keeps_going() {
    let payloads = vec![
        PatchPayload::unified("s1", "@@ -1,1 +1,2 @@\n a\n+b", ""),
        PatchPayload::unified("s2", "no operations at all", ""),
        PatchPayload::unified("s3", "@@ -2,1 +2,2 @@\n b\n+c", ""),
    ];
    let outcome = apply_sequence("a", &payloads);
    assert_eq!(outcome.content, "a\nb\nc");
    assert_eq!(outcome.applied, 2);
    assert_eq!(outcome.failed, 1);
    assert_eq!(outcome.skipped_deletions, 0);
}

#[test]
fn sequence_is_order_sensitive() {
    let first = PatchPayload::unified("a", "@@ -1,1 +1,1 @@\n-x\n+first", "");
    let second = PatchPayload::unified("b", "@@ -1,1 +1,1 @@\n-x\n+second", "");

    let ab = apply_sequence("x", [&first, &second]);
    let ba = apply_sequence("x", [&second, &first]);

    assert_eq!(ab.content, "second");
    assert_eq!(ba.content, "first");
    assert_ne!(ab.content, ba.content);
}

#[test]
fn deleting_a_dash_separator_line_inside_hunk() {
    let out = apply_patch("a\n---\nb", "@@ -1,3 +1,2 @@\n a\n----\n b");
    assert_eq!(out, "a\nb");
}

#[test]
fn adding_a_plus_prefixed_line_inside_hunk() {
    let out = apply_patch(
        "int i = 0;\nreturn i;",
        "@@ -1,2 +1,3 @@\n int i = 0;\n+++i;\n return i;",
    );
    assert_eq!(out, "int i = 0;\n++i;\nreturn i;");
}

#[test]
fn deleting_a_sql_comment_right_after_hunk_header() {
    let out = apply_patch("-- old note\nSELECT 1;", "@@ -1,2 +1,1 @@\n--- old note\n SELECT 1;");
    assert_eq!(out, "SELECT 1;");
}

#[test]
fn second_file_section_headers_are_skipped() {
    let diff = "--- a/x\n+++ b/x\n@@ -1,1 +1,1 @@\n-a\n+b\n--- a/y\n+++ b/y\n@@ -2,1 +2,1 @@\n-d\n+e";
    assert_eq!(apply_patch("a\nd", diff), "b\ne");
}
