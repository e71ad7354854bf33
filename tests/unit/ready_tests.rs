//! Unit tests for ready-file output.

use planpatch::models::ReconstructedFile;
use planpatch::reconstruct::ready::BUNDLE_FILENAME;
use planpatch::reconstruct::{ready_export, write_ready_files};
use planpatch::AppError;

fn file(name: &str, content: &str) -> ReconstructedFile {
    ReconstructedFile {
        filename: name.into(),
        original_content: String::new(),
        corrected_content: content.into(),
        language: "text".into(),
        lines_added: 0,
        lines_removed: 0,
        total_changes: 0,
        changes_summary: "No changes applied".into(),
        patches_applied: 0,
        failed_patches: 0,
        skipped_deletions: 0,
    }
}

#[test]
fn single_file_keeps_name_and_raw_content() {
    let ready = ready_export(&[file("app.py", "print(1)")]).expect("export");
    assert_eq!(ready.filename, "app.py");
    assert_eq!(ready.content, "print(1)");
}

#[test]
fn several_files_are_bundled_with_separators() {
    let ready = ready_export(&[file("a.py", "a = 1"), file("b.py", "b = 2")]).expect("export");
    assert_eq!(ready.filename, BUNDLE_FILENAME);
    assert_eq!(ready.content, "=== a.py ===\na = 1\n\n=== b.py ===\nb = 2");
}

#[test]
fn no_files_means_no_export() {
    assert!(ready_export(&[]).is_none());
}

#[test]
fn corrected_files_are_written_under_root() {
    let temp = tempfile::tempdir().expect("tempdir");
    let out = temp.path().join("out");
    let files = [file("src/app.py", "print(2)"), file("README.md", "# hi")];

    let written = write_ready_files(&files, &out).expect("written");

    assert_eq!(written.len(), 2);
    assert_eq!(
        std::fs::read_to_string(out.join("src/app.py")).expect("read"),
        "print(2)"
    );
    assert_eq!(written[1].bytes_written, 4);
}

#[test]
fn escaping_filename_is_rejected() {
    let temp = tempfile::tempdir().expect("tempdir");
    let result = write_ready_files(&[file("../escape.txt", "x")], temp.path());
    assert!(matches!(result, Err(AppError::PathViolation(_))));
    assert!(!temp.path().parent().expect("parent").join("escape.txt").exists());
}
