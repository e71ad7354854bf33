//! Line-level representation of a parsed patch.

use serde::{Deserialize, Serialize};

/// Classification of a single patch line.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    /// Unchanged line present in both versions.
    Context,
    /// Line introduced by the patch.
    Addition,
    /// Line removed by the patch.
    Deletion,
    /// `---` / `+++` file header.
    FileHeader,
    /// `@@ ... @@` hunk header.
    HunkHeader,
}

/// One line of a parsed diff with its old/new line numbers.
///
/// Deletions carry only `old_line_number`, additions only
/// `new_line_number`, context lines both. Headers carry neither.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct DiffLine {
    /// Line classification.
    pub kind: LineKind,
    /// Line content with the leading marker stripped.
    pub text: String,
    /// 1-based line number in the original file.
    pub old_line_number: Option<usize>,
    /// 1-based line number in the patched file.
    pub new_line_number: Option<usize>,
}

impl DiffLine {
    /// Header line without line numbers.
    #[must_use]
    pub fn header(kind: LineKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            old_line_number: None,
            new_line_number: None,
        }
    }

    /// Whether the line changes content (addition or deletion).
    #[must_use]
    pub fn is_change(&self) -> bool {
        matches!(self.kind, LineKind::Addition | LineKind::Deletion)
    }
}

/// Start offsets declared by a `@@ -a,b +c,d @@` hunk header.
///
/// Counts are kept for display only; application is driven by the start
/// offsets alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HunkHeader {
    /// 1-based start line in the original file (0 for new files).
    pub old_start: usize,
    /// Declared line count in the original file.
    pub old_count: Option<usize>,
    /// 1-based start line in the patched file.
    pub new_start: usize,
    /// Declared line count in the patched file.
    pub new_count: Option<usize>,
}
