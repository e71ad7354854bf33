//! Source files recovered from a code-context blob.

use serde::{Deserialize, Serialize};

/// A single file carved out of the user's code context.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct SourceFile {
    /// File name, unique within one split result.
    pub filename: String,
    /// Original text.
    pub content: String,
    /// Best-effort language tag used for display.
    pub language: String,
}

impl SourceFile {
    /// Construct a source file record.
    #[must_use]
    pub fn new(
        filename: impl Into<String>,
        content: impl Into<String>,
        language: impl Into<String>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
            language: language.into(),
        }
    }
}

/// Outcome of splitting a code-context blob.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct SplitResult {
    /// Files in input order.
    pub files: Vec<SourceFile>,
    /// `true` iff exactly one file was recovered.
    pub is_single_file: bool,
}

impl SplitResult {
    /// Wrap a file list, deriving `is_single_file`.
    #[must_use]
    pub fn from_files(files: Vec<SourceFile>) -> Self {
        let is_single_file = files.len() == 1;
        Self {
            files,
            is_single_file,
        }
    }

    /// Look up a file by exact name.
    #[must_use]
    pub fn find(&self, filename: &str) -> Option<&SourceFile> {
        self.files.iter().find(|file| file.filename == filename)
    }
}
