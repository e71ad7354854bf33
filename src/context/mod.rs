//! Code-context splitting.
//!
//! A single code-context blob may hold zero, one, or many source files.
//! [`split_context`] runs an ordered table of [`SplitRule`]s and keeps the
//! output of the first rule that recovers enough files; the final rule
//! always succeeds on non-blank input.

use tracing::debug;

use crate::models::{SourceFile, SplitResult};
use crate::patterns::{COMMENT_HEADER, FENCED_BLOCK, MARKED_FENCE};

pub mod language;

use language::{canonical_language, detect_language, extension_for_language, language_for_filename};

/// Name given to the whole input when no delimiters are found.
pub const FALLBACK_FILENAME: &str = "main.txt";

/// One entry of the splitting cascade.
#[derive(Debug, Clone, Copy)]
pub struct SplitRule {
    /// Rule name, used in logs.
    pub name: &'static str,
    /// Minimum number of files the rule must recover to be selected.
    pub min_files: usize,
    /// Extractor; returns every file the rule recognises.
    pub extract: fn(&str) -> Vec<SourceFile>,
}

/// Rules in priority order.
pub const SPLIT_RULES: &[SplitRule] = &[
    SplitRule {
        name: "marked_fence",
        min_files: 1,
        extract: extract_marked_fences,
    },
    SplitRule {
        name: "comment_header",
        min_files: 1,
        extract: extract_comment_sections,
    },
    SplitRule {
        name: "unlabeled_fences",
        min_files: 2,
        extract: extract_unlabeled_fences,
    },
    SplitRule {
        name: "whole_input",
        min_files: 1,
        extract: extract_whole_input,
    },
];

/// Split a code-context blob into source files.
///
/// Blank input yields an empty file list; any other input yields at least
/// one file.
#[must_use]
pub fn split_context(text: &str) -> SplitResult {
    if text.trim().is_empty() {
        return SplitResult::default();
    }

    let normalized = text.replace("\r\n", "\n");
    for rule in SPLIT_RULES {
        let files = (rule.extract)(&normalized);
        if files.len() >= rule.min_files {
            debug!(rule = rule.name, files = files.len(), "code context split");
            return SplitResult::from_files(files);
        }
    }

    // The last rule only comes back empty for blank input, handled above.
    SplitResult::from_files(vec![SourceFile::new(
        FALLBACK_FILENAME,
        normalized.trim(),
        detect_language(&normalized),
    )])
}

/// Strip decoration the generation service or the user wraps names in.
fn clean_filename(raw: &str) -> String {
    raw.trim()
        .trim_matches(|c: char| matches!(c, '`' | '*' | '"' | '\'') || c.is_whitespace())
        .to_owned()
}

fn pick_language(tag: Option<&str>, filename: Option<&str>, content: &str) -> String {
    tag.and_then(canonical_language)
        .or_else(|| filename.and_then(language_for_filename).map(str::to_owned))
        .unwrap_or_else(|| detect_language(content).to_owned())
}

fn is_fence_line(line: &str) -> bool {
    line.trim_start().starts_with("```")
}

/// `File: name` (or `Filename:` / `**File:**`) followed by a fenced block.
fn extract_marked_fences(text: &str) -> Vec<SourceFile> {
    MARKED_FENCE
        .captures_iter(text)
        .filter_map(|caps| {
            let filename = clean_filename(caps.get(1)?.as_str());
            if filename.is_empty() {
                return None;
            }
            let tag = caps.get(2).map(|m| m.as_str());
            let content = caps.get(3).map_or("", |m| m.as_str());
            let language = pick_language(tag, Some(&filename), content);
            Some(SourceFile::new(filename, content, language))
        })
        .collect()
}

/// Trim blank lines and stray fence markers from both ends of a section.
fn trim_section(lines: &[&str]) -> String {
    let mut start = 0;
    let mut end = lines.len();
    while start < end && (lines[start].trim().is_empty() || is_fence_line(lines[start])) {
        start += 1;
    }
    while end > start && (lines[end - 1].trim().is_empty() || is_fence_line(lines[end - 1])) {
        end -= 1;
    }
    lines[start..end].join("\n")
}

/// `// name.ext`, `# name.ext`, or `<!-- name.ext -->` headers, each
/// section running to the next header.
///
/// Non-blank text before the first header is kept at the top of the first
/// file.
fn extract_comment_sections(text: &str) -> Vec<SourceFile> {
    let lines: Vec<&str> = text.lines().collect();
    let headers: Vec<(usize, String)> = lines
        .iter()
        .enumerate()
        .filter_map(|(idx, line)| {
            COMMENT_HEADER
                .captures(line)
                .and_then(|caps| caps.get(1))
                .map(|m| (idx, clean_filename(m.as_str())))
        })
        .collect();

    let mut files = Vec::with_capacity(headers.len());
    for (pos, (line_idx, filename)) in headers.iter().enumerate() {
        let body_end = headers.get(pos + 1).map_or(lines.len(), |(next, _)| *next);
        let body = trim_section(&lines[line_idx + 1..body_end]);
        let preamble = if pos == 0 {
            trim_section(&lines[..*line_idx])
        } else {
            String::new()
        };
        let content = if preamble.is_empty() {
            body
        } else {
            format!("{preamble}\n{body}")
        };
        let language = pick_language(None, Some(filename), &content);
        files.push(SourceFile::new(filename.clone(), content, language));
    }
    files
}

/// Several fenced blocks without names, named `file<N>.<ext>`.
fn extract_unlabeled_fences(text: &str) -> Vec<SourceFile> {
    FENCED_BLOCK
        .captures_iter(text)
        .enumerate()
        .map(|(idx, caps)| {
            let tag = caps.get(1).map_or("", |m| m.as_str());
            let content = caps.get(2).map_or("", |m| m.as_str());
            let filename = format!("file{}.{}", idx + 1, extension_for_language(tag));
            let language = pick_language(Some(tag), None, content);
            SourceFile::new(filename, content, language)
        })
        .collect()
}

/// The whole input, fence markers removed, as one file.
fn extract_whole_input(text: &str) -> Vec<SourceFile> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    let content = text
        .lines()
        .filter(|line| !is_fence_line(line))
        .collect::<Vec<_>>()
        .join("\n");
    let content = content.trim().to_owned();
    let language = detect_language(&content);
    vec![SourceFile::new(FALLBACK_FILENAME, content, language)]
}
