//! Display-oriented parser for the patch dialect.
//!
//! Turns raw patch text into typed [`DiffLine`] records with old/new line
//! numbers. Parsing is total: shapes the parser does not recognise are
//! rendered as context so a slightly-off patch still displays.

use tracing::debug;

use crate::models::{DiffLine, HunkHeader, LineKind, PatchFormat, PatchPayload};
use crate::patterns::HUNK_HEADER;

/// Parse a `@@ -a[,b] +c[,d] @@` header line.
///
/// Returns `None` when the line does not have the expected shape.
#[must_use]
pub fn parse_hunk_header(line: &str) -> Option<HunkHeader> {
    let caps = HUNK_HEADER.captures(line)?;
    let number = |idx: usize| caps.get(idx).and_then(|m| m.as_str().parse::<usize>().ok());
    Some(HunkHeader {
        old_start: number(1)?,
        old_count: number(2),
        new_start: number(3)?,
        new_count: number(4),
    })
}

fn has_header_marker(line: &str) -> bool {
    line.starts_with("---") || line.starts_with("+++")
}

/// A `--- ` line directly followed by `+++ ` and a hunk header.
fn opens_file_section(lines: &[&str], idx: usize) -> bool {
    lines[idx].starts_with("--- ")
        && lines.get(idx + 1).is_some_and(|next| next.starts_with("+++ "))
        && lines.get(idx + 2).is_some_and(|next| next.starts_with("@@"))
}

/// Flag which of `lines` are `---` / `+++` file headers.
///
/// Inside a hunk those prefixes are a deletion of `--...` or an addition
/// of `++...`, so a header is only recognised outside one: before the
/// first `@@`, after a `diff --git` line, after a counted hunk has used up
/// its declared lines, or as a `---`/`+++` pair directly ahead of `@@`.
/// A hunk header without counts stays open until one of those resets it.
pub(crate) fn file_header_mask(lines: &[&str]) -> Vec<bool> {
    let mut mask = vec![false; lines.len()];
    let mut in_hunk = false;
    let mut remaining: Option<(usize, usize)> = None;

    for (idx, line) in lines.iter().enumerate() {
        if line.starts_with("diff --git") {
            in_hunk = false;
            remaining = None;
            continue;
        }
        if line.starts_with("@@") {
            remaining = parse_hunk_header(line)
                .and_then(|header| Some((header.old_count?, header.new_count?)));
            in_hunk = remaining != Some((0, 0));
            continue;
        }
        if has_header_marker(line) && (!in_hunk || opens_file_section(lines, idx)) {
            mask[idx] = true;
            in_hunk = false;
            remaining = None;
            continue;
        }
        if !in_hunk || line.starts_with('\\') {
            continue;
        }
        if let Some((old, new)) = remaining.as_mut() {
            if line.starts_with('-') {
                *old = old.saturating_sub(1);
            } else if line.starts_with('+') {
                *new = new.saturating_sub(1);
            } else {
                *old = old.saturating_sub(1);
                *new = new.saturating_sub(1);
            }
            if *old == 0 && *new == 0 {
                in_hunk = false;
                remaining = None;
            }
        }
    }

    mask
}

/// Whether `diff_text` carries any `---` / `+++` file header.
pub(crate) fn has_file_headers(diff_text: &str) -> bool {
    let lines: Vec<&str> = diff_text.lines().collect();
    file_header_mask(&lines).contains(&true)
}

/// Parse unified-diff dialect text into line records.
///
/// Cursors start at 1 and are reset by each well-formed hunk header. A
/// malformed header is still emitted as [`LineKind::HunkHeader`] but keeps
/// the previous cursor values.
#[must_use]
pub fn parse_diff(diff_text: &str) -> Vec<DiffLine> {
    let mut old_line = 1usize;
    let mut new_line = 1usize;
    let raw_lines: Vec<&str> = diff_text.lines().collect();
    let headers = file_header_mask(&raw_lines);
    let mut lines = Vec::with_capacity(raw_lines.len());

    for (&raw, is_header) in raw_lines.iter().zip(headers) {
        if raw.starts_with("@@") {
            if let Some(header) = parse_hunk_header(raw) {
                old_line = header.old_start;
                new_line = header.new_start;
            } else {
                debug!(line = raw, "malformed hunk header; keeping cursors");
            }
            lines.push(DiffLine::header(LineKind::HunkHeader, raw));
        } else if is_header {
            lines.push(DiffLine::header(LineKind::FileHeader, raw));
        } else if let Some(added) = raw.strip_prefix('+') {
            lines.push(DiffLine {
                kind: LineKind::Addition,
                text: added.to_owned(),
                old_line_number: None,
                new_line_number: Some(new_line),
            });
            new_line += 1;
        } else if let Some(removed) = raw.strip_prefix('-') {
            lines.push(DiffLine {
                kind: LineKind::Deletion,
                text: removed.to_owned(),
                old_line_number: Some(old_line),
                new_line_number: None,
            });
            old_line += 1;
        } else {
            // Leading space, empty line, or anything unrecognised.
            let text = raw.strip_prefix(' ').unwrap_or(raw);
            lines.push(DiffLine {
                kind: LineKind::Context,
                text: text.to_owned(),
                old_line_number: Some(old_line),
                new_line_number: Some(new_line),
            });
            old_line += 1;
            new_line += 1;
        }
    }

    lines
}

/// Render full-file content as context lines numbered by position.
#[must_use]
pub fn parse_full_file(content: &str) -> Vec<DiffLine> {
    content
        .lines()
        .enumerate()
        .map(|(idx, text)| DiffLine {
            kind: LineKind::Context,
            text: text.to_owned(),
            old_line_number: Some(idx + 1),
            new_line_number: Some(idx + 1),
        })
        .collect()
}

/// Parse a payload according to its declared format.
#[must_use]
pub fn parse_payload(payload: &PatchPayload) -> Vec<DiffLine> {
    match payload.format {
        PatchFormat::UnifiedDiff => parse_diff(&payload.diff_text),
        PatchFormat::FullFile => parse_full_file(&payload.diff_text),
    }
}
