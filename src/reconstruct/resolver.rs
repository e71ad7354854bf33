//! Decide which file a patch targets.

use crate::diff::parser::file_header_mask;
use crate::models::{PatchPayload, SplitResult};
use crate::patterns::FILE_HEADER;

/// Name used when the context holds no files and the patch names none.
pub const PLACEHOLDER_FILENAME: &str = "untitled.txt";

const DEV_NULL: &str = "/dev/null";

/// `(marker, path)` for each `---` / `+++` header outside the hunks.
fn header_paths(diff_text: &str) -> impl Iterator<Item = (&str, &str)> {
    let lines: Vec<&str> = diff_text.lines().collect();
    let headers = file_header_mask(&lines);
    lines
        .into_iter()
        .zip(headers)
        .filter(|(_, is_header)| *is_header)
        .filter_map(|(line, _)| {
            let path = FILE_HEADER.captures(line)?.get(1)?.as_str().trim();
            Some((&line[..3], path))
        })
}

/// Path declared by the patch's own `+++` / `---` headers.
///
/// `+++` wins over `---`; `/dev/null` is ignored; a leading `a/` or `b/`
/// is stripped, as is a trailing tab-separated timestamp. `---`/`+++`
/// lines inside a hunk are edits, not headers.
#[must_use]
pub fn declared_target(diff_text: &str) -> Option<String> {
    let mut new_side = None;
    let mut old_side = None;

    for (marker, path) in header_paths(diff_text) {
        if path.is_empty() || path == DEV_NULL {
            continue;
        }
        let path = path
            .strip_prefix("a/")
            .or_else(|| path.strip_prefix("b/"))
            .unwrap_or(path)
            .to_owned();
        if marker == "+++" {
            new_side.get_or_insert(path);
        } else {
            old_side.get_or_insert(path);
        }
    }

    new_side.or(old_side)
}

/// Whether the patch creates its file (`--- /dev/null`).
#[must_use]
pub fn creates_file(diff_text: &str) -> bool {
    header_paths(diff_text).any(|(marker, path)| marker == "---" && path == DEV_NULL)
}

/// Resolve the target filename for `patch` against a split result.
///
/// Order: the patch's declared header path, then the only file, then the
/// first file, then [`PLACEHOLDER_FILENAME`].
#[must_use]
pub fn resolve_target(patch: &PatchPayload, split: &SplitResult) -> String {
    if let Some(declared) = declared_target(&patch.diff_text) {
        return declared;
    }
    split
        .files
        .first()
        .map_or_else(|| PLACEHOLDER_FILENAME.to_owned(), |file| file.filename.clone())
}

/// Map a resolved name onto a file of the split result.
///
/// Exact matches win; otherwise a declared path matches a split file when
/// one is a path-suffix of the other (`src/app.py` and `app.py`).
#[must_use]
pub fn match_split_file<'a>(resolved: &str, split: &'a SplitResult) -> Option<&'a str> {
    if let Some(file) = split.find(resolved) {
        return Some(&file.filename);
    }
    let is_suffix = |long: &str, short: &str| {
        long.len() > short.len()
            && long.ends_with(short)
            && long[..long.len() - short.len()].ends_with('/')
    };
    split
        .files
        .iter()
        .find(|file| is_suffix(resolved, &file.filename) || is_suffix(&file.filename, resolved))
        .map(|file| file.filename.as_str())
}
