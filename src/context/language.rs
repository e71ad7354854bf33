//! Language tags for source files.
//!
//! Two fixed lookup tables (extension to language and language to
//! extension) plus a keyword heuristic used when a file carries no name.

use std::sync::LazyLock;

use regex::Regex;

/// Extension to language, lower-case, without the dot.
const EXTENSION_LANGUAGES: &[(&str, &str)] = &[
    ("js", "javascript"),
    ("mjs", "javascript"),
    ("cjs", "javascript"),
    ("jsx", "javascript"),
    ("ts", "typescript"),
    ("tsx", "typescript"),
    ("py", "python"),
    ("rb", "ruby"),
    ("go", "go"),
    ("rs", "rust"),
    ("java", "java"),
    ("kt", "kotlin"),
    ("swift", "swift"),
    ("c", "c"),
    ("h", "c"),
    ("cpp", "cpp"),
    ("cc", "cpp"),
    ("hpp", "cpp"),
    ("cs", "csharp"),
    ("php", "php"),
    ("scala", "scala"),
    ("dart", "dart"),
    ("lua", "lua"),
    ("sh", "bash"),
    ("bash", "bash"),
    ("sql", "sql"),
    ("html", "html"),
    ("htm", "html"),
    ("css", "css"),
    ("scss", "scss"),
    ("vue", "vue"),
    ("json", "json"),
    ("yaml", "yaml"),
    ("yml", "yaml"),
    ("toml", "toml"),
    ("xml", "xml"),
    ("md", "markdown"),
    ("txt", "text"),
];

/// Language (or fence tag alias) to preferred extension.
const LANGUAGE_EXTENSIONS: &[(&str, &str)] = &[
    ("javascript", "js"),
    ("js", "js"),
    ("jsx", "jsx"),
    ("typescript", "ts"),
    ("ts", "ts"),
    ("tsx", "tsx"),
    ("python", "py"),
    ("py", "py"),
    ("ruby", "rb"),
    ("rb", "rb"),
    ("go", "go"),
    ("golang", "go"),
    ("rust", "rs"),
    ("rs", "rs"),
    ("java", "java"),
    ("kotlin", "kt"),
    ("swift", "swift"),
    ("c", "c"),
    ("cpp", "cpp"),
    ("c++", "cpp"),
    ("csharp", "cs"),
    ("cs", "cs"),
    ("c#", "cs"),
    ("php", "php"),
    ("scala", "scala"),
    ("dart", "dart"),
    ("lua", "lua"),
    ("bash", "sh"),
    ("sh", "sh"),
    ("shell", "sh"),
    ("zsh", "sh"),
    ("sql", "sql"),
    ("html", "html"),
    ("css", "css"),
    ("scss", "scss"),
    ("vue", "vue"),
    ("json", "json"),
    ("yaml", "yml"),
    ("yml", "yml"),
    ("toml", "toml"),
    ("xml", "xml"),
    ("markdown", "md"),
    ("md", "md"),
    ("text", "txt"),
    ("plaintext", "txt"),
];

/// Fallback language when nothing else applies.
pub const DEFAULT_LANGUAGE: &str = "text";

/// Fallback extension when nothing else applies.
pub const DEFAULT_EXTENSION: &str = "txt";

/// Language for a file name, from its extension.
#[must_use]
pub fn language_for_filename(filename: &str) -> Option<&'static str> {
    let (_, ext) = filename.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    EXTENSION_LANGUAGES
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, language)| *language)
}

/// Extension for a fence tag or language name, defaulting to `txt`.
#[must_use]
pub fn extension_for_language(language: &str) -> &'static str {
    let tag = language.trim().to_ascii_lowercase();
    LANGUAGE_EXTENSIONS
        .iter()
        .find(|(known, _)| *known == tag)
        .map_or(DEFAULT_EXTENSION, |(_, ext)| *ext)
}

/// Canonical language for a fence tag (`py` becomes `python`).
///
/// Unknown tags are kept as written, lower-cased; an empty tag yields
/// `None`.
#[must_use]
pub fn canonical_language(tag: &str) -> Option<String> {
    let tag = tag.trim().to_ascii_lowercase();
    if tag.is_empty() {
        return None;
    }
    let ext = extension_for_language(&tag);
    let canonical = EXTENSION_LANGUAGES
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, language)| *language);
    match canonical {
        Some(language) if ext != DEFAULT_EXTENSION || tag == "text" || tag == "plaintext" => {
            Some(language.to_owned())
        }
        _ => Some(tag),
    }
}

/// Keyword heuristics, evaluated in order; the first match wins.
static CONTENT_HEURISTICS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    [
        ("php", r"<\?php"),
        ("html", r"(?i)<!doctype html|<html[\s>]"),
        ("rust", r"(?m)^\s*(?:pub\s+)?fn\s+\w+.*->|(?m)^\s*use\s+\w+::|\blet\s+mut\s+|(?m)^\s*impl\b"),
        ("go", r"(?m)^package\s+\w+|(?m)^func\s+\w+\("),
        ("python", r"(?m)^\s*def\s+\w+\(.*\)\s*(?:->.*)?:\s*$|(?m)^\s*from\s+[\w.]+\s+import\s|(?m)^import\s+\w+\s*$|(?m)^\s*class\s+\w+(?:\(.*\))?:\s*$"),
        ("java", r"\bpublic\s+(?:static\s+)?(?:class|void|final)\b|\bSystem\.out\.println\b"),
        ("cpp", r"(?m)^#include\s*[<\x22]|\bstd::"),
        ("typescript", r"\binterface\s+\w+\s*\{|:\s*(?:string|number|boolean)\b|\bexport\s+type\b"),
        ("javascript", r"\bfunction\b|\bconst\s+\w+\s*=|\bconsole\.log\b|=>|\brequire\(|(?m)^import\s.+\sfrom\s"),
        ("sql", r"(?i)^\s*(?:select|insert|update|create\s+table)\b"),
    ]
    .into_iter()
    .filter_map(|(language, pattern)| Regex::new(pattern).ok().map(|re| (language, re)))
    .collect()
});

/// Guess a language from content keywords, defaulting to `text`.
#[must_use]
pub fn detect_language(content: &str) -> &'static str {
    CONTENT_HEURISTICS
        .iter()
        .find(|(_, pattern)| pattern.is_match(content))
        .map_or(DEFAULT_LANGUAGE, |(language, _)| *language)
}
