//! Compiled regular expressions shared by the parsing modules.

use std::sync::LazyLock;

use regex::Regex;

/// Compile a literal pattern.
#[allow(clippy::expect_used)] // Patterns are string literals exercised by unit tests.
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("literal regex pattern compiles")
}

/// `@@ -a[,b] +c[,d] @@` hunk header.
pub(crate) static HUNK_HEADER: LazyLock<Regex> =
    LazyLock::new(|| compile(r"^@@ -(\d+)(?:,(\d+))? \+(\d+)(?:,(\d+))? @@"));

/// `--- path` / `+++ path` file header, capturing the path.
pub(crate) static FILE_HEADER: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?m)^(?:\+\+\+|---) +(\S[^\t\r\n]*)"));

/// Explicit `File:` marker followed by a fenced block.
pub(crate) static MARKED_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"(?m)^[ \t]*(?:\*\*)?(?:File|Filename)(?:\*\*)?[ \t]*:[ \t]*(?:\*\*)?[ \t]*([^\r\n]+?)[ \t]*\r?\n(?:[ \t]*\r?\n)*[ \t]*```([\w+#.-]*)[^\r\n]*\r?\n((?s:.*?))\r?\n?[ \t]*```",
    )
});

/// Comment-style filename header line (`// a.ts`, `# b.py`, `<!-- c.html -->`).
pub(crate) static COMMENT_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"^[ \t]*(?://|#|<!--)[ \t]*(?:(?:File|Filename)[ \t]*:[ \t]*)?([\w./\\-]*\w\.[A-Za-z0-9]+)[ \t]*(?:-->)?[ \t]*$",
    )
});

/// Any fenced code block, capturing the language tag and body.
pub(crate) static FENCED_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?m)^[ \t]*```([\w+#.-]*)[^\r\n]*\r?\n((?s:.*?))\r?\n?[ \t]*```[ \t]*$")
});

/// Leading/trailing markdown fence around a service response.
pub(crate) static RESPONSE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"^\s*```[\w-]*[ \t]*\r?\n?|\r?\n?```\s*$"));

/// Start of the `"diff": "` string value.
pub(crate) static DIFF_FIELD_START: LazyLock<Regex> =
    LazyLock::new(|| compile(r#""diff"\s*:\s*""#));

/// Candidate end of the `diff` string value: a quote followed by the end
/// of its object or the next key.
pub(crate) static DIFF_FIELD_END: LazyLock<Regex> =
    LazyLock::new(|| compile(r#""\s*(?:\}|,\s*"\w+"\s*:)"#));

/// `"step_id": "..."` field.
pub(crate) static STEP_ID_FIELD: LazyLock<Regex> =
    LazyLock::new(|| compile(r#""step_id"\s*:\s*"((?:[^"\\]|\\.)*)""#));

/// `"explanation": "..."` field, allowing raw newlines inside the value.
pub(crate) static EXPLANATION_FIELD: LazyLock<Regex> =
    LazyLock::new(|| compile(r#"(?s)"explanation"\s*:\s*"((?:[^"\\]|\\.)*)""#));

/// `"format": "..."` field.
pub(crate) static FORMAT_FIELD: LazyLock<Regex> =
    LazyLock::new(|| compile(r#""format"\s*:\s*"([^"]*)""#));

/// `"diff": "..."` field, allowing raw newlines inside the value.
pub(crate) static DIFF_FIELD: LazyLock<Regex> =
    LazyLock::new(|| compile(r#"(?s)"diff"\s*:\s*"((?:[^"\\]|\\.)*)""#));
