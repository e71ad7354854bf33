//! Unit tests for code-context splitting.

use planpatch::context::language::{detect_language, extension_for_language, language_for_filename};
use planpatch::context::{split_context, FALLBACK_FILENAME};

#[test]
fn marked_fence_yields_named_file() {
    let result = split_context("File: app.py\n```python\nprint(1)\n```");
    assert!(result.is_single_file);
    assert_eq!(result.files.len(), 1);
    let file = &result.files[0];
    assert_eq!(file.filename, "app.py");
    assert_eq!(file.language, "python");
    assert_eq!(file.content, "print(1)");
}

#[test]
fn bold_marker_and_backticked_name_are_accepted() {
    let result = split_context("**File:** `src/app.py`\n```python\nx = 1\n```");
    assert_eq!(result.files[0].filename, "src/app.py");
    assert_eq!(result.files[0].content, "x = 1");
}

#[test]
fn several_marked_fences_keep_input_order() {
    let text = "Filename: a.ts\n```ts\nlet a = 1;\n```\n\nFile: b.go\n```go\npackage main\n```";
    let result = split_context(text);
    assert!(!result.is_single_file);
    let names: Vec<&str> = result.files.iter().map(|f| f.filename.as_str()).collect();
    assert_eq!(names, ["a.ts", "b.go"]);
    assert_eq!(result.files[0].language, "typescript");
    assert_eq!(result.files[1].language, "go");
}

#[test]
fn marker_without_fence_tag_uses_extension() {
    let result = split_context("File: styles.css\n```\nbody { margin: 0; }\n```");
    assert_eq!(result.files[0].language, "css");
}

#[test]
fn comment_headers_split_sections() {
    let text = "// app.js\nconst a = 1;\n\n// util.js\nexport const b = 2;\n";
    let result = split_context(text);
    assert_eq!(result.files.len(), 2);
    assert_eq!(result.files[0].filename, "app.js");
    assert_eq!(result.files[0].content, "const a = 1;");
    assert_eq!(result.files[0].language, "javascript");
    assert_eq!(result.files[1].filename, "util.js");
    assert_eq!(result.files[1].content, "export const b = 2;");
}

#[test]
fn hash_and_html_comment_headers_are_recognised() {
    let text = "# main.py\nprint('hi')\n<!-- index.html -->\n<p>hi</p>";
    let result = split_context(text);
    let names: Vec<&str> = result.files.iter().map(|f| f.filename.as_str()).collect();
    assert_eq!(names, ["main.py", "index.html"]);
    assert_eq!(result.files[1].language, "html");
}

#[test]
fn text_before_first_comment_header_stays_with_first_file() {
    let result = split_context("\"use strict\";\n// a.js\nlet x = 1;");
    assert_eq!(result.files[0].filename, "a.js");
    assert_eq!(result.files[0].content, "\"use strict\";\nlet x = 1;");
}

#[test]
fn multiple_unlabeled_fences_get_synthetic_names() {
    let text = "```python\nprint(1)\n```\n\nand\n\n```js\nconsole.log(1)\n```";
    let result = split_context(text);
    let names: Vec<&str> = result.files.iter().map(|f| f.filename.as_str()).collect();
    assert_eq!(names, ["file1.py", "file2.js"]);
    assert_eq!(result.files[0].language, "python");
    assert_eq!(result.files[1].language, "javascript");
    assert_eq!(result.files[1].content, "console.log(1)");
}

#[test]
fn unknown_fence_tag_defaults_to_txt_extension() {
    let text = "```\nfirst\n```\n```cobolish\nsecond\n```";
    let result = split_context(text);
    assert_eq!(result.files[0].filename, "file1.txt");
    assert_eq!(result.files[1].filename, "file2.txt");
}

#[test]
fn single_unlabeled_fence_falls_back_to_whole_input() {
    let result = split_context("```\ndef add(a, b):\n    return a + b\n```");
    assert!(result.is_single_file);
    assert_eq!(result.files[0].filename, FALLBACK_FILENAME);
    assert_eq!(result.files[0].content, "def add(a, b):\n    return a + b");
    assert_eq!(result.files[0].language, "python");
}

#[test]
fn plain_text_falls_back_to_main_txt() {
    let result = split_context("just some words\nacross lines");
    assert!(result.is_single_file);
    assert_eq!(result.files[0].filename, "main.txt");
    assert_eq!(result.files[0].language, "text");
}

#[test]
fn blank_input_yields_no_files() {
    let result = split_context("  \n\t\n");
    assert!(result.files.is_empty());
    assert!(!result.is_single_file);
}

#[test]
fn non_blank_input_always_yields_a_file() {
    for text in ["x", "```", "// not-a-file", "File:", "@@ -1 +1 @@"] {
        assert!(!split_context(text).files.is_empty(), "no file for {text:?}");
    }
}

#[test]
fn crlf_input_is_normalized() {
    let result = split_context("File: a.py\r\n```python\r\nx = 1\r\ny = 2\r\n```");
    assert_eq!(result.files[0].content, "x = 1\ny = 2");
}

#[test]
fn language_tables_are_inverse_for_common_languages() {
    for language in ["python", "typescript", "javascript", "rust", "go", "java"] {
        let ext = extension_for_language(language);
        assert_eq!(language_for_filename(&format!("x.{ext}")), Some(language));
    }
}

#[test]
fn content_heuristics_recognise_keywords() {
    assert_eq!(detect_language("package main\n\nfunc main() {}"), "go");
    assert_eq!(detect_language("fn main() -> Result<()> {}"), "rust");
    assert_eq!(detect_language("<?php echo 1;"), "php");
    assert_eq!(detect_language("from os import path"), "python");
    assert_eq!(detect_language("const x = 1;"), "javascript");
    assert_eq!(detect_language("SELECT * FROM users"), "sql");
    assert_eq!(detect_language("lorem ipsum"), "text");
}
