use planpatch::diff::writer::OutputDir;
use planpatch::AppError;

fn output_dir() -> (tempfile::TempDir, OutputDir) {
    let temp = tempfile::tempdir().expect("tempdir");
    let out = OutputDir::create(&temp.path().join("out")).expect("output dir");
    (temp, out)
}

#[test]
fn nested_name_stays_under_root() {
    let (_temp, out) = output_dir();
    let resolved = out.resolve("src/lib.rs").expect("resolves");
    assert!(resolved.starts_with(out.root()));
    assert!(resolved.ends_with("src/lib.rs"));
}

#[test]
fn create_makes_missing_root() {
    let temp = tempfile::tempdir().expect("tempdir");
    let root = temp.path().join("a").join("b");
    let out = OutputDir::create(&root).expect("created");
    assert!(out.root().is_dir());
}

#[test]
fn climbing_above_root_is_rejected() {
    let (_temp, out) = output_dir();
    for name in ["../secret.txt", "src/../../secret.txt", "..\\secret.txt"] {
        assert!(
            matches!(out.resolve(name), Err(AppError::PathViolation(_))),
            "{name}"
        );
    }
}

#[test]
fn climbing_within_root_is_folded() {
    let (_temp, out) = output_dir();
    let resolved = out.resolve("src/../README.md").expect("resolves");
    assert_eq!(resolved, out.root().join("README.md"));
}

#[test]
fn absolute_and_backslash_names_are_rooted() {
    let (_temp, out) = output_dir();
    assert_eq!(out.resolve("/etc/passwd").expect("rooted"), out.root().join("etc").join("passwd"));
    assert_eq!(out.resolve("src\\app.py").expect("rooted"), out.root().join("src").join("app.py"));
}

#[test]
fn names_without_a_file_are_rejected() {
    let (_temp, out) = output_dir();
    for name in ["", "./", "/"] {
        assert!(out.resolve(name).is_err(), "{name:?}");
    }
}

#[cfg(unix)]
#[test]
fn symlink_leading_outside_is_rejected() {
    let (temp, out) = output_dir();
    let outside = temp.path().join("elsewhere");
    std::fs::create_dir(&outside).expect("mkdir");
    std::os::unix::fs::symlink(&outside, out.root().join("link")).expect("symlink");

    let result = out.write("link/stolen.txt", "x");

    assert!(matches!(result, Err(AppError::PathViolation(_))));
    assert!(!outside.join("stolen.txt").exists());
}
