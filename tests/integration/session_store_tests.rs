//! Session persistence on disk.

use planpatch::models::{PatchPayload, Plan, PlanStep};
use planpatch::session::{load_session, save_session, SessionAction, SessionState};
use planpatch::AppError;

#[test]
fn missing_file_loads_empty_session() {
    let temp = tempfile::tempdir().expect("tempdir");
    let state = load_session(&temp.path().join("absent.json")).expect("loads");
    assert_eq!(state, SessionState::default());
}

#[test]
fn saved_session_loads_back_identically() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("nested").join("session.json");

    let state = SessionState::default()
        .reduce(SessionAction::SetContext("a\nb".into()))
        .reduce(SessionAction::SetPlan(Plan {
            task: "t".into(),
            language: None,
            file: Some("app.py".into()),
            steps: vec![PlanStep::new("s1", "One", "first")],
        }))
        .reduce(SessionAction::RecordExecution(PatchPayload::unified("s1", "+c", "why")))
        .reduce(SessionAction::Accept("s1".into()));

    save_session(&path, &state).expect("saves");
    let loaded = load_session(&path).expect("loads");

    assert_eq!(loaded, state);
    assert_eq!(loaded.accepted_executions().len(), 1);
}

#[test]
fn overwrite_replaces_previous_contents() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("session.json");

    let first = SessionState::default().reduce(SessionAction::SetIntent("one".into()));
    let second = SessionState::default().reduce(SessionAction::SetIntent("two".into()));
    save_session(&path, &first).expect("saves");
    save_session(&path, &second).expect("saves again");

    assert_eq!(load_session(&path).expect("loads").intent, "two");
}

#[test]
fn corrupt_file_is_an_io_error() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("session.json");
    std::fs::write(&path, "{ not json").expect("write");

    assert!(matches!(load_session(&path), Err(AppError::Io(_))));
}
