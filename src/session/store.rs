//! JSON persistence for [`SessionState`].

use std::path::Path;

use tracing::debug;

use crate::diff::writer::persist_atomic;
use crate::{AppError, Result};

use super::SessionState;

/// Load a session file; a missing file yields an empty session.
///
/// # Errors
///
/// Returns `AppError::Io` if the file cannot be read or is not a valid
/// session document.
pub fn load_session(path: &Path) -> Result<SessionState> {
    if !path.exists() {
        debug!(path = %path.display(), "no session file; starting empty");
        return Ok(SessionState::default());
    }
    let raw = std::fs::read_to_string(path).map_err(|err| {
        AppError::Io(format!("failed to read session {}: {err}", path.display()))
    })?;
    serde_json::from_str(&raw).map_err(|err| {
        AppError::Io(format!("invalid session file {}: {err}", path.display()))
    })
}

/// Persist `state` to `path` atomically.
///
/// # Errors
///
/// Returns `AppError::Io` on serialization or write failures.
pub fn save_session(path: &Path, state: &SessionState) -> Result<()> {
    let body = serde_json::to_string_pretty(state)?;
    persist_atomic(path, body.as_bytes())?;
    debug!(path = %path.display(), bytes = body.len(), "session saved");
    Ok(())
}
