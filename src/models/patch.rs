//! Normalized per-step patch payloads.

use serde::{Deserialize, Serialize};

/// Shape of the patch text returned for a step.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PatchFormat {
    /// Unified-diff dialect with `@@` hunks.
    UnifiedDiff,
    /// Complete replacement content for the target file.
    FullFile,
}

impl PatchFormat {
    /// Wire name used by the generation service.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UnifiedDiff => "unified_diff",
            Self::FullFile => "full_file",
        }
    }

    /// Parse a wire name, rejecting anything outside the enum.
    #[must_use]
    pub fn from_wire(value: &str) -> Option<Self> {
        match value.trim() {
            "unified_diff" => Some(Self::UnifiedDiff),
            "full_file" => Some(Self::FullFile),
            _ => None,
        }
    }
}

/// Structured result of executing one plan step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct PatchPayload {
    /// Originating step id, always assigned by the caller.
    pub step_id: String,
    /// Patch text shape.
    pub format: PatchFormat,
    /// Raw patch dialect text.
    pub diff_text: String,
    /// Free-text explanation of the change.
    pub explanation: String,
}

impl PatchPayload {
    /// Construct a unified-diff payload.
    #[must_use]
    pub fn unified(
        step_id: impl Into<String>,
        diff_text: impl Into<String>,
        explanation: impl Into<String>,
    ) -> Self {
        Self {
            step_id: step_id.into(),
            format: PatchFormat::UnifiedDiff,
            diff_text: diff_text.into(),
            explanation: explanation.into(),
        }
    }

    /// Replace the step id with the caller-assigned one.
    #[must_use]
    pub fn with_step_id(mut self, step_id: impl Into<String>) -> Self {
        self.step_id = step_id.into();
        self
    }
}

/// `suggested_patch` object of the step execution wire response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SuggestedPatch {
    /// `unified_diff` or `full_file`.
    pub format: PatchFormat,
    /// Patch text.
    pub diff: String,
}

/// Step execution response as exchanged with the generation service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExecutionResponse {
    /// Step id echoed by the service (not trusted).
    pub step_id: String,
    /// Proposed patch.
    pub suggested_patch: SuggestedPatch,
    /// Free-text explanation.
    pub explanation: String,
}

impl From<PatchPayload> for ExecutionResponse {
    fn from(payload: PatchPayload) -> Self {
        Self {
            step_id: payload.step_id,
            suggested_patch: SuggestedPatch {
                format: payload.format,
                diff: payload.diff_text,
            },
            explanation: payload.explanation,
        }
    }
}

impl From<ExecutionResponse> for PatchPayload {
    fn from(response: ExecutionResponse) -> Self {
        Self {
            step_id: response.step_id,
            format: response.suggested_patch.format,
            diff_text: response.suggested_patch.diff,
            explanation: response.explanation,
        }
    }
}
