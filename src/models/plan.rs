//! Implementation plan model exchanged with the generation service.

use serde::{Deserialize, Serialize};

/// Kind of output a plan step is expected to produce.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OutputType {
    /// Prose guidance with no code change.
    Instruction,
    /// Unified-diff patch.
    Patch,
    /// Whole-file replacement.
    FileReplace,
}

impl OutputType {
    /// Canonical wire name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Instruction => "instruction",
            Self::Patch => "patch",
            Self::FileReplace => "file_replace",
        }
    }
}

/// Declared output of a plan step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StepOutput {
    /// Output kind.
    #[serde(rename = "type")]
    pub kind: OutputType,
    /// Optional patch format hint (free text from the service).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch_format: Option<String>,
}

/// A single user-editable plan step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlanStep {
    /// Stable step identifier.
    pub id: String,
    /// Short title.
    pub title: String,
    /// What the step changes.
    pub description: String,
    /// Files the step reads or edits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_files: Option<Vec<String>>,
    /// Expected output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<StepOutput>,
}

impl PlanStep {
    /// Construct a step without file or output hints.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            input_files: None,
            output: None,
        }
    }
}

/// Structured implementation plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Plan {
    /// One-line restatement of the requested change.
    pub task: String,
    /// Primary language, when the service reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Primary file, when the service reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// Ordered steps.
    pub steps: Vec<PlanStep>,
}

impl Plan {
    /// Look up a step by id.
    #[must_use]
    pub fn step(&self, id: &str) -> Option<&PlanStep> {
        self.steps.iter().find(|step| step.id == id)
    }
}

/// Plan generation request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PlanRequest {
    /// Existing source text, possibly holding several files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_context: Option<String>,
    /// Natural-language change request.
    pub intent: String,
}

/// Step body sent with an execution request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StepSpec {
    /// Step id.
    pub id: String,
    /// Step title.
    pub title: String,
    /// Step description.
    pub description: String,
    /// Files the step touches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_files: Option<Vec<String>>,
}

impl From<&PlanStep> for StepSpec {
    fn from(step: &PlanStep) -> Self {
        Self {
            id: step.id.clone(),
            title: step.title.clone(),
            description: step.description.clone(),
            input_files: step.input_files.clone(),
        }
    }
}

/// Step execution request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StepRequest {
    /// Step to execute.
    pub step: StepSpec,
    /// Code context the patch is generated against.
    pub code_context: String,
}
