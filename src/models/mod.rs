//! Domain model module declarations.

pub mod diff_line;
pub mod patch;
pub mod plan;
pub mod reconstruction;
pub mod source_file;

pub use diff_line::{DiffLine, HunkHeader, LineKind};
pub use patch::{ExecutionResponse, PatchFormat, PatchPayload, SuggestedPatch};
pub use plan::{OutputType, Plan, PlanRequest, PlanStep, StepOutput, StepRequest, StepSpec};
pub use reconstruction::{AcceptedStep, ReconstructedFile};
pub use source_file::{SourceFile, SplitResult};
