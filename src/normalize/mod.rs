//! Normalization of free-text generation service responses.

pub mod execution;
pub mod json_repair;
pub mod plan;

pub use execution::{normalize_execution, NormalizedExecution, RecoveryTier};
pub use plan::{normalize_output_type, normalize_plan};
