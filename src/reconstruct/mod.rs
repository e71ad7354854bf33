//! Target resolution and reconstruction of corrected files.

pub mod orchestrator;
pub mod ready;
pub mod resolver;

pub use orchestrator::{changes_summary, reconstruct, reconstruct_split, ChangeStats};
pub use ready::{ready_export, write_ready_files, ReadyExport};
pub use resolver::{declared_target, resolve_target};
