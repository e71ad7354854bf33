//! Patch parsing, application, and corrected-file output.

pub mod applier;
pub mod parser;
pub mod writer;

pub use applier::{apply_patch, apply_patch_with_report, apply_sequence, ApplyReport};
pub use parser::{parse_diff, parse_hunk_header, parse_payload};
