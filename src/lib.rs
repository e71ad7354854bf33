#![forbid(unsafe_code)]

//! Patch application and file reconstruction for plan-driven code edits.
//!
//! A change request becomes a plan of steps; each step yields a patch in a
//! unified-diff dialect; accepted patches are folded back into the files
//! carved out of the original code context.

pub mod config;
pub mod context;
pub mod diff;
pub mod errors;
pub mod export;
pub mod models;
pub mod normalize;
pub mod reconstruct;
pub mod service;
pub mod session;

pub(crate) mod patterns;

pub use config::GlobalConfig;
pub use errors::{AppError, Result};
