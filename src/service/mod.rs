//! Boundary with the external text-generation service.
//!
//! The service is an opaque collaborator that turns a prompt into
//! unstructured text. [`GenerationService`] is the seam; the HTTP client,
//! the retry loop, prompt templates, and the per-step in-flight registry
//! live in the submodules.

pub mod client;
pub mod inflight;
pub mod planner;
pub mod prompts;
pub mod retry;

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::Result;

pub use client::{classify_status, HttpGenerationClient};
pub use inflight::{InFlightSteps, StepTicket};
pub use planner::Planner;
pub use retry::{with_retry, RetryPolicy};

/// System and user text for one generation request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Prompt {
    /// Instructions on output shape and dialect.
    pub system: String,
    /// Request-specific content.
    pub user: String,
}

/// Text-generation backend.
pub trait GenerationService: Send + Sync {
    /// Send `prompt` and return the raw response text.
    ///
    /// # Errors
    ///
    /// Returns the classified transport or HTTP failure; see
    /// [`classify_status`].
    fn complete<'a>(
        &'a self,
        prompt: &'a Prompt,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>>;
}
