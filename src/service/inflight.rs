//! Per-step registry of in-flight executions.
//!
//! Starting an execution for a step cancels the previous one for the same
//! step id. Only the most recently started execution may commit its result.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Handle for one in-flight execution.
#[derive(Debug, Clone)]
pub struct StepTicket {
    /// Step the execution belongs to.
    pub step_id: String,
    generation: u64,
    cancel: CancellationToken,
}

impl StepTicket {
    /// Token fired when a newer execution supersedes this one.
    #[must_use]
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Whether a newer execution has superseded this one.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

#[derive(Debug, Default)]
struct Registry {
    next_generation: u64,
    current: HashMap<String, (u64, CancellationToken)>,
}

/// Shared last-started-wins registry, cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct InFlightSteps {
    inner: Arc<Mutex<Registry>>,
}

impl InFlightSteps {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Registry> {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Register a new execution for `step_id`, cancelling any previous one.
    #[must_use]
    pub fn begin(&self, step_id: &str) -> StepTicket {
        let mut registry = self.lock();
        registry.next_generation += 1;
        let generation = registry.next_generation;
        let cancel = CancellationToken::new();
        if let Some((previous, token)) = registry
            .current
            .insert(step_id.to_owned(), (generation, cancel.clone()))
        {
            debug!(step_id, previous, generation, "superseding in-flight execution");
            token.cancel();
        }
        StepTicket {
            step_id: step_id.to_owned(),
            generation,
            cancel,
        }
    }

    /// Whether `ticket` is still the latest execution for its step.
    #[must_use]
    pub fn is_current(&self, ticket: &StepTicket) -> bool {
        self.lock()
            .current
            .get(&ticket.step_id)
            .is_some_and(|(generation, _)| *generation == ticket.generation)
    }

    /// Release `ticket`; returns whether it was still current and may commit.
    pub fn finish(&self, ticket: &StepTicket) -> bool {
        let mut registry = self.lock();
        let current = registry
            .current
            .get(&ticket.step_id)
            .is_some_and(|(generation, _)| *generation == ticket.generation);
        if current {
            registry.current.remove(&ticket.step_id);
        }
        current
    }

    /// Number of steps with an execution in flight.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().current.len()
    }

    /// Whether no execution is in flight.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
