//! Plan generation and step execution against the generation service.

use std::sync::Arc;

use tracing::{info, info_span, warn, Instrument};

use crate::models::{PatchPayload, Plan, PlanRequest, StepRequest};
use crate::normalize::{normalize_execution, normalize_plan};
use crate::{AppError, Result};

use super::inflight::InFlightSteps;
use super::prompts::{plan_prompt, step_prompt};
use super::retry::{with_retry, RetryPolicy};
use super::GenerationService;

/// Request/response front end over a [`GenerationService`].
#[derive(Clone)]
pub struct Planner {
    service: Arc<dyn GenerationService>,
    retry: RetryPolicy,
    in_flight: InFlightSteps,
}

impl std::fmt::Debug for Planner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Planner")
            .field("retry", &self.retry)
            .field("in_flight", &self.in_flight.len())
            .finish_non_exhaustive()
    }
}

impl Planner {
    /// Wrap a service with a retry policy.
    #[must_use]
    pub fn new(service: Arc<dyn GenerationService>, retry: RetryPolicy) -> Self {
        Self {
            service,
            retry,
            in_flight: InFlightSteps::new(),
        }
    }

    /// Registry of executions currently in flight.
    #[must_use]
    pub fn in_flight(&self) -> &InFlightSteps {
        &self.in_flight
    }

    /// Generate a plan for `request`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for a blank intent, the classified
    /// service error once retries are exhausted, or `AppError::Parse` when
    /// the response cannot be normalized.
    pub async fn generate_plan(&self, request: &PlanRequest) -> Result<Plan> {
        if request.intent.trim().is_empty() {
            return Err(AppError::Validation("intent must not be empty".into()));
        }

        let prompt = plan_prompt(request);
        let span = info_span!("generate_plan");
        async move {
            let raw = with_retry(&self.retry, |_| self.service.complete(&prompt)).await?;
            let plan = normalize_plan(&raw)?;
            info!(task = %plan.task, steps = plan.steps.len(), "plan generated");
            Ok(plan)
        }
        .instrument(span)
        .await
    }

    /// Execute one step and return its normalized patch.
    ///
    /// The returned payload's `step_id` is always the requested step's id.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for a blank step id, title, or
    /// description, the classified service error once retries are
    /// exhausted, or `AppError::Parse` when the response cannot be
    /// normalized.
    pub async fn execute_step(&self, request: &StepRequest) -> Result<PatchPayload> {
        validate_step(request)?;

        let step_id = request.step.id.clone();
        let prompt = step_prompt(request);
        let span = info_span!("execute_step", step_id = %step_id);
        async move {
            let raw = with_retry(&self.retry, |_| self.service.complete(&prompt)).await?;
            let normalized = normalize_execution(&raw, &step_id)?;
            if let Some(reported) = normalized
                .reported_step_id
                .as_deref()
                .filter(|reported| *reported != step_id)
            {
                warn!(reported, "service echoed a different step id; overriding");
            }
            Ok(normalized.payload)
        }
        .instrument(span)
        .await
    }

    /// Execute a step under the last-started-wins rule.
    ///
    /// Starting another execution for the same step id while this one is
    /// running cancels this one; a result that completes after being
    /// superseded is discarded.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Cancelled` when superseded, otherwise the errors
    /// of [`Planner::execute_step`].
    pub async fn execute_step_tracked(&self, request: &StepRequest) -> Result<PatchPayload> {
        let ticket = self.in_flight.begin(&request.step.id);
        let cancel = ticket.cancellation().clone();

        let outcome = tokio::select! {
            () = cancel.cancelled() => None,
            result = self.execute_step(request) => Some(result),
        };

        let committed = self.in_flight.finish(&ticket);
        match outcome {
            Some(result) if committed => result,
            _ => {
                info!(step_id = %request.step.id, "execution superseded; result discarded");
                Err(AppError::Cancelled(format!(
                    "execution of step {} was superseded",
                    request.step.id
                )))
            }
        }
    }
}

fn validate_step(request: &StepRequest) -> Result<()> {
    let step = &request.step;
    for (field, value) in [
        ("id", &step.id),
        ("title", &step.title),
        ("description", &step.description),
    ] {
        if value.trim().is_empty() {
            return Err(AppError::Validation(format!("step {field} must not be empty")));
        }
    }
    Ok(())
}
