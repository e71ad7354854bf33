//! Session state for the plan / execute / accept workflow.
//!
//! State changes only through [`SessionState::reduce`]. Every action is a
//! pure transition, so the binary can load, reduce, and save without
//! additional bookkeeping.

pub mod store;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::{AcceptedStep, PatchPayload, Plan, PlanStep};

pub use store::{load_session, save_session};

/// A single state transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    /// Replace the code context.
    SetContext(String),
    /// Replace the change request.
    SetIntent(String),
    /// Install a new plan, discarding executions and acceptances.
    SetPlan(Plan),
    /// Replace the step with the same id; its execution becomes stale and
    /// is discarded together with any acceptance.
    EditStep(PlanStep),
    /// Move a step to `index` (clamped to the plan length).
    MoveStep {
        /// Step to move.
        step_id: String,
        /// Destination position.
        index: usize,
    },
    /// Remove a step with its execution and acceptance.
    RemoveStep(String),
    /// Store the latest execution for `payload.step_id`, clearing any
    /// acceptance of an earlier execution.
    RecordExecution(PatchPayload),
    /// Approve the current execution of a step.
    Accept(String),
    /// Withdraw approval of a step.
    Reject(String),
    /// Return to the empty state.
    Reset,
}

/// Everything the workflow accumulates between commands.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    /// Source text the plan is made against.
    #[serde(default)]
    pub code_context: String,
    /// Natural-language change request.
    #[serde(default)]
    pub intent: String,
    /// Current plan.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<Plan>,
    /// Latest execution per step id.
    #[serde(default)]
    pub executions: BTreeMap<String, PatchPayload>,
    /// Accepted step ids, in acceptance order.
    #[serde(default)]
    pub accepted: Vec<String>,
}

impl SessionState {
    /// Apply `action` and return the next state.
    #[must_use]
    pub fn reduce(mut self, action: SessionAction) -> Self {
        match action {
            SessionAction::SetContext(code_context) => self.code_context = code_context,
            SessionAction::SetIntent(intent) => self.intent = intent,
            SessionAction::SetPlan(plan) => {
                debug!(steps = plan.steps.len(), "installing plan");
                self.plan = Some(plan);
                self.executions.clear();
                self.accepted.clear();
            }
            SessionAction::EditStep(step) => {
                let Some(slot) = self.step_mut(&step.id) else {
                    warn!(step_id = %step.id, "edit ignored: unknown step");
                    return self;
                };
                let step_id = step.id.clone();
                *slot = step;
                self.forget(&step_id);
            }
            SessionAction::MoveStep { step_id, index } => {
                if let Some(plan) = self.plan.as_mut() {
                    if let Some(from) = plan.steps.iter().position(|s| s.id == step_id) {
                        let step = plan.steps.remove(from);
                        let to = index.min(plan.steps.len());
                        plan.steps.insert(to, step);
                    }
                }
            }
            SessionAction::RemoveStep(step_id) => {
                if let Some(plan) = self.plan.as_mut() {
                    plan.steps.retain(|s| s.id != step_id);
                }
                self.forget(&step_id);
            }
            SessionAction::RecordExecution(payload) => {
                let step_id = payload.step_id.clone();
                self.accepted.retain(|id| *id != step_id);
                self.executions.insert(step_id, payload);
            }
            SessionAction::Accept(step_id) => {
                if !self.executions.contains_key(&step_id) {
                    warn!(%step_id, "accept ignored: step has no execution");
                } else if !self.accepted.contains(&step_id) {
                    self.accepted.push(step_id);
                }
            }
            SessionAction::Reject(step_id) => self.accepted.retain(|id| *id != step_id),
            SessionAction::Reset => return Self::default(),
        }
        self
    }

    fn step_mut(&mut self, step_id: &str) -> Option<&mut PlanStep> {
        self.plan
            .as_mut()?
            .steps
            .iter_mut()
            .find(|step| step.id == step_id)
    }

    fn forget(&mut self, step_id: &str) {
        self.executions.remove(step_id);
        self.accepted.retain(|id| id != step_id);
    }

    /// Whether `step_id` is currently accepted.
    #[must_use]
    pub fn is_accepted(&self, step_id: &str) -> bool {
        self.accepted.iter().any(|id| id == step_id)
    }

    /// Join rows for every plan step, in plan order.
    #[must_use]
    pub fn accepted_steps(&self) -> Vec<AcceptedStep> {
        self.plan
            .iter()
            .flat_map(|plan| plan.steps.iter())
            .map(|step| AcceptedStep {
                step: step.clone(),
                execution: self.executions.get(&step.id).cloned(),
                accepted: self.is_accepted(&step.id),
            })
            .collect()
    }

    /// Accepted executions in acceptance order.
    ///
    /// This is the order reconstruction replays patches in.
    #[must_use]
    pub fn accepted_executions(&self) -> Vec<PatchPayload> {
        self.accepted
            .iter()
            .filter_map(|id| self.executions.get(id))
            .cloned()
            .collect()
    }
}
