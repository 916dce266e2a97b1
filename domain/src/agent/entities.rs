//! Agent domain entities

use super::state::{AgentTaskState, StartMode};
use super::step::{PlanStep, StepStatus};
use super::value_objects::{ResultId, StepId};
use crate::core::error::DomainError;
use crate::generation::Focus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One agent invocation (Entity).
///
/// Created empty when the user submits a goal; the plan generator fills
/// `plan`, and the executor plus the command handlers mutate `plan` and
/// `agent_state` until the task reaches a terminal condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentResult {
    pub id: ResultId,
    /// The user's goal text
    pub goal: String,
    /// Focus tags forwarded to every step's generation call
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub focuses: Vec<Focus>,
    /// Ordered plan steps (the plan store)
    #[serde(default)]
    pub plan: Vec<PlanStep>,
    #[serde(default)]
    pub agent_state: AgentTaskState,
    pub created_at: DateTime<Utc>,
}

impl AgentResult {
    /// Creates an idle result with an empty plan.
    pub fn new(goal: impl Into<String>, focuses: Vec<Focus>) -> Result<Self, DomainError> {
        let goal = goal.into();
        if goal.trim().is_empty() {
            return Err(DomainError::EmptyGoal);
        }
        Ok(Self {
            id: ResultId::generate(),
            goal: goal.trim().to_string(),
            focuses,
            plan: Vec::new(),
            agent_state: AgentTaskState::new(),
            created_at: Utc::now(),
        })
    }

    pub fn with_id(mut self, id: impl Into<ResultId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_plan(mut self, plan: Vec<PlanStep>) -> Self {
        self.plan = plan;
        self
    }

    pub fn set_plan(&mut self, plan: Vec<PlanStep>) {
        self.plan = plan;
    }

    pub fn has_plan(&self) -> bool {
        !self.plan.is_empty()
    }

    pub fn step_index(&self, id: &StepId) -> Option<usize> {
        self.plan.iter().position(|s| &s.id == id)
    }

    /// Every step is `completed` (vacuously true for an empty plan).
    pub fn all_steps_completed(&self) -> bool {
        self.plan.iter().all(|s| s.status == StepStatus::Completed)
    }

    /// Restart every step: `idle`, no result, no citations.
    pub fn reset_plan(&mut self) {
        for step in &mut self.plan {
            step.reset();
        }
    }

    /// Completion progress (completed / total)
    pub fn progress(&self) -> (usize, usize) {
        let completed = self
            .plan
            .iter()
            .filter(|s| s.status == StepStatus::Completed)
            .count();
        (completed, self.plan.len())
    }

    pub fn status_line(&self) -> String {
        self.agent_state.status_line(self.plan.len())
    }

    /// Check every step's invariants and that the cursor fits the plan.
    ///
    /// A task that resumes in place needs its cursor on an existing step.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.goal.trim().is_empty() {
            return Err(DomainError::EmptyGoal);
        }
        let cursor = self.agent_state.current_step_index;
        let plan_len = self.plan.len();
        let in_range = match self.agent_state.start_mode() {
            Some(StartMode::Resume(_)) => cursor < plan_len,
            _ => cursor <= plan_len,
        };
        if !in_range {
            return Err(DomainError::CursorOutOfRange {
                index: cursor,
                plan_len,
            });
        }
        self.plan.iter().try_for_each(PlanStep::validate)
    }
}
