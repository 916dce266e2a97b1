//! Generate Plan use case
//!
//! Asks the [`PlanGenerator`] to decompose a result's goal and stores the
//! resulting steps (all `idle`, fresh ids). Failure moves the task to `error`.

use crate::ports::agent_progress::{AgentProgressNotifier, NoAgentProgress};
use crate::ports::event_logger::{AgentEvent, AgentEventLogger, NoAgentEventLogger};
use crate::ports::generation_gateway::GatewayError;
use crate::ports::plan_generator::PlanGenerator;
use crate::store::AgentResultStore;
use crate::use_cases::shared::report_status;
use muse_domain::{AgentTaskState, PlanStep, PlanStepDraft, ResultId};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Errors that can occur while producing a plan
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanGenerationError {
    #[error("Plan generation failed: {0}")]
    Gateway(#[from] GatewayError),

    #[error("The generated plan has no steps")]
    EmptyPlan,

    #[error("Step {index} of the generated plan has no description")]
    InvalidStep { index: usize },

    #[error("Unknown result: {0}")]
    UnknownResult(ResultId),

    #[error("Result {0} is running")]
    Running(ResultId),
}

impl PlanGenerationError {
    /// Message suitable for showing to the user.
    pub fn user_message(&self) -> String {
        match self {
            PlanGenerationError::Gateway(e) => e.user_message(),
            PlanGenerationError::EmptyPlan | PlanGenerationError::InvalidStep { .. } => {
                "The model returned an unusable plan. Please try rephrasing your goal.".to_string()
            }
            PlanGenerationError::Running(_) => {
                "Pause or stop the running task before generating a new plan.".to_string()
            }
            other => other.to_string(),
        }
    }
}

pub struct GeneratePlanUseCase {
    planner: Arc<dyn PlanGenerator>,
    store: Arc<AgentResultStore>,
    progress: Arc<dyn AgentProgressNotifier>,
    logger: Arc<dyn AgentEventLogger>,
}

impl GeneratePlanUseCase {
    pub fn new(planner: Arc<dyn PlanGenerator>, store: Arc<AgentResultStore>) -> Self {
        Self {
            planner,
            store,
            progress: Arc::new(NoAgentProgress),
            logger: Arc::new(NoAgentEventLogger),
        }
    }

    pub fn with_progress(mut self, progress: Arc<dyn AgentProgressNotifier>) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_event_logger(mut self, logger: Arc<dyn AgentEventLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Map generator drafts into idle plan steps.
    pub fn build_plan(drafts: Vec<PlanStepDraft>) -> Result<Vec<PlanStep>, PlanGenerationError> {
        if drafts.is_empty() {
            return Err(PlanGenerationError::EmptyPlan);
        }
        drafts
            .into_iter()
            .enumerate()
            .map(|(index, draft)| {
                PlanStep::from_draft(draft).map_err(|_| PlanGenerationError::InvalidStep { index })
            })
            .collect()
    }

    pub async fn execute(&self, id: &ResultId) -> Result<Vec<PlanStep>, PlanGenerationError> {
        let current = self
            .store
            .get(id)
            .ok_or_else(|| PlanGenerationError::UnknownResult(id.clone()))?;
        if current.agent_state.is_running() {
            return Err(PlanGenerationError::Running(id.clone()));
        }

        info!("Generating plan for {}: {}", id, current.goal);
        let outcome = match self.planner.generate_plan(&current.goal).await {
            Ok(drafts) => Self::build_plan(drafts),
            Err(e) => Err(PlanGenerationError::Gateway(e)),
        };

        match outcome {
            Ok(plan) => {
                let stored = self.store.update(id, |result| {
                    result.set_plan(plan.clone());
                    result.agent_state = AgentTaskState::new();
                    result.agent_state.clone()
                });
                let state = stored.ok_or_else(|| PlanGenerationError::UnknownResult(id.clone()))?;

                info!("Plan for {} has {} steps", id, plan.len());
                self.progress.on_plan_generated(id, &plan);
                self.logger.log(AgentEvent::new(
                    "plan_generated",
                    json!({
                        "result_id": id.as_str(),
                        "goal": current.goal,
                        "steps": plan.iter().map(|s| json!({
                            "id": s.id.as_str(),
                            "description": s.description,
                            "input_prompt": s.input_prompt,
                        })).collect::<Vec<_>>(),
                    }),
                ));
                report_status(
                    self.progress.as_ref(),
                    self.logger.as_ref(),
                    id,
                    &state,
                    plan.len(),
                );
                Ok(plan)
            }
            Err(e) => {
                warn!("Plan generation for {} failed: {}", id, e);
                let failed = self.store.update(id, |result| {
                    result.agent_state.fail();
                    (result.agent_state.clone(), result.plan.len())
                });
                self.progress.on_plan_failed(id, &e.user_message());
                if let Some((state, plan_len)) = failed {
                    report_status(
                        self.progress.as_ref(),
                        self.logger.as_ref(),
                        id,
                        &state,
                        plan_len,
                    );
                }
                Err(e)
            }
        }
    }
}
