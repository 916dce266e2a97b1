//! Agent Controller
//!
//! Command entry points for agent tasks: submit a goal, generate its plan,
//! `start`/`pause`/`stop`, and answer a step's input prompt. Commands only
//! toggle the task state and the execution registry; the step loop itself
//! runs in a spawned task driven by [`ExecutePlanUseCase`].

use crate::config::ExecutionParams;
use crate::ports::agent_progress::{AgentProgressNotifier, NoAgentProgress};
use crate::ports::event_logger::{AgentEventLogger, NoAgentEventLogger};
use crate::ports::generation_gateway::GenerationGateway;
use crate::ports::plan_generator::PlanGenerator;
use crate::registry::{ExecutionRegistry, RunTicket};
use crate::store::AgentResultStore;
use crate::use_cases::execute_plan::{ExecutePlanUseCase, ExecutionOutcome};
use crate::use_cases::generate_plan::{GeneratePlanUseCase, PlanGenerationError};
use crate::use_cases::shared::report_status;
use muse_domain::{
    AgentCommand, AgentResult, AgentStatus, AgentTaskState, DomainError, Focus, PauseCause,
    PlanStep, ResultId, StartMode, StepId, StepStatus,
};
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Errors returned by agent commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AgentCommandError {
    #[error("Unknown result: {0}")]
    UnknownResult(ResultId),

    #[error("Unknown step: {0}")]
    UnknownStep(StepId),

    #[error("Cannot {command} while the task is {status}")]
    InvalidCommand {
        command: AgentCommand,
        status: AgentStatus,
    },

    #[error("The task has no plan to execute")]
    PlanNotReady,

    #[error("Step {0} is not awaiting input")]
    StepNotAwaitingInput(StepId),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Agent controller managing command handling for all tasks
pub struct AgentController {
    store: Arc<AgentResultStore>,
    registry: Arc<ExecutionRegistry>,
    planner: GeneratePlanUseCase,
    executor: ExecutePlanUseCase,
    progress: Arc<dyn AgentProgressNotifier>,
    logger: Arc<dyn AgentEventLogger>,
}

impl AgentController {
    pub fn new(
        gateway: Arc<dyn GenerationGateway>,
        planner: Arc<dyn PlanGenerator>,
        params: ExecutionParams,
    ) -> Self {
        let store = Arc::new(AgentResultStore::new());
        let registry = Arc::new(ExecutionRegistry::new());
        Self {
            planner: GeneratePlanUseCase::new(planner, store.clone()),
            executor: ExecutePlanUseCase::new(gateway, store.clone(), registry.clone())
                .with_params(params),
            store,
            registry,
            progress: Arc::new(NoAgentProgress),
            logger: Arc::new(NoAgentEventLogger),
        }
    }

    pub fn with_progress(mut self, progress: Arc<dyn AgentProgressNotifier>) -> Self {
        self.planner = self.planner.with_progress(progress.clone());
        self.executor = self.executor.with_progress(progress.clone());
        self.progress = progress;
        self
    }

    pub fn with_event_logger(mut self, logger: Arc<dyn AgentEventLogger>) -> Self {
        self.planner = self.planner.with_event_logger(logger.clone());
        self.executor = self.executor.with_event_logger(logger.clone());
        self.logger = logger;
        self
    }

    pub fn params(&self) -> &ExecutionParams {
        self.executor.params()
    }

    pub fn registry(&self) -> &ExecutionRegistry {
        &self.registry
    }

    // ==================== Results ====================

    /// Create an idle result with an empty plan for `goal`.
    pub fn submit_goal(
        &self,
        goal: &str,
        focuses: Vec<Focus>,
    ) -> Result<ResultId, AgentCommandError> {
        let result = AgentResult::new(goal, focuses)?;
        let id = result.id.clone();
        info!("Submitted goal {}: {}", id, result.goal);
        self.store.insert(result);
        Ok(id)
    }

    /// Adopt a previously saved result.
    ///
    /// A result archived mid-run is brought back as user-paused, so the next
    /// `start` restarts it.
    pub fn import(&self, mut result: AgentResult) -> Result<ResultId, AgentCommandError> {
        result.validate()?;
        if result.agent_state.is_running() {
            result.agent_state.pause_by_user();
        }
        let id = result.id.clone();
        self.registry.deregister(&id);
        self.store.insert(result);
        Ok(id)
    }

    pub fn snapshot(&self, id: &ResultId) -> Option<AgentResult> {
        self.store.get(id)
    }

    pub fn results(&self) -> Vec<AgentResult> {
        self.store.list()
    }

    /// Remove a result, cancelling any run it has.
    pub fn clear(&self, id: &ResultId) -> bool {
        self.registry.deregister(id);
        self.store.remove(id).is_some()
    }

    // ==================== Commands ====================

    pub async fn generate_plan(&self, id: &ResultId) -> Result<Vec<PlanStep>, PlanGenerationError> {
        self.planner.execute(id).await
    }

    /// `start`: resume a task paused at an input gate, or restart it from
    /// step 0 with every step reset.
    pub fn start(&self, id: &ResultId) -> Result<JoinHandle<ExecutionOutcome>, AgentCommandError> {
        let (ticket, index, state, plan_len) = self.update(id, |result| {
            if !result.has_plan() {
                return Err(AgentCommandError::PlanNotReady);
            }
            let mode = result.agent_state.start_mode().ok_or(
                AgentCommandError::InvalidCommand {
                    command: AgentCommand::Start,
                    status: result.agent_state.status,
                },
            )?;
            let index = match mode {
                StartMode::Resume(index) => index,
                StartMode::Restart => {
                    result.reset_plan();
                    0
                }
            };
            if self.registry.is_registered(&result.id) {
                debug!("[{}] Superseding an unreleased run", result.id);
            }
            let ticket = self.registry.register(&result.id);
            result.agent_state.run_from(index);
            Ok((ticket, index, result.agent_state.clone(), result.plan.len()))
        })?;

        info!("Starting {} at step {}", id, index + 1);
        Ok(self.spawn(ticket, index, &state, plan_len))
    }

    /// `pause`: freeze the running task; the in-flight step stops at its
    /// next fragment.
    pub fn pause(&self, id: &ResultId) -> Result<(), AgentCommandError> {
        self.interrupt(id, AgentCommand::Pause, AgentTaskState::pause_by_user)
    }

    /// `stop`: like `pause`, but a later `start` always restarts.
    pub fn stop(&self, id: &ResultId) -> Result<(), AgentCommandError> {
        self.interrupt(id, AgentCommand::Stop, AgentTaskState::stop)
    }

    /// Answer a step's input prompt and re-enter the loop at that step.
    pub fn submit_step_input(
        &self,
        id: &ResultId,
        step_id: &StepId,
        answer: &str,
    ) -> Result<JoinHandle<ExecutionOutcome>, AgentCommandError> {
        let (ticket, index, state, plan_len) = self.update(id, |result| {
            let index = result
                .step_index(step_id)
                .ok_or_else(|| AgentCommandError::UnknownStep(step_id.clone()))?;
            let step = &mut result.plan[index];
            if step.status != StepStatus::AwaitingInput {
                return Err(AgentCommandError::StepNotAwaitingInput(step_id.clone()));
            }
            step.provide_input(answer)?;
            if self.registry.is_registered(&result.id) {
                debug!("[{}] Superseding an unreleased run", result.id);
            }
            let ticket = self.registry.register(&result.id);
            result.agent_state.run_from(index);
            Ok((ticket, index, result.agent_state.clone(), result.plan.len()))
        })?;

        info!("Input received for step {} of {}", index + 1, id);
        Ok(self.spawn(ticket, index, &state, plan_len))
    }

    /// The step a paused task is waiting on, if any.
    pub fn pending_input(&self, id: &ResultId) -> Option<(usize, PlanStep)> {
        let result = self.store.get(id)?;
        if result.agent_state.status != AgentStatus::Paused
            || result.agent_state.pause_cause != Some(PauseCause::AwaitingInput)
        {
            return None;
        }
        let index = result.agent_state.current_step_index;
        result
            .plan
            .get(index)
            .filter(|s| s.status == StepStatus::AwaitingInput)
            .map(|s| (index, s.clone()))
    }

    // ==================== Internals ====================

    fn update<R>(
        &self,
        id: &ResultId,
        f: impl FnOnce(&mut AgentResult) -> Result<R, AgentCommandError>,
    ) -> Result<R, AgentCommandError> {
        self.store
            .update(id, f)
            .unwrap_or_else(|| Err(AgentCommandError::UnknownResult(id.clone())))
    }

    fn interrupt(
        &self,
        id: &ResultId,
        command: AgentCommand,
        apply: fn(&mut AgentTaskState),
    ) -> Result<(), AgentCommandError> {
        let (state, plan_len) = self.update(id, |result| {
            if !result.agent_state.allows(command) {
                return Err(AgentCommandError::InvalidCommand {
                    command,
                    status: result.agent_state.status,
                });
            }
            self.registry.deregister(&result.id);
            apply(&mut result.agent_state);
            Ok((result.agent_state.clone(), result.plan.len()))
        })?;

        info!("{} {}", command, id);
        report_status(
            self.progress.as_ref(),
            self.logger.as_ref(),
            id,
            &state,
            plan_len,
        );
        Ok(())
    }

    fn spawn(
        &self,
        ticket: RunTicket,
        index: usize,
        state: &AgentTaskState,
        plan_len: usize,
    ) -> JoinHandle<ExecutionOutcome> {
        report_status(
            self.progress.as_ref(),
            self.logger.as_ref(),
            &ticket.id,
            state,
            plan_len,
        );
        let executor = self.executor.clone();
        tokio::spawn(async move { executor.run(ticket, index).await })
    }
}
