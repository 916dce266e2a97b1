//! Agent execution progress port.
//!
//! [`AgentProgressNotifier`] is an **output port** that the presentation layer
//! implements to display plan execution to the user as it happens.
//! All callback argument types come from the domain layer.
//!
//! # Example Implementation
//!
//! ```ignore
//! use muse_application::ports::agent_progress::AgentProgressNotifier;
//!
//! struct MyProgress;
//!
//! impl AgentProgressNotifier for MyProgress {
//!     fn on_step_start(&self, index: usize, step: &PlanStep) {
//!         println!("Step {}: {}", index + 1, step.description);
//!     }
//! }
//! ```

use muse_domain::{AgentTaskState, Citation, PlanStep, ResultId};

/// Progress notifier for plan execution.
///
/// All methods have default no-op implementations, so implementers only
/// need to override the callbacks they care about.
pub trait AgentProgressNotifier: Send + Sync {
    /// Called when a plan has been generated for a result
    fn on_plan_generated(&self, _id: &ResultId, _plan: &[PlanStep]) {}

    /// Called when plan generation fails; `message` is user-facing
    fn on_plan_failed(&self, _id: &ResultId, _message: &str) {}

    /// Called whenever the task state register changes
    fn on_status_change(&self, _id: &ResultId, _state: &AgentTaskState, _status_line: &str) {}

    /// Called when a step enters `in-progress`
    fn on_step_start(&self, _index: usize, _step: &PlanStep) {}

    /// Called for every streamed text fragment of the running step
    fn on_step_fragment(&self, _index: usize, _text: &str) {}

    /// Called when new citations were merged into the running step
    fn on_step_citations(&self, _index: usize, _citations: &[Citation]) {}

    /// Called when a step completes
    fn on_step_complete(&self, _index: usize, _step: &PlanStep) {}

    /// Called when a step fails; `message` is user-facing
    fn on_step_error(&self, _index: usize, _message: &str) {}

    /// Called when a step blocks on its input prompt
    fn on_awaiting_input(&self, _index: usize, _step: &PlanStep) {}

    /// Called when a run observes cancellation and exits
    fn on_cancelled(&self, _id: &ResultId) {}

    /// Called when a run's loop has finished (in any way)
    fn on_execution_finished(&self, _id: &ResultId, _state: &AgentTaskState) {}
}

/// No-op progress notifier
pub struct NoAgentProgress;

impl AgentProgressNotifier for NoAgentProgress {}
