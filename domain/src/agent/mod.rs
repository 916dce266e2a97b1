//! Agent domain module
//!
//! Contains the agent result record, its plan steps and the task-level
//! state register for the autonomous plan executor.

pub mod entities;
pub mod state;
pub mod step;
pub mod value_objects;

pub use entities::AgentResult;
pub use state::{AgentCommand, AgentStatus, AgentTaskState, PauseCause, StartMode};
pub use step::{PlanStep, PlanStepDraft, StepStatus};
pub use value_objects::{Citation, ResultId, StepId};
