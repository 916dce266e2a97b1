//! Domain layer for muse-engine
//!
//! This crate contains the core business logic, entities, and value objects
//! of the autonomous agent. It has no dependencies on infrastructure or
//! presentation concerns.
//!
//! # Core Concepts
//!
//! ## Agent result
//!
//! One user goal becomes one [`AgentResult`]: an ordered plan of
//! [`PlanStep`]s plus an [`AgentTaskState`] (status register and step cursor).
//!
//! ## Steps
//!
//! Each step walks the state machine in [`agent::step`]. A step with an input
//! prompt blocks in `awaiting-input` until the user answers; the answer seeds
//! the step's re-run.
//!
//! ## Generation
//!
//! Steps are executed by a streaming generation call parameterised by a
//! [`GenerationMode`] and the result's [`Focus`] tags; the stream delivers
//! [`StreamEvent`]s.

pub mod agent;
pub mod config;
pub mod core;
pub mod generation;
pub mod prompt;
pub mod session;

// Re-export commonly used types
pub use agent::{
    AgentCommand, AgentResult, AgentStatus, AgentTaskState, Citation, PauseCause, PlanStep,
    PlanStepDraft, ResultId, StartMode, StepId, StepStatus,
};
pub use config::{ConfigIssue, ConfigIssueCode, Severity};
pub use core::error::DomainError;
pub use generation::{Focus, GenerationMode};
pub use prompt::{AgentPromptTemplate, PromptTemplate};
pub use session::{Fragment, StreamEvent};
