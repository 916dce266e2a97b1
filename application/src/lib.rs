//! Application layer for muse-engine
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.
//!
//! - [`AgentController`] — command entry points (`start`, `pause`, `stop`,
//!   step input) for every task
//! - [`ExecutePlanUseCase`] — the step loop
//! - [`ExecutionRegistry`] — per-task run tickets used as the cancellation signal
//! - [`AgentResultStore`] — shared in-memory results

pub mod config;
pub mod ports;
pub mod registry;
pub mod store;
pub mod use_cases;

// Re-export commonly used types
pub use config::ExecutionParams;
pub use ports::{
    agent_progress::{AgentProgressNotifier, NoAgentProgress},
    event_logger::{AgentEvent, AgentEventLogger, NoAgentEventLogger},
    generation_gateway::{GatewayError, GenerationGateway, GenerationRequest, StreamHandle},
    plan_generator::PlanGenerator,
};
pub use registry::{ExecutionRegistry, RunTicket};
pub use store::AgentResultStore;
pub use use_cases::agent_controller::{AgentCommandError, AgentController};
pub use use_cases::execute_plan::{ExecutePlanUseCase, ExecutionOutcome, HaltReason};
pub use use_cases::generate_plan::{GeneratePlanUseCase, PlanGenerationError};
