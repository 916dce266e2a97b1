//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod agent_progress;
pub mod event_logger;
pub mod generation_gateway;
pub mod plan_generator;
