//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod agent_controller;
pub mod execute_plan;
pub mod generate_plan;
pub(crate) mod shared;
