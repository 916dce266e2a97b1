//! Domain error types

use crate::agent::step::StepStatus;
use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Goal must not be empty")]
    EmptyGoal,

    #[error("Step description must not be empty")]
    EmptyStepDescription,

    #[error("Invalid step transition for {step}: {from} -> {to}")]
    InvalidStepTransition {
        step: String,
        from: StepStatus,
        to: StepStatus,
    },

    #[error("Step {step} violates its invariants: {reason}")]
    InvariantViolation { step: String, reason: String },

    #[error("Step cursor {index} is outside a plan of {plan_len} steps")]
    CursorOutOfRange { index: usize, plan_len: usize },
}
