//! Execution parameters for the step loop.
//!
//! [`ExecutionParams`] groups the static parameters that control the
//! step loop in [`ExecutePlanUseCase`](crate::use_cases::execute_plan::ExecutePlanUseCase).
//! These are application-layer concerns, not domain policy.

use muse_domain::GenerationMode;
use serde::{Deserialize, Serialize};

/// Execution loop control parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionParams {
    /// Generation mode used for every plan step.
    pub step_mode: GenerationMode,
    /// Request the grounding-enabled variant for plan steps.
    pub grounding: bool,
    /// Buffer size of the per-step event channel.
    pub channel_capacity: usize,
}

impl Default for ExecutionParams {
    fn default() -> Self {
        Self {
            step_mode: GenerationMode::Thinker,
            grounding: true,
            channel_capacity: 64,
        }
    }
}

impl ExecutionParams {
    // ==================== Builder Methods ====================

    pub fn with_step_mode(mut self, mode: GenerationMode) -> Self {
        self.step_mode = mode;
        self
    }

    pub fn with_grounding(mut self, grounding: bool) -> Self {
        self.grounding = grounding;
        self
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }

    /// Whether a step request asks for grounding.
    ///
    /// Professor mode is always grounded.
    pub fn effective_grounding(&self) -> bool {
        self.grounding || self.step_mode.always_grounded()
    }
}
