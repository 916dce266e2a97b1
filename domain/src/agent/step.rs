//! Plan steps and their per-step state machine.
//!
//! ```text
//! idle ──(picked, no unmet input)──▶ in-progress ──(stream done)──▶ completed
//!  │                                      │
//!  │                                      └──(stream error)──▶ error
//!  └──(input prompt, no result)──▶ awaiting-input ──(user answer)──▶ idle
//! ```
//!
//! Transitions outside this table are rejected by [`PlanStep::transition`].
//! Resetting a step back to `idle` (restart) is a separate operation,
//! [`PlanStep::reset`], and is always allowed.

use super::value_objects::{Citation, StepId, merge_citations};
use crate::core::error::DomainError;
use crate::prompt::AgentPromptTemplate;
use serde::{Deserialize, Serialize};

/// Status of a single plan step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum StepStatus {
    /// Not started (or reset for a re-run)
    #[default]
    Idle,
    /// Currently streaming
    InProgress,
    /// Blocked on a user answer
    AwaitingInput,
    /// Finished cleanly
    Completed,
    /// Generation failed
    Error,
}

impl StepStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepStatus::Idle => "idle",
            StepStatus::InProgress => "in-progress",
            StepStatus::AwaitingInput => "awaiting-input",
            StepStatus::Completed => "completed",
            StepStatus::Error => "error",
        }
    }

    /// Whether `self -> next` is an edge of the step state machine.
    pub fn can_transition_to(&self, next: StepStatus) -> bool {
        use StepStatus::*;
        matches!(
            (self, next),
            (Idle, InProgress)
                | (Idle, AwaitingInput)
                | (AwaitingInput, AwaitingInput)
                | (AwaitingInput, Idle)
                | (InProgress, Completed)
                | (InProgress, Error)
        )
    }
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A step as returned by the plan generator, before ids and status exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanStepDraft {
    pub description: String,
    #[serde(default, alias = "inputPrompt", skip_serializing_if = "Option::is_none")]
    pub input_prompt: Option<String>,
}

impl PlanStepDraft {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            input_prompt: None,
        }
    }

    pub fn with_input_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.input_prompt = Some(prompt.into());
        self
    }
}

/// One unit of work in a plan (Entity).
///
/// `description` and `input_prompt` are fixed at creation; `status`,
/// `result` and `citations` are mutated only by the executor and the
/// command/input handlers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanStep {
    pub id: StepId,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_prompt: Option<String>,
    #[serde(default)]
    pub status: StepStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub citations: Vec<Citation>,
}

impl PlanStep {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            id: StepId::generate(),
            description: description.into(),
            input_prompt: None,
            status: StepStatus::Idle,
            result: None,
            citations: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<StepId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_input_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.input_prompt = Some(prompt.into());
        self
    }

    /// Build an idle step with a fresh id from a generator draft.
    ///
    /// Blank input prompts are treated as absent.
    pub fn from_draft(draft: PlanStepDraft) -> Result<Self, DomainError> {
        let description = draft.description.trim();
        if description.is_empty() {
            return Err(DomainError::EmptyStepDescription);
        }
        let input_prompt = draft
            .input_prompt
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());

        Ok(Self {
            input_prompt,
            ..Self::new(description)
        })
    }

    /// The step carries a question for the user.
    pub fn requires_input(&self) -> bool {
        self.input_prompt
            .as_deref()
            .is_some_and(|p| !p.trim().is_empty())
    }

    /// The step has non-empty result text.
    pub fn has_result(&self) -> bool {
        self.result.as_deref().is_some_and(|r| !r.is_empty())
    }

    /// The step cannot run until the user answers its input prompt.
    pub fn needs_input(&self) -> bool {
        self.requires_input() && !self.has_result()
    }

    /// Move to `next`, rejecting edges outside the state machine.
    pub fn transition(&mut self, next: StepStatus) -> Result<(), DomainError> {
        if !self.status.can_transition_to(next) {
            return Err(DomainError::InvalidStepTransition {
                step: self.id.to_string(),
                from: self.status,
                to: next,
            });
        }
        if next == StepStatus::AwaitingInput && !self.needs_input() {
            return Err(DomainError::InvariantViolation {
                step: self.id.to_string(),
                reason: "awaiting-input requires an input prompt and no result".to_string(),
            });
        }
        self.status = next;
        Ok(())
    }

    pub fn mark_awaiting_input(&mut self) -> Result<(), DomainError> {
        self.transition(StepStatus::AwaitingInput)
    }

    pub fn mark_in_progress(&mut self) -> Result<(), DomainError> {
        self.transition(StepStatus::InProgress)
    }

    pub fn mark_completed(&mut self) -> Result<(), DomainError> {
        self.transition(StepStatus::Completed)
    }

    /// Fail the step, replacing its result with the wrapped error text.
    pub fn mark_error(&mut self, message: &str) -> Result<(), DomainError> {
        self.transition(StepStatus::Error)?;
        self.result = Some(AgentPromptTemplate::step_error(message));
        Ok(())
    }

    /// Record the user's answer and return the step to `idle` for a re-run.
    pub fn provide_input(&mut self, answer: &str) -> Result<(), DomainError> {
        if self.status != StepStatus::AwaitingInput {
            return Err(DomainError::InvalidStepTransition {
                step: self.id.to_string(),
                from: self.status,
                to: StepStatus::Idle,
            });
        }
        self.result = Some(AgentPromptTemplate::user_input(answer));
        self.status = StepStatus::Idle;
        Ok(())
    }

    /// Replace the result with the first fragment of a fresh run.
    pub fn begin_output(&mut self, text: &str) {
        self.result = Some(text.to_string());
    }

    /// Append a streamed fragment to the result.
    pub fn append_output(&mut self, text: &str) {
        self.result.get_or_insert_with(String::new).push_str(text);
    }

    /// Merge citations additively, de-duplicated by URI.
    pub fn merge_citations(&mut self, incoming: &[Citation]) -> usize {
        merge_citations(&mut self.citations, incoming)
    }

    /// Restart: back to `idle` with result and citations cleared.
    pub fn reset(&mut self) {
        self.status = StepStatus::Idle;
        self.result = None;
        self.citations.clear();
    }

    /// Check the record-level invariants (used on loaded/archived data).
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.description.trim().is_empty() {
            return Err(DomainError::EmptyStepDescription);
        }
        if self.status == StepStatus::AwaitingInput && !self.needs_input() {
            return Err(DomainError::InvariantViolation {
                step: self.id.to_string(),
                reason: "awaiting-input requires an input prompt and no result".to_string(),
            });
        }
        Ok(())
    }
}
