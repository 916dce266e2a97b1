//! Prompt templates for the Agent system

use crate::agent::PlanStep;

/// Templates for generating agent prompts
pub struct AgentPromptTemplate;

impl AgentPromptTemplate {
    /// Request sent to the plan generator for a user goal.
    pub fn plan_request(goal: &str) -> String {
        format!(
            "My goal is: \"{}\". Please break this down into a step-by-step plan. \
             For each step, provide a clear description. If a step requires user input, \
             also provide a short, clear question to ask the user.",
            goal
        )
    }

    /// Prompt for executing `step`.
    ///
    /// A step that already carries a result (re-run after user input) is
    /// seeded with that result.
    pub fn step_prompt(step: &PlanStep) -> String {
        match step.result.as_deref() {
            Some(previous) if !previous.is_empty() => format!(
                "Based on my previous work on this step: '{}', now do this: {}",
                previous, step.description
            ),
            _ => step.description.clone(),
        }
    }

    /// Context for the step at `index`: every earlier step's description and
    /// result, as `Step: ...\nResult: ...` blocks joined by blank lines.
    ///
    /// Returns `None` for the first step.
    pub fn prior_context(plan: &[PlanStep], index: usize) -> Option<String> {
        let earlier = &plan[..index.min(plan.len())];
        if earlier.is_empty() {
            return None;
        }
        Some(
            earlier
                .iter()
                .map(|s| {
                    let result = s.result.as_deref().filter(|r| !r.is_empty());
                    format!("Step: {}\nResult: {}", s.description, result.unwrap_or("N/A"))
                })
                .collect::<Vec<_>>()
                .join("\n\n"),
        )
    }

    /// Result text recorded for a user's answer to an input prompt.
    pub fn user_input(answer: &str) -> String {
        format!("User input: \"{}\"", answer)
    }

    /// Result text recorded for a failed step.
    pub fn step_error(message: &str) -> String {
        format!("Error: {}", message)
    }
}
