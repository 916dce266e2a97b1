//! Console output formatter for agent results

use colored::{ColoredString, Colorize};
use muse_domain::{AgentResult, AgentStatus, Citation, StepStatus};

/// Formats agent results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// The goal and its numbered plan.
    pub fn format_plan(result: &AgentResult) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Agent Plan"));
        output.push('\n');
        output.push_str(&format!("{} {}\n", "Goal:".cyan().bold(), result.goal));
        if !result.focuses.is_empty() {
            let names: Vec<_> = result.focuses.iter().map(|f| f.display_name()).collect();
            output.push_str(&format!("{} {}\n", "Focus:".cyan().bold(), names.join(", ")));
        }
        output.push('\n');

        for (i, step) in result.plan.iter().enumerate() {
            output.push_str(&format!(
                "  {} {} {}\n",
                format!("{}.", i + 1).bold(),
                Self::status_badge(step.status),
                step.description
            ));
            if let Some(question) = step.input_prompt.as_deref() {
                output.push_str(&format!("       {} {}\n", "asks:".dimmed(), question.dimmed()));
            }
        }

        output.push_str(&Self::footer());
        output
    }

    /// Every step with its result and sources.
    pub fn format(result: &AgentResult) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Agent Result"));
        output.push('\n');
        output.push_str(&format!("{} {}\n", "Goal:".cyan().bold(), result.goal));

        for (i, step) in result.plan.iter().enumerate() {
            output.push_str(&Self::section_header(&format!(
                "Step {}: {}",
                i + 1,
                step.description
            )));
            output.push_str(&format!("{}\n", Self::status_badge(step.status)));
            if let Some(text) = step.result.as_deref().filter(|t| !t.is_empty()) {
                output.push('\n');
                output.push_str(text);
                output.push('\n');
            }
            if !step.citations.is_empty() {
                output.push('\n');
                output.push_str(&Self::format_citations(&step.citations));
            }
        }

        output.push('\n');
        output.push_str(&format!("{}\n", Self::status_line(result)));
        output.push_str(&Self::footer());
        output
    }

    /// Status line, step tally and the distinct sources used across all steps.
    pub fn format_summary(result: &AgentResult) -> String {
        let (completed, total) = result.progress();
        let mut output = format!(
            "\n{}\n{} {}/{}\n",
            Self::status_line(result),
            "Steps completed:".cyan().bold(),
            completed,
            total
        );

        let mut sources: Vec<Citation> = Vec::new();
        for step in &result.plan {
            muse_domain::agent::value_objects::merge_citations(&mut sources, &step.citations);
        }
        if !sources.is_empty() {
            output.push_str(&format!("\n{}\n", "Sources:".cyan().bold()));
            output.push_str(&Self::format_citations(&sources));
        }
        output
    }

    /// Format as JSON
    pub fn format_json(result: &AgentResult) -> String {
        serde_json::to_string_pretty(result).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn format_citations(citations: &[Citation]) -> String {
        citations
            .iter()
            .enumerate()
            .map(|(i, c)| format!("  [{}] {} {}\n", i + 1, c.title, c.uri.dimmed()))
            .collect()
    }

    /// The task's status line, colored by status.
    pub fn status_line(result: &AgentResult) -> ColoredString {
        let line = result.status_line();
        match result.agent_state.status {
            AgentStatus::Completed => line.green().bold(),
            AgentStatus::Error => line.red().bold(),
            AgentStatus::Paused | AgentStatus::Stopped => line.yellow(),
            AgentStatus::Idle | AgentStatus::Running => line.normal(),
        }
    }

    pub fn status_badge(status: StepStatus) -> ColoredString {
        let label = format!("[{}]", status.as_str());
        match status {
            StepStatus::Idle => label.dimmed(),
            StepStatus::InProgress => label.blue(),
            StepStatus::AwaitingInput => label.yellow(),
            StepStatus::Completed => label.green(),
            StepStatus::Error => label.red(),
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("{}\n", "=".repeat(60).cyan())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use muse_domain::{Focus, PlanStep};

    fn trip() -> AgentResult {
        let mut result = AgentResult::new("Plan a trip", vec![Focus::Research])
            .unwrap()
            .with_plan(vec![
                PlanStep::new("Ask where to go").with_input_prompt("Which city?"),
                PlanStep::new("Suggest an itinerary"),
            ]);
        result.plan[0].result = Some("User input: \"Tokyo\"".to_string());
        result.plan[0].status = StepStatus::Completed;
        result.plan[1].result = Some("Day 1: Asakusa".to_string());
        result.plan[1].status = StepStatus::Completed;
        result.plan[1].merge_citations(&[
            Citation::new("https://a.example", "Guide A"),
            Citation::new("https://b.example", "Guide B"),
        ]);
        result.agent_state.complete();
        result
    }

    #[test]
    fn test_plan_lists_steps_and_questions() {
        colored::control::set_override(false);
        let text = ConsoleFormatter::format_plan(&trip());
        assert!(text.contains("Goal: Plan a trip"));
        assert!(text.contains("Focus: Research"));
        assert!(text.contains("1. [completed] Ask where to go"));
        assert!(text.contains("asks: Which city?"));
        assert!(text.contains("2. [completed] Suggest an itinerary"));
    }

    #[test]
    fn test_full_output_includes_results_and_sources() {
        colored::control::set_override(false);
        let text = ConsoleFormatter::format(&trip());
        assert!(text.contains("Step 2: Suggest an itinerary"));
        assert!(text.contains("Day 1: Asakusa"));
        assert!(text.contains("[2] Guide B https://b.example"));
        assert!(text.contains("Execution completed successfully."));
    }

    #[test]
    fn test_summary_dedups_sources() {
        colored::control::set_override(false);
        let mut result = trip();
        result.plan[0].merge_citations(&[Citation::new("https://a.example", "Guide A")]);
        let text = ConsoleFormatter::format_summary(&result);
        assert_eq!(text.matches("https://a.example").count(), 1);
        assert!(text.contains("Sources:"));
        assert!(text.contains("Steps completed: 2/2"));
    }

    #[test]
    fn test_summary_counts_unfinished_steps() {
        colored::control::set_override(false);
        let mut result = trip();
        result.plan[1].reset();
        result.agent_state.pause_at(1, muse_domain::PauseCause::Incomplete);
        let text = ConsoleFormatter::format_summary(&result);
        assert!(text.contains("Paused at step 2 of 2."));
        assert!(text.contains("Steps completed: 1/2"));
    }

    #[test]
    fn test_json_is_the_record() {
        let value: serde_json::Value =
            serde_json::from_str(&ConsoleFormatter::format_json(&trip())).unwrap();
        assert_eq!(value["goal"], "Plan a trip");
        assert_eq!(value["agentState"]["status"], "completed");
    }
}
