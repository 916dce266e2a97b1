//! Agent configuration from TOML (`[agent]` section)

use muse_application::ExecutionParams;
use muse_domain::{ConfigIssue, Focus, GenerationMode};
use serde::{Deserialize, Serialize};

/// Raw agent configuration from TOML
///
/// # Example
///
/// ```toml
/// [agent]
/// step_mode = "thinker"          # "quick", "chat", "thinker", "professor"
/// grounding = true
/// focuses = ["creative", "word-finder"]
/// channel_capacity = 64
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAgentConfig {
    /// Generation mode for plan steps
    pub step_mode: String,
    /// Request search grounding for plan steps
    pub grounding: bool,
    /// Focus tags applied to new goals
    pub focuses: Vec<String>,
    /// Per-step fragment channel size
    pub channel_capacity: usize,
}

impl Default for FileAgentConfig {
    fn default() -> Self {
        Self {
            step_mode: "thinker".to_string(),
            grounding: true,
            focuses: Vec::new(),
            channel_capacity: 64,
        }
    }
}

impl FileAgentConfig {
    /// Parse step_mode, falling back to thinker.
    pub fn parse_step_mode(&self) -> (GenerationMode, Vec<ConfigIssue>) {
        match self.step_mode.parse::<GenerationMode>() {
            Ok(mode) => (mode, vec![]),
            Err(_) => {
                let valid: Vec<&str> = GenerationMode::all().iter().map(|m| m.as_str()).collect();
                let issue =
                    ConfigIssue::invalid_enum("agent.step_mode", &self.step_mode, &valid, "thinker");
                (GenerationMode::Thinker, vec![issue])
            }
        }
    }

    /// Parse focus tags; unknown entries are dropped with a warning each.
    pub fn parse_focuses(&self) -> (Vec<Focus>, Vec<ConfigIssue>) {
        let mut focuses = Vec::new();
        let mut issues = Vec::new();
        for raw in &self.focuses {
            match raw.parse::<Focus>() {
                Ok(focus) if !focuses.contains(&focus) => focuses.push(focus),
                Ok(_) => {}
                Err(_) => {
                    let valid: Vec<&str> = Focus::all().iter().map(Focus::display_name).collect();
                    issues.push(ConfigIssue::invalid_enum(
                        "agent.focuses",
                        raw,
                        &valid,
                        "(ignored)",
                    ));
                }
            }
        }
        (focuses, issues)
    }

    pub fn to_execution_params(&self) -> (ExecutionParams, Vec<ConfigIssue>) {
        let (mode, issues) = self.parse_step_mode();
        let params = ExecutionParams::default()
            .with_step_mode(mode)
            .with_grounding(self.grounding)
            .with_channel_capacity(self.channel_capacity);
        (params, issues)
    }
}
