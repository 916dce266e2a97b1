//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! String-typed fields are parsed into domain types by `parse_*` helpers
//! that report problems as [`ConfigIssue`]s instead of failing.

mod agent;
mod gemini;
mod logging;
mod output;

pub use agent::FileAgentConfig;
pub use gemini::{API_KEY_ENV_VARS, FileGeminiConfig};
pub use logging::FileLoggingConfig;
pub use output::FileOutputConfig;

use muse_domain::ConfigIssue;
use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Gemini API settings
    pub gemini: FileGeminiConfig,
    /// Agent step settings
    pub agent: FileAgentConfig,
    /// Terminal output settings
    pub output: FileOutputConfig,
    /// Diagnostic and event logging
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    ///
    /// Checks empty model names, the step mode and the focus tags.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = self.gemini.validate();
        issues.extend(self.agent.parse_step_mode().1);
        issues.extend(self.agent.parse_focuses().1);
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use muse_domain::{Focus, GenerationMode};

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[gemini]
api_key = "abc"
thinker_model = "gemini-2.5-pro"
timeout_seconds = 120

[agent]
step_mode = "professor"
grounding = false
focuses = ["legal", "ethics"]

[output]
color = false

[logging]
event_log = "events.jsonl"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.gemini.api_key.as_deref(), Some("abc"));
        assert_eq!(config.gemini.thinker_model, "gemini-2.5-pro");
        assert_eq!(config.gemini.timeout_seconds, Some(120));
        assert_eq!(config.agent.parse_step_mode().0, GenerationMode::Professor);
        assert_eq!(
            config.agent.parse_focuses().0,
            vec![Focus::Legal, Focus::Ethics]
        );
        assert!(!config.output.color);
        assert_eq!(
            config.logging.event_log.as_deref(),
            Some(std::path::Path::new("events.jsonl"))
        );
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_deserialize_partial_config() {
        let config: FileConfig = toml::from_str("[agent]\ngrounding = false\n").unwrap();
        assert!(!config.agent.grounding);
        assert_eq!(config.agent.step_mode, "thinker");
        assert_eq!(config.gemini, FileGeminiConfig::default());
        assert!(config.output.color);
    }

    #[test]
    fn test_validate_collects_all_issues() {
        let config: FileConfig = toml::from_str(
            r#"
[gemini]
chat_model = ""

[agent]
step_mode = "dreamer"
focuses = ["astrology"]
"#,
        )
        .unwrap();
        let issues = config.validate();
        assert_eq!(issues.len(), 3);
        assert_eq!(issues.iter().filter(|i| i.is_error()).count(), 1);
    }
}
