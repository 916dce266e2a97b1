//! Gemini API configuration from TOML (`[gemini]` section)

use crate::gemini::config::{DEFAULT_BASE_URL, DEFAULT_THINKING_BUDGET};
use muse_domain::ConfigIssue;
use serde::{Deserialize, Serialize};

/// Environment variables consulted when `api_key` is not set, in order.
pub const API_KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

/// Raw Gemini configuration from TOML
///
/// # Example
///
/// ```toml
/// [gemini]
/// api_key = "..."                      # else $GEMINI_API_KEY / $API_KEY
/// thinker_model = "gemini-3-pro-preview"
/// plan_model = "gemini-3-pro-preview"
/// thinking_budget = 32768
/// timeout_seconds = 300
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGeminiConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub base_url: String,
    pub quick_model: String,
    pub chat_model: String,
    pub thinker_model: String,
    pub professor_model: String,
    pub plan_model: String,
    pub thinking_budget: u32,
    /// Whole-request timeout; unset means no limit beyond the connect timeout
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,
}

impl Default for FileGeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            quick_model: "gemini-flash-lite-latest".to_string(),
            chat_model: "gemini-2.5-flash".to_string(),
            thinker_model: "gemini-3-pro-preview".to_string(),
            professor_model: "gemini-3-pro-preview".to_string(),
            plan_model: "gemini-3-pro-preview".to_string(),
            thinking_budget: DEFAULT_THINKING_BUDGET,
            timeout_seconds: None,
        }
    }
}

impl FileGeminiConfig {
    /// API key from the file, else from the environment.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.resolve_api_key_with(|name| std::env::var(name).ok())
    }

    pub fn resolve_api_key_with(&self, lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
        let non_blank = |key: String| {
            let key = key.trim().to_string();
            (!key.is_empty()).then_some(key)
        };
        self.api_key.clone().and_then(non_blank).or_else(|| {
            API_KEY_ENV_VARS
                .iter()
                .find_map(|name| lookup(name).and_then(non_blank))
        })
    }

    /// Empty model names and base URL.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        [
            ("gemini.base_url", &self.base_url),
            ("gemini.quick_model", &self.quick_model),
            ("gemini.chat_model", &self.chat_model),
            ("gemini.thinker_model", &self.thinker_model),
            ("gemini.professor_model", &self.professor_model),
            ("gemini.plan_model", &self.plan_model),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| ConfigIssue::empty(field))
        .collect()
    }
}
