//! Resolved settings for the Gemini adapters.

use crate::config::FileGeminiConfig;
use muse_domain::GenerationMode;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_THINKING_BUDGET: u32 = 32768;

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub quick_model: String,
    pub chat_model: String,
    pub thinker_model: String,
    pub professor_model: String,
    pub plan_model: String,
    /// Thinking budget for thinker/professor calls.
    pub thinking_budget: u32,
    pub timeout: Option<Duration>,
}

impl Default for GeminiConfig {
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
            timeout: None,
        }
    }
}

impl GeminiConfig {
    /// Build from the `[gemini]` section, resolving the API key from the
    /// environment when the file has none.
    pub fn from_file(file: &FileGeminiConfig) -> Self {
        Self {
            api_key: file.resolve_api_key(),
            base_url: file.base_url.trim_end_matches('/').to_string(),
            quick_model: file.quick_model.clone(),
            chat_model: file.chat_model.clone(),
            thinker_model: file.thinker_model.clone(),
            professor_model: file.professor_model.clone(),
            plan_model: file.plan_model.clone(),
            thinking_budget: file.thinking_budget,
            timeout: file.timeout_seconds.map(Duration::from_secs),
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn model_for(&self, mode: GenerationMode) -> &str {
        match mode {
            GenerationMode::Quick => &self.quick_model,
            GenerationMode::Chat => &self.chat_model,
            GenerationMode::Thinker => &self.thinker_model,
            GenerationMode::Professor => &self.professor_model,
        }
    }

    /// The configured key, if non-blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }

    pub fn endpoint(&self, model: &str, method: &str) -> String {
        format!("{}/models/{}:{}", self.base_url, model, method)
    }
}
