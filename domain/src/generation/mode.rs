//! Generation mode definitions.
//!
//! [`GenerationMode`] selects the behaviour (system instruction, model,
//! thinking budget) the streaming generation port applies to a prompt.
//! Agent sub-steps always run in [`GenerationMode::Thinker`] unless
//! configured otherwise.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Behaviour mode for a single generation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMode {
    /// Fast, concise answers
    Quick,
    /// Conversational answers
    Chat,
    /// Deep multi-step analysis (used for agent sub-steps)
    #[default]
    Thinker,
    /// Structured, lesson-style explanations
    Professor,
}

impl GenerationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationMode::Quick => "quick",
            GenerationMode::Chat => "chat",
            GenerationMode::Thinker => "thinker",
            GenerationMode::Professor => "professor",
        }
    }

    /// Modes that request an extended thinking budget from the model.
    pub fn uses_thinking(&self) -> bool {
        matches!(self, GenerationMode::Thinker | GenerationMode::Professor)
    }

    /// Modes that always ground on web search, regardless of the request flag.
    pub fn always_grounded(&self) -> bool {
        matches!(self, GenerationMode::Professor)
    }

    /// All modes, for help text and validation messages.
    pub fn all() -> &'static [GenerationMode] {
        &[
            GenerationMode::Quick,
            GenerationMode::Chat,
            GenerationMode::Thinker,
            GenerationMode::Professor,
        ]
    }
}

impl fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for GenerationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "quick" | "q" => Ok(GenerationMode::Quick),
            "chat" | "c" => Ok(GenerationMode::Chat),
            "thinker" | "think" | "t" => Ok(GenerationMode::Thinker),
            "professor" | "prof" | "p" => Ok(GenerationMode::Professor),
            _ => Err(format!("Invalid GenerationMode: {}", s)),
        }
    }
}
