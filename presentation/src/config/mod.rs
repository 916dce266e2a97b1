//! Presentation-level configuration
//!
//! Console behaviour, resolved from the `[output]` section and CLI flags.

use serde::{Deserialize, Serialize};

/// Console output configuration for the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Enable colored terminal output
    pub color: bool,
    /// Show a spinner while a step runs
    pub show_progress: bool,
    /// Print step text as it streams in
    pub stream_text: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            color: true,
            show_progress: true,
            stream_text: true,
        }
    }
}

impl OutputConfig {
    /// Apply the global color switch for `colored`.
    pub fn apply_color(&self) {
        if !self.color {
            colored::control::set_override(false);
        }
    }
}
