//! Presentation layer for muse-engine
//!
//! This crate contains the CLI definition, console progress for plan
//! execution, terminal prompts for input-gated steps, and result formatting.

pub mod agent;
pub mod cli;
pub mod config;
pub mod output;

// Re-export commonly used types
pub use agent::{AgentProgressReporter, SimpleAgentProgress, StdinInputPrompt};
pub use cli::commands::{Cli, OutputFormat};
pub use config::OutputConfig;
pub use output::console::ConsoleFormatter;
