//! CLI command definitions

use clap::{Parser, ValueEnum};
use muse_domain::{Focus, GenerationMode};
use std::path::PathBuf;

/// What to print once execution ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Final status line and sources
    Summary,
    /// Every step with its result and citations
    Full,
    /// The result record as JSON
    Json,
}

/// CLI arguments for muse
#[derive(Parser, Debug)]
#[command(name = "muse")]
#[command(author, version, about = "Muse Engine agent - turns a goal into a plan and executes it step by step")]
#[command(long_about = r#"
Muse breaks a goal into a step-by-step plan, then executes the steps in order.
Each step sees the results of the steps before it. Steps that need your input
stop and ask for it.

While a plan runs:
  Ctrl-C once     pause the task (the running step is abandoned)
  Ctrl-C twice    stop the task

Configuration files are loaded from (in priority order):
1. MUSE_* environment variables (e.g. MUSE_AGENT__STEP_MODE=quick)
2. --config <path>     Explicit config file
3. ./muse.toml         Project-level config
4. ~/.config/muse-engine/config.toml   Global config

The API key is read from gemini.api_key, $GEMINI_API_KEY or $API_KEY.

Example:
  muse "Write a haiku about the sea, then critique it"
  muse --focus creative --focus word-finder "Name my sailing blog"
  muse --resume session.json
"#)]
pub struct Cli {
    /// The goal for the agent (optional with --resume)
    pub goal: Option<String>,

    /// Field of expertise to draw on (can be specified multiple times)
    #[arg(short, long = "focus", value_name = "FOCUS")]
    pub focus: Vec<Focus>,

    /// Generation mode for plan steps (quick, chat, thinker, professor)
    #[arg(short, long, value_name = "MODE")]
    pub mode: Option<GenerationMode>,

    /// Do not request search grounding for plan steps
    #[arg(long)]
    pub no_grounding: bool,

    /// Generate and print the plan without executing it
    #[arg(long)]
    pub plan_only: bool,

    /// Save all results to this archive when done
    #[arg(long, value_name = "PATH")]
    pub save: Option<PathBuf>,

    /// Load results from an archive and continue the latest unfinished one
    #[arg(long, value_name = "PATH")]
    pub resume: Option<PathBuf>,

    /// Append structured agent events (JSONL) to this file
    #[arg(long, value_name = "PATH")]
    pub event_log: Option<PathBuf>,

    /// Output printed after execution
    #[arg(short, long, value_enum, default_value = "summary")]
    pub output: OutputFormat,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators and streamed text
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

impl Cli {
    /// Archive to write on exit: `--save`, else the `--resume` source.
    pub fn save_path(&self) -> Option<&PathBuf> {
        self.save.as_ref().or(self.resume.as_ref())
    }
}
