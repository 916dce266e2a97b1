//! Progress reporting for plan execution

use crate::config::OutputConfig;
use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use muse_application::AgentProgressNotifier;
use muse_domain::core::string::preview;
use muse_domain::{AgentStatus, AgentTaskState, Citation, PlanStep, ResultId};
use std::io::Write;
use std::sync::Mutex;
use std::time::Duration;

/// Console progress for plan execution.
///
/// Streams step text to stdout as it arrives, or (with streaming off) shows
/// a spinner per step and prints the result once the step completes.
pub struct AgentProgressReporter {
    multi: MultiProgress,
    step_bar: Mutex<Option<ProgressBar>>,
    last_status: Mutex<Option<String>>,
    /// A streamed line is open and needs a newline before other output
    line_open: Mutex<bool>,
    config: OutputConfig,
}

impl AgentProgressReporter {
    pub fn new(config: OutputConfig) -> Self {
        Self {
            multi: MultiProgress::new(),
            step_bar: Mutex::new(None),
            last_status: Mutex::new(None),
            line_open: Mutex::new(false),
            config,
        }
    }

    fn step_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn status_emoji(status: AgentStatus) -> &'static str {
        match status {
            AgentStatus::Idle => "📝",
            AgentStatus::Running => "⚡",
            AgentStatus::Paused => "⏸️",
            AgentStatus::Stopped => "⏹️",
            AgentStatus::Error => "❌",
            AgentStatus::Completed => "🎉",
        }
    }

    /// Print a full line, closing any open streamed line first.
    fn println(&self, line: impl AsRef<str>) {
        self.close_line();
        self.multi.suspend(|| println!("{}", line.as_ref()));
    }

    fn close_line(&self) {
        let mut open = self.line_open.lock().unwrap_or_else(|e| e.into_inner());
        if *open {
            println!();
            *open = false;
        }
    }

    fn finish_bar(&self) {
        if let Some(pb) = self
            .step_bar
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
        {
            pb.finish_and_clear();
        }
    }
}

impl Default for AgentProgressReporter {
    fn default() -> Self {
        Self::new(OutputConfig::default())
    }
}

impl AgentProgressNotifier for AgentProgressReporter {
    fn on_plan_failed(&self, _id: &ResultId, message: &str) {
        self.println(format!("{} {}", "✗ Plan generation failed:".red().bold(), message));
    }

    fn on_status_change(&self, _id: &ResultId, state: &AgentTaskState, status_line: &str) {
        {
            let mut last = self.last_status.lock().unwrap_or_else(|e| e.into_inner());
            if last.as_deref() == Some(status_line) {
                return;
            }
            *last = Some(status_line.to_string());
        }

        let emoji = Self::status_emoji(state.status);
        let line = match state.status {
            AgentStatus::Completed => status_line.green().bold(),
            AgentStatus::Error => status_line.red().bold(),
            AgentStatus::Paused | AgentStatus::Stopped => status_line.yellow(),
            AgentStatus::Idle | AgentStatus::Running => status_line.dimmed(),
        };
        self.println(format!("{} {}", emoji, line));
    }

    fn on_step_start(&self, index: usize, step: &PlanStep) {
        self.finish_bar();
        let prefix = format!("Step {}", index + 1);

        if self.config.stream_text {
            self.println(format!("\n{} {}", format!("▶ {}:", prefix).cyan().bold(), step.description));
            return;
        }
        if self.config.show_progress {
            let pb = self.multi.add(ProgressBar::new_spinner());
            pb.set_style(Self::step_style());
            pb.set_prefix(prefix);
            pb.set_message(preview(&step.description, 60));
            pb.enable_steady_tick(Duration::from_millis(100));
            *self.step_bar.lock().unwrap_or_else(|e| e.into_inner()) = Some(pb);
        }
    }

    fn on_step_fragment(&self, index: usize, text: &str) {
        if self.config.stream_text {
            let mut open = self.line_open.lock().unwrap_or_else(|e| e.into_inner());
            self.multi.suspend(|| {
                print!("{}", text);
                let _ = std::io::stdout().flush();
            });
            *open = !text.ends_with('\n');
        } else if let Some(pb) = self
            .step_bar
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
        {
            pb.set_message(format!("Step {}: {}", index + 1, preview(text, 50)).dimmed().to_string());
        }
    }

    fn on_step_citations(&self, index: usize, citations: &[Citation]) {
        if let Some(pb) = self
            .step_bar
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
        {
            pb.set_prefix(format!("Step {} ({} sources)", index + 1, citations.len()));
        }
    }

    fn on_step_complete(&self, index: usize, step: &PlanStep) {
        self.finish_bar();
        if !self.config.stream_text
            && let Some(result) = step.result.as_deref()
        {
            self.println(format!("\n{} {}", format!("▶ Step {}:", index + 1).cyan().bold(), step.description));
            self.println(result);
        }
        self.println(format!("{} {}", "✓".green(), format!("Step {} complete", index + 1).green()));
    }

    fn on_step_error(&self, index: usize, message: &str) {
        self.finish_bar();
        self.println(format!("{} Step {} failed: {}", "✗".red(), index + 1, message.red()));
    }

    fn on_awaiting_input(&self, index: usize, step: &PlanStep) {
        self.finish_bar();
        self.println(format!(
            "{} Step {} needs your input: {}",
            "?".yellow().bold(),
            index + 1,
            step.description
        ));
    }

    fn on_cancelled(&self, _id: &ResultId) {
        self.finish_bar();
        self.println(format!("{}", "Execution interrupted.".yellow()));
    }
}

/// Simple text-based progress (no spinners, no streaming)
pub struct SimpleAgentProgress;

impl AgentProgressNotifier for SimpleAgentProgress {
    fn on_plan_failed(&self, _id: &ResultId, message: &str) {
        println!("Plan generation failed: {}", message);
    }

    fn on_status_change(&self, _id: &ResultId, _state: &AgentTaskState, status_line: &str) {
        println!("{}", status_line);
    }

    fn on_step_start(&self, index: usize, step: &PlanStep) {
        println!("  → Step {}: {}", index + 1, step.description);
    }

    fn on_step_complete(&self, index: usize, _step: &PlanStep) {
        println!("  ✓ Step {}", index + 1);
    }

    fn on_step_error(&self, index: usize, message: &str) {
        println!("  ✗ Step {}: {}", index + 1, message);
    }
}
