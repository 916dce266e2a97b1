//! Interactive prompts for steps awaiting input and paused tasks.
//!
//! ```text
//! ? Step 1 needs your input: Ask the user where to travel
//!   Which city would you like to visit?
//! > Tokyo
//! ```

use colored::Colorize;
use muse_domain::PlanStep;
use std::io::{self, BufRead, Write};

/// Line-based prompt on stdin/stdout.
pub struct StdinInputPrompt;

impl StdinInputPrompt {
    pub fn new() -> Self {
        Self
    }

    /// Ask the step's question on the terminal.
    ///
    /// Returns `None` on end of input.
    pub fn ask(&self, step: &PlanStep) -> io::Result<Option<String>> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        Self::ask_with(&mut stdin.lock(), &mut stdout.lock(), step)
    }

    /// Ask whether to run a paused or stopped task again.
    pub fn confirm_restart(&self, label: &str) -> io::Result<bool> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        Self::confirm_with(&mut stdin.lock(), &mut stdout.lock(), label)
    }

    /// Blank answers are re-asked; the answer is trimmed.
    pub fn ask_with<R: BufRead, W: Write>(
        reader: &mut R,
        writer: &mut W,
        step: &PlanStep,
    ) -> io::Result<Option<String>> {
        let question = step.input_prompt.as_deref().unwrap_or(&step.description);
        writeln!(writer, "  {}", question.cyan())?;
        loop {
            write!(writer, "{} ", ">".cyan().bold())?;
            writer.flush()?;

            let mut line = String::new();
            if reader.read_line(&mut line)? == 0 {
                writeln!(writer)?;
                return Ok(None);
            }
            let answer = line.trim();
            if !answer.is_empty() {
                return Ok(Some(answer.to_string()));
            }
        }
    }

    pub fn confirm_with<R: BufRead, W: Write>(
        reader: &mut R,
        writer: &mut W,
        label: &str,
    ) -> io::Result<bool> {
        write!(writer, "{} [y/N] ", format!("{}?", label).bold())?;
        writer.flush()?;
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            return Ok(false);
        }
        Ok(matches!(line.trim().to_lowercase().as_str(), "y" | "yes"))
    }
}

impl Default for StdinInputPrompt {
    fn default() -> Self {
        Self::new()
    }
}
