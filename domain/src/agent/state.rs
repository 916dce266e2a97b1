//! Task-level state register for one agent request.
//!
//! [`AgentTaskState`] holds the task status and the step cursor. Status
//! changes come only from user commands ([`AgentCommand`]) and from the
//! executor's own observations (step completion, input gate, stream error).

use serde::{Deserialize, Serialize};

/// Status of an agent task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    /// Plan generated (or pending), not started
    #[default]
    Idle,
    Running,
    Paused,
    /// Stopped by the user
    Stopped,
    Error,
    Completed,
}

impl AgentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentStatus::Idle => "idle",
            AgentStatus::Running => "running",
            AgentStatus::Paused => "paused",
            AgentStatus::Stopped => "stopped",
            AgentStatus::Error => "error",
            AgentStatus::Completed => "completed",
        }
    }
}

impl std::fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why a task is paused.
///
/// Executor-initiated pauses (input gate, unfinished plan) resume in place
/// on the next `start`; a user-issued pause freezes the in-flight step and
/// the next `start` restarts the plan from the beginning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PauseCause {
    /// A step is waiting for a user answer
    AwaitingInput,
    /// The loop halted before every step completed
    Incomplete,
    /// The user issued `pause`
    User,
}

/// User command for an agent task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentCommand {
    Start,
    Pause,
    Stop,
}

impl AgentCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentCommand::Start => "start",
            AgentCommand::Pause => "pause",
            AgentCommand::Stop => "stop",
        }
    }
}

impl std::fmt::Display for AgentCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a `start` command proceeds from the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartMode {
    /// Continue at the stored cursor without touching earlier steps
    Resume(usize),
    /// Reset every step and begin at step 0
    Restart,
}

/// Status register plus step cursor (Entity state of one task).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AgentTaskState {
    pub status: AgentStatus,
    /// Cursor into the plan; meaningful while running or paused.
    #[serde(default)]
    pub current_step_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pause_cause: Option<PauseCause>,
}

impl AgentTaskState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.status == AgentStatus::Running
    }

    /// Whether `command` is offered in the current status.
    pub fn allows(&self, command: AgentCommand) -> bool {
        match command {
            AgentCommand::Start => self.status != AgentStatus::Running,
            AgentCommand::Pause => self.status == AgentStatus::Running,
            AgentCommand::Stop => {
                matches!(self.status, AgentStatus::Running | AgentStatus::Paused)
            }
        }
    }

    /// Decide how `start` proceeds. `None` if the task is already running.
    pub fn start_mode(&self) -> Option<StartMode> {
        match (self.status, self.pause_cause) {
            (AgentStatus::Running, _) => None,
            (AgentStatus::Paused, Some(PauseCause::User)) => Some(StartMode::Restart),
            (AgentStatus::Paused, _) => Some(StartMode::Resume(self.current_step_index)),
            _ => Some(StartMode::Restart),
        }
    }

    /// Enter `running` at `index`.
    pub fn run_from(&mut self, index: usize) {
        self.status = AgentStatus::Running;
        self.current_step_index = index;
        self.pause_cause = None;
    }

    pub fn pause_at(&mut self, index: usize, cause: PauseCause) {
        self.status = AgentStatus::Paused;
        self.current_step_index = index;
        self.pause_cause = Some(cause);
    }

    /// User-issued pause; the cursor is left where the executor put it.
    pub fn pause_by_user(&mut self) {
        self.status = AgentStatus::Paused;
        self.pause_cause = Some(PauseCause::User);
    }

    pub fn stop(&mut self) {
        self.status = AgentStatus::Stopped;
        self.pause_cause = None;
    }

    pub fn fail(&mut self) {
        self.status = AgentStatus::Error;
        self.pause_cause = None;
    }

    pub fn complete(&mut self) {
        self.status = AgentStatus::Completed;
        self.pause_cause = None;
    }

    /// An explicit stop/pause/error is already recorded and must survive
    /// loop finalization.
    pub fn is_settled(&self) -> bool {
        matches!(self.status, AgentStatus::Stopped | AgentStatus::Error)
            || self.pause_cause == Some(PauseCause::User)
    }

    /// One-line status text for a plan of `plan_len` steps.
    pub fn status_line(&self, plan_len: usize) -> String {
        let step_number = self
            .current_step_index
            .saturating_add(1)
            .min(plan_len.max(1));
        match self.status {
            AgentStatus::Idle => "Plan generated. Ready to start.".to_string(),
            AgentStatus::Running => {
                format!("Executing step {} of {}...", step_number, plan_len)
            }
            AgentStatus::Paused => format!("Paused at step {} of {}.", step_number, plan_len),
            AgentStatus::Stopped => "Execution stopped by user.".to_string(),
            AgentStatus::Error => format!("Error on step {}. Execution halted.", step_number),
            AgentStatus::Completed => "Execution completed successfully.".to_string(),
        }
    }

    /// Label for the start affordance.
    pub fn start_label(&self) -> &'static str {
        match self.start_mode() {
            Some(StartMode::Resume(_)) => "Resume",
            Some(StartMode::Restart) if self.status != AgentStatus::Idle => "Restart",
            _ => "Start Execution",
        }
    }
}
