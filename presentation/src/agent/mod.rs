//! Agent presentation components
//!
//! - Progress reporting for plan execution
//! - Terminal prompts for input-gated steps

pub mod input;
pub mod progress;

pub use input::StdinInputPrompt;
pub use progress::{AgentProgressReporter, SimpleAgentProgress};
