//! Prompt domain
//!
//! Templates for the plan request, agent step prompts and the per-mode
//! framing of a generation call.

pub mod agent;
mod template;

pub use agent::AgentPromptTemplate;
pub use template::PromptTemplate;
