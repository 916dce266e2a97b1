//! Gemini REST adapters.
//!
//! - [`GeminiGateway`]: streaming step execution (`streamGenerateContent`, SSE)
//! - [`GeminiPlanGenerator`]: schema-constrained plan generation
//!   (`generateContent`)

pub mod config;
pub mod error;
pub mod gateway;
pub mod planner;
pub mod protocol;
pub mod sse;

#[cfg(test)]
pub(crate) mod test_server;

pub use config::GeminiConfig;
pub use gateway::GeminiGateway;
pub use planner::{GeminiPlanGenerator, parse_plan};
