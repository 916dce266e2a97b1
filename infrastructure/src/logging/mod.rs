//! Logging infrastructure: structured agent event logging.
//!
//! Provides [`JsonlAgentEventLogger`], a JSONL file writer that implements
//! the [`AgentEventLogger`](muse_application::AgentEventLogger) port.

mod jsonl_logger;

pub use jsonl_logger::JsonlAgentEventLogger;
