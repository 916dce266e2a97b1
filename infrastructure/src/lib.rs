//! Infrastructure layer for muse-engine
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: the Gemini streaming gateway and plan
//! generator, configuration file loading, the JSONL agent event log and
//! the JSON result archive.

pub mod config;
pub mod gemini;
pub mod logging;
pub mod persistence;

// Re-export commonly used types
pub use config::{
    ConfigLoader, FileAgentConfig, FileConfig, FileGeminiConfig, FileLoggingConfig,
    FileOutputConfig,
};
pub use gemini::{GeminiConfig, GeminiGateway, GeminiPlanGenerator};
pub use logging::JsonlAgentEventLogger;
pub use persistence::{ArchiveError, JsonArchive};
