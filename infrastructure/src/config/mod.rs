//! Configuration file loading for muse-engine
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `MUSE_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./muse.toml` or `./.muse.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/muse-engine/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    API_KEY_ENV_VARS, FileAgentConfig, FileConfig, FileGeminiConfig, FileLoggingConfig,
    FileOutputConfig,
};
pub use loader::ConfigLoader;
