//! Configuration file loading for trio
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `TRIO_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./trio.toml` or `./.trio.toml`
//! 4. Global: `$XDG_CONFIG_HOME/trio/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigIssue, FileBackendConfig, FileCompositionConfig, FileConfig, FileLoggingConfig,
    FileServerConfig, Severity,
};
pub use loader::ConfigLoader;
