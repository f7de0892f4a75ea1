//! Infrastructure layer for trio
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: the HTTP completion backend, configuration
//! file loading and the JSONL trace logger.

pub mod backend;
pub mod config;
pub mod logging;

// Re-export commonly used types
pub use backend::{BackendError, OpenAiCompatibleClient};
pub use config::{
    ConfigIssue, ConfigLoader, FileBackendConfig, FileCompositionConfig, FileConfig,
    FileLoggingConfig, FileServerConfig, Severity,
};
pub use logging::JsonlConversationLogger;
