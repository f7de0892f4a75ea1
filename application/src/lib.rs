//! Application layer for trio
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::ExecutionParams;
pub use ports::{
    completion_client::{CompletionClient, CompletionError},
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
};
pub use use_cases::run_completion::{
    RunCompletionError, RunCompletionInput, RunCompletionOutput, RunCompletionUseCase,
};
