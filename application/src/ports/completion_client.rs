//! Completion client port
//!
//! Defines the interface for calling an upstream chat-completion backend.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use trio_domain::{ConversationMessage, GenerationParams};

/// Errors that can occur during a single upstream completion call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompletionError {
    #[error("Timeout")]
    Timeout,

    #[error("Upstream returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Client for one upstream chat-completion call
///
/// This port defines how the application layer reaches model backends.
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send `messages` to `model` and return the assistant text
    async fn complete(
        &self,
        model: &str,
        messages: &[ConversationMessage],
        params: &GenerationParams,
    ) -> Result<String, CompletionError>;
}

#[async_trait]
impl<T: CompletionClient + ?Sized> CompletionClient for Arc<T> {
    async fn complete(
        &self,
        model: &str,
        messages: &[ConversationMessage],
        params: &GenerationParams,
    ) -> Result<String, CompletionError> {
        (**self).complete(model, messages, params).await
    }
}
