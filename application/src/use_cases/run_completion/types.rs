//! Type definitions for the RunCompletion use case.

use crate::ports::completion_client::CompletionError;
use trio_domain::{
    ChatCompletionResponse, CompletionDetails, ConversationMessage, DomainError, GenerationParams,
    RawModelRef,
};
use thiserror::Error;

/// Errors that can occur while producing a completion
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RunCompletionError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Upstream call failed: {0}")]
    Completion(#[from] CompletionError),
}

impl RunCompletionError {
    /// Whether the request itself was at fault (maps to a 4xx)
    pub fn is_client_error(&self) -> bool {
        matches!(self, RunCompletionError::Domain(e) if e.is_client_error())
    }

    /// Whether the failure was a pass-through call timing out
    pub fn is_timeout(&self) -> bool {
        matches!(self, RunCompletionError::Completion(CompletionError::Timeout))
    }

    /// Errors that abort the whole request even inside a member branch
    pub(super) fn is_fatal(&self) -> bool {
        matches!(
            self,
            RunCompletionError::Domain(DomainError::CompositionTooDeep { .. })
        )
    }
}

/// Input for the RunCompletion use case
#[derive(Debug, Clone)]
pub struct RunCompletionInput {
    /// Raw `model` field: a backend name or a composite spec
    pub model: RawModelRef,
    /// Conversation as sent by the host application
    pub messages: Vec<ConversationMessage>,
    pub params: GenerationParams,
}

impl RunCompletionInput {
    pub fn new(model: RawModelRef, messages: Vec<ConversationMessage>) -> Self {
        Self {
            model,
            messages,
            params: GenerationParams::default(),
        }
    }

    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }
}

/// Output of the RunCompletion use case
#[derive(Debug, Clone)]
pub struct RunCompletionOutput {
    pub response: ChatCompletionResponse,
    /// Trace of a composite run; `None` for pass-through
    pub details: Option<CompletionDetails>,
}
