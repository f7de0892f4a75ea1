//! Upstream completion backend.
//!
//! [`OpenAiCompatibleClient`] implements the
//! [`CompletionClient`](trio_application::CompletionClient) port against any
//! service speaking the OpenAI chat-completions protocol (LiteLLM, vLLM,
//! OpenAI itself).

mod error;
mod openai;

pub use error::BackendError;
pub use openai::OpenAiCompatibleClient;
