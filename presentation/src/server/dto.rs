//! Request bodies of the HTTP API

use serde::Deserialize;
use trio_application::RunCompletionInput;
use trio_domain::{ConversationMessage, GenerationParams, RawModelRef};

/// Body of `POST /v1/chat/completions`
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionRequest {
    /// Backend model name or composite spec
    pub model: RawModelRef,
    pub messages: Vec<ConversationMessage>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub temperature: Option<f32>,
    /// Accepted for compatibility; `true` is answered with 501
    #[serde(default)]
    pub stream: bool,
}

impl ChatCompletionRequest {
    pub fn params(&self) -> GenerationParams {
        let defaults = GenerationParams::default();
        GenerationParams {
            max_tokens: self.max_tokens.unwrap_or(defaults.max_tokens),
            temperature: self.temperature.unwrap_or(defaults.temperature),
        }
    }

    pub fn into_input(self) -> RunCompletionInput {
        let params = self.params();
        RunCompletionInput::new(self.model, self.messages).with_params(params)
    }
}
