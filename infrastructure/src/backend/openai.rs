//! OpenAI-compatible chat-completions adapter

use super::error::BackendError;
use crate::config::FileBackendConfig;
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};
use trio_application::ports::completion_client::{CompletionClient, CompletionError};
use trio_domain::core::string::truncate;
use trio_domain::{ConversationMessage, GenerationParams};

/// Longest error body kept in a [`CompletionError::Upstream`]
const MAX_ERROR_BODY: usize = 500;

/// HTTP client for `<base_url>/v1/chat/completions`
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleClient {
    client: reqwest::Client,
    endpoint: String,
}

impl OpenAiCompatibleClient {
    pub fn new(
        base_url: &str,
        api_key: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, BackendError> {
        let base_url = base_url.trim().trim_end_matches('/');
        reqwest::Url::parse(base_url).map_err(|e| BackendError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        let mut headers = HeaderMap::new();
        if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", key.trim()))
                .map_err(|e| BackendError::InvalidApiKey(e.to_string()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/v1/chat/completions", base_url),
        })
    }

    pub fn from_config(config: &FileBackendConfig) -> Result<Self, BackendError> {
        Self::new(&config.url, config.api_key.as_deref(), config.timeout())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ConversationMessage],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl ChatResponse {
    fn into_text(self) -> Result<String, CompletionError> {
        let content = self
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .map(|text| text.trim().to_string())
            .unwrap_or_default();

        if content.is_empty() {
            return Err(CompletionError::InvalidResponse(
                "response carried no message content".to_string(),
            ));
        }
        Ok(content)
    }
}

fn request_error(e: reqwest::Error) -> CompletionError {
    if e.is_timeout() {
        CompletionError::Timeout
    } else {
        CompletionError::Network(e.to_string())
    }
}

#[async_trait]
impl CompletionClient for OpenAiCompatibleClient {
    async fn complete(
        &self,
        model: &str,
        messages: &[ConversationMessage],
        params: &GenerationParams,
    ) -> Result<String, CompletionError> {
        debug!("POST {} model={} ({} messages)", self.endpoint, model, messages.len());

        let response = self
            .client
            .post(&self.endpoint)
            .json(&ChatRequest {
                model,
                messages,
                max_tokens: params.max_tokens,
                temperature: params.temperature,
            })
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Backend returned {} for model {}", status, model);
            return Err(CompletionError::Upstream {
                status: status.as_u16(),
                body: truncate(&body, MAX_ERROR_BODY),
            });
        }

        let bytes = response.bytes().await.map_err(request_error)?;
        let parsed: ChatResponse = serde_json::from_slice(&bytes)
            .map_err(|e| CompletionError::InvalidResponse(e.to_string()))?;
        parsed.into_text()
    }
}
