//! OpenAI-compatible response shapes

use crate::conversation::Role;
use serde::{Deserialize, Serialize};

/// Model id reported for every composite completion and listed by `/v1/models`
pub const COMPOSITE_MODEL_ID: &str = "trio-1.0";

/// Owner reported by `/v1/models`
pub const MODEL_OWNER: &str = "trio";

/// Response body of `/v1/chat/completions`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    pub id: String,
    pub object: String,
    pub created: u64,
    pub model: String,
    pub choices: Vec<ChatCompletionChoice>,
    pub usage: Usage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionChoice {
    pub index: u32,
    pub message: ResponseMessage,
    pub finish_reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseMessage {
    pub role: Role,
    pub content: String,
}

/// Token usage. Not tracked across composed calls, always zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl ChatCompletionResponse {
    /// Single-choice assistant response with a fresh `trio-<12 hex>` id
    pub fn new(model: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: generate_completion_id(),
            object: "chat.completion".to_string(),
            created: current_timestamp(),
            model: model.into(),
            choices: vec![ChatCompletionChoice {
                index: 0,
                message: ResponseMessage {
                    role: Role::Assistant,
                    content: content.into(),
                },
                finish_reason: "stop".to_string(),
            }],
            usage: Usage::default(),
        }
    }

    /// Text of the first choice
    pub fn content(&self) -> &str {
        self.choices
            .first()
            .map(|c| c.message.content.as_str())
            .unwrap_or_default()
    }
}

/// Response body of `/v1/models`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelList {
    pub object: String,
    pub data: Vec<ModelInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    pub object: String,
    pub created: u64,
    pub owned_by: String,
}

impl ModelList {
    /// The one model this service advertises
    pub fn composite() -> Self {
        Self {
            object: "list".to_string(),
            data: vec![ModelInfo {
                id: COMPOSITE_MODEL_ID.to_string(),
                object: "model".to_string(),
                created: current_timestamp(),
                owned_by: MODEL_OWNER.to_string(),
            }],
        }
    }
}

fn generate_completion_id() -> String {
    let hex = uuid::Uuid::new_v4().simple().to_string();
    format!("trio-{}", &hex[..12])
}

/// Current Unix time in seconds
fn current_timestamp() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
