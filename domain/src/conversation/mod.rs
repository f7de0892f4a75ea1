//! Conversation domain.
//!
//! - [`message::ConversationMessage`] - a single chat message (OpenAI wire shape)
//! - [`params::GenerationParams`] - sampling parameters for upstream calls

pub mod message;
pub mod params;

pub use message::{ConversationMessage, Role, ToolCall, ToolCallFunction};
pub use params::GenerationParams;
