//! Prompt domain
//!
//! Role prompts and the host-aware layering that builds every upstream
//! message sequence.

pub mod layering;
mod template;

pub use layering::{build_layered_messages, format_drafts, split_host_prompt};
pub use template::{PromptRole, PromptTemplate};
