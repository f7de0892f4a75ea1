//! Host-aware message layering
//!
//! Every upstream call sees three layers kept apart:
//!
//! ```text
//! system      orchestration role prompt
//! ...         member seed messages
//! assistant   tool_calls: get_host_system_prompt (hsp)
//! tool (hsp)  <host system prompt, or empty>
//! ...         remaining conversation, original order
//! assistant   tool_calls: get_drafts (drafts)        } only when drafts
//! tool        Draft 1:\n..\n\nDraft 2:\n..            } are supplied
//! ```

use super::template::PromptRole;
use crate::conversation::ConversationMessage;

pub const HOST_PROMPT_TOOL: &str = "get_host_system_prompt";
pub const HOST_PROMPT_CALL_ID: &str = "hsp";
pub const DRAFTS_TOOL: &str = "get_drafts";
pub const DRAFTS_CALL_ID: &str = "drafts";

/// Stand-in text for a draft whose producer failed
pub const MISSING_DRAFT: &str = "(no response)";

/// Split off the host system prompt.
///
/// Only a *leading* `system` message counts as the host prompt; any later
/// system messages stay in the returned tail untouched.
pub fn split_host_prompt(messages: &[ConversationMessage]) -> (&str, &[ConversationMessage]) {
    match messages.split_first() {
        Some((first, rest)) if first.is_system() => (first.text(), rest),
        _ => ("", messages),
    }
}

/// Render drafts as the `get_drafts` tool result body
pub fn format_drafts<S: AsRef<str>>(drafts: &[S]) -> String {
    drafts
        .iter()
        .enumerate()
        .map(|(i, draft)| format!("Draft {}:\n{}", i + 1, draft.as_ref()))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Build the message sequence for one upstream call.
///
/// Pure: identical inputs always yield an identical sequence.
pub fn build_layered_messages<S: AsRef<str>>(
    incoming: &[ConversationMessage],
    role: PromptRole,
    seeds: &[ConversationMessage],
    drafts: Option<&[S]>,
) -> Vec<ConversationMessage> {
    let (host_prompt, tail) = split_host_prompt(incoming);

    let mut messages = Vec::with_capacity(seeds.len() + tail.len() + 5);
    messages.push(ConversationMessage::system(role.system_prompt()));
    messages.extend_from_slice(seeds);
    messages.push(ConversationMessage::tool_invocation(
        HOST_PROMPT_CALL_ID,
        HOST_PROMPT_TOOL,
    ));
    messages.push(ConversationMessage::tool_result(
        HOST_PROMPT_CALL_ID,
        host_prompt,
    ));
    messages.extend_from_slice(tail);

    if let Some(drafts) = drafts {
        messages.push(ConversationMessage::tool_invocation(
            DRAFTS_CALL_ID,
            DRAFTS_TOOL,
        ));
        messages.push(ConversationMessage::tool_result(
            DRAFTS_CALL_ID,
            format_drafts(drafts),
        ));
    }

    messages
}
