//! Orchestration-layer prompts
//!
//! Each upstream call gets exactly one of these as its leading `system`
//! message. The host application's own system prompt never goes here: it is
//! delivered through the `get_host_system_prompt` tool result instead.

/// What an upstream call is being asked to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptRole {
    /// Answer the user directly
    Member,
    /// Merge the drafts into one better answer
    Synthesizer,
    /// Pick the single best draft by number
    Judge,
    /// Cast an acceptance ballot over the drafts
    Voter,
}

impl PromptRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            PromptRole::Member => "member",
            PromptRole::Synthesizer => "synthesizer",
            PromptRole::Judge => "judge",
            PromptRole::Voter => "voter",
        }
    }

    pub fn system_prompt(&self) -> &'static str {
        match self {
            PromptRole::Member => PromptTemplate::member_system(),
            PromptRole::Synthesizer => PromptTemplate::synthesizer_system(),
            PromptRole::Judge => PromptTemplate::judge_system(),
            PromptRole::Voter => PromptTemplate::voter_system(),
        }
    }
}

impl std::fmt::Display for PromptRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Role prompt texts
pub struct PromptTemplate;

impl PromptTemplate {
    /// System prompt for a member answering the conversation
    pub fn member_system() -> &'static str {
        r#"You are an assistant inside Trio, a system that answers on behalf of host applications.
You have access to a get_host_system_prompt tool that returns the host application's instructions.
Follow those instructions and respond to the user."#
    }

    /// System prompt for a model merging drafts (trio third member, synthesize)
    pub fn synthesizer_system() -> &'static str {
        r#"You are an assistant inside Trio, a system that answers on behalf of host applications.
You have access to:
- get_host_system_prompt: returns the host application's instructions
- get_drafts: returns draft responses written by other assistants in the system

Use both, then respond to the user. Combine the strongest parts of the drafts into a single answer.
Do not mention the drafts or the tools."#
    }

    /// System prompt for a judge picking one draft
    pub fn judge_system() -> &'static str {
        r#"You are evaluating responses inside Trio, a system that answers on behalf of host applications.
You have access to:
- get_host_system_prompt: returns the host application's instructions
- get_drafts: returns numbered candidate responses to the user's latest message

Decide which draft best answers the user, considering accuracy, completeness and helpfulness under the host's instructions.
Reply with just the number of the best draft (1, 2, etc.)."#
    }

    /// System prompt for an acceptance-voting ballot
    pub fn voter_system() -> &'static str {
        r#"You are evaluating responses inside Trio, a system that answers on behalf of host applications.
You have access to:
- get_host_system_prompt: returns the host application's instructions
- get_drafts: returns numbered candidate responses to the user's latest message

Use acceptance voting. First list every draft you find acceptable, meaning it adequately answers the user.
Then pick your preferred draft from the acceptable ones. Be thoughtful but decisive.

Reply in exactly this format:
ACCEPTED: <comma-separated draft numbers, e.g. 1, 3>
PREFERRED: <single draft number>"#
    }
}
