//! Domain layer for trio
//!
//! This crate contains the core orchestration logic, entities, and value
//! objects. It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Composition
//!
//! A request's `model` is either a backend model name (pass-through) or a
//! composite of members that may nest recursively:
//!
//! - **Trio**: A and B answer independently, C synthesizes their drafts
//! - **Ensemble**: N members answer, an [`AggregationMethod`] picks or builds
//!   the final text
//!
//! ## Host-aware layering
//!
//! Every upstream call keeps the orchestration prompt, the member's seed
//! messages and the host application's system prompt in separate layers
//! (see [`prompt::layering`]).
//!
//! ## Aggregation
//!
//! Ballot and verdict parsing, vote tallies and the trace payload sent back in
//! the `X-Trio-Details` header (see [`aggregation`]).

pub mod aggregation;
pub mod completion;
pub mod composition;
pub mod conversation;
pub mod core;
pub mod prompt;

// Re-export commonly used types
pub use aggregation::{
    AggregationOutcome, Ballot, CandidateStatus, CandidateSummary, CompletionDetails,
    GenerationResult, TrioDetails, VoteTally,
};
pub use completion::{COMPOSITE_MODEL_ID, ChatCompletionResponse, ModelList};
pub use composition::{
    AggregationMethod, CompositeSpec, EnsembleSpec, Member, ModelRef, RawCompositeSpec, RawMember,
    RawModelRef, TrioSpec,
};
pub use conversation::{ConversationMessage, GenerationParams, Role, ToolCall, ToolCallFunction};
pub use core::error::DomainError;
pub use prompt::{PromptRole, PromptTemplate, build_layered_messages, format_drafts};
