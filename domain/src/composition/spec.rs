//! Validated composition specs
//!
//! Requests reach these types through [`RawModelRef::validate`](super::RawModelRef::validate),
//! which checks the structural rules: non-empty names, exactly three trio
//! members, a non-empty ensemble and the judge/synthesize model present when
//! the method needs one. Values built by hand skip those checks, so the
//! executor still treats a missing judge/synthesize model as invalid.

use super::method::AggregationMethod;
use crate::conversation::ConversationMessage;

/// Display name used for nested trios in traces
pub const TRIO_DISPLAY_NAME: &str = "trio";
/// Display name used for nested ensembles in traces
pub const ENSEMBLE_DISPLAY_NAME: &str = "ensemble";

/// Reference to a model: a backend name or a composite of members
#[derive(Debug, Clone, PartialEq)]
pub enum ModelRef {
    Named(String),
    Composite(Box<CompositeSpec>),
}

impl ModelRef {
    /// Name shown in traces and logs
    pub fn display_name(&self) -> &str {
        match self {
            ModelRef::Named(name) => name,
            ModelRef::Composite(spec) => spec.display_name(),
        }
    }

    /// Composite nesting depth: 0 for a named model, 1 for a flat composite.
    pub fn depth(&self) -> usize {
        match self {
            ModelRef::Named(_) => 0,
            ModelRef::Composite(spec) => spec.depth(),
        }
    }
}

/// A composite model
#[derive(Debug, Clone, PartialEq)]
pub enum CompositeSpec {
    Trio(TrioSpec),
    Ensemble(EnsembleSpec),
}

impl CompositeSpec {
    pub fn display_name(&self) -> &'static str {
        match self {
            CompositeSpec::Trio(_) => TRIO_DISPLAY_NAME,
            CompositeSpec::Ensemble(_) => ENSEMBLE_DISPLAY_NAME,
        }
    }

    pub fn depth(&self) -> usize {
        let nested = match self {
            CompositeSpec::Trio(trio) => trio.members().iter().map(|m| m.model.depth()).max(),
            CompositeSpec::Ensemble(ensemble) => ensemble
                .members
                .iter()
                .map(|m| &m.model)
                .chain(ensemble.judge_model.as_ref())
                .chain(ensemble.synthesize_model.as_ref())
                .map(ModelRef::depth)
                .max(),
        };
        1 + nested.unwrap_or(0)
    }
}

/// Three members: A and B answer independently, C synthesizes both
#[derive(Debug, Clone, PartialEq)]
pub struct TrioSpec {
    members: [Member; 3],
}

impl TrioSpec {
    pub fn new(a: Member, b: Member, c: Member) -> Self {
        Self { members: [a, b, c] }
    }

    pub fn members(&self) -> &[Member; 3] {
        &self.members
    }

    pub fn a(&self) -> &Member {
        &self.members[0]
    }

    pub fn b(&self) -> &Member {
        &self.members[1]
    }

    pub fn c(&self) -> &Member {
        &self.members[2]
    }
}

/// Ordered members plus the method that aggregates them
#[derive(Debug, Clone, PartialEq)]
pub struct EnsembleSpec {
    pub members: Vec<Member>,
    pub method: AggregationMethod,
    pub judge_model: Option<ModelRef>,
    pub synthesize_model: Option<ModelRef>,
}

/// One member of a composite
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub model: ModelRef,
    /// Per-member seed messages (variance vector), placed before the host layer
    pub seed_messages: Vec<ConversationMessage>,
}

impl Member {
    pub fn new(model: ModelRef) -> Self {
        Self {
            model,
            seed_messages: Vec::new(),
        }
    }

    /// Shorthand for a member backed by a named model
    pub fn named(name: impl Into<String>) -> Self {
        Self::new(ModelRef::Named(name.into()))
    }

    pub fn with_seed_messages(mut self, messages: Vec<ConversationMessage>) -> Self {
        self.seed_messages = messages;
        self
    }
}
