//! Aggregation methods for ensembles
//!
//! The set is closed: dispatch happens with a `match`, never a registry.

use serde::{Deserialize, Serialize};

/// How an ensemble turns its candidates into one response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AggregationMethod {
    /// Every surviving candidate's model votes ACCEPTED/PREFERRED on all drafts
    #[default]
    AcceptanceVoting,
    /// One member chosen uniformly before any generation
    Random,
    /// A dedicated judge model picks the best draft
    Judge,
    /// A dedicated model writes a new answer from all drafts
    Synthesize,
    /// Labeled join of all surviving drafts, no extra calls
    Concat,
}

impl AggregationMethod {
    /// All methods, in wire-documentation order
    pub const ALL: [AggregationMethod; 5] = [
        AggregationMethod::AcceptanceVoting,
        AggregationMethod::Random,
        AggregationMethod::Judge,
        AggregationMethod::Synthesize,
        AggregationMethod::Concat,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AggregationMethod::AcceptanceVoting => "acceptance_voting",
            AggregationMethod::Random => "random",
            AggregationMethod::Judge => "judge",
            AggregationMethod::Synthesize => "synthesize",
            AggregationMethod::Concat => "concat",
        }
    }

    /// Whether the method has a single winning candidate
    pub fn selects_winner(&self) -> bool {
        !matches!(
            self,
            AggregationMethod::Synthesize | AggregationMethod::Concat
        )
    }

    /// Number of upstream calls for an ensemble of `members` named models
    /// when nothing fails.
    pub fn expected_calls(&self, members: usize) -> usize {
        match self {
            AggregationMethod::AcceptanceVoting => members * 2,
            AggregationMethod::Random => 1,
            AggregationMethod::Judge | AggregationMethod::Synthesize => members + 1,
            AggregationMethod::Concat => members,
        }
    }
}

impl std::fmt::Display for AggregationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AggregationMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AggregationMethod::ALL
            .into_iter()
            .find(|m| m.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| {
                format!(
                    "Unknown aggregation method '{}'. Valid: {}",
                    s,
                    AggregationMethod::ALL
                        .iter()
                        .map(|m| m.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            })
    }
}
