//! Aggregation domain
//!
//! Pure pieces of the aggregation engine: ballot/verdict parsing, vote
//! tallies, and the result and trace types. The calls that produce the
//! inputs live in the application layer.

pub mod outcome;
pub mod parsing;
pub mod vote;

pub use outcome::{
    AggregationOutcome, CandidateStatus, CandidateSummary, CompletionDetails, GenerationResult,
    TrioDetails, concat_responses,
};
pub use parsing::{parse_ballot, parse_judge_choice};
pub use vote::{Ballot, VoteTally, pick_winner, tally};
