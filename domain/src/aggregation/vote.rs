//! Acceptance voting primitives

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One voter's parsed verdict, as 0-based indices into the voted drafts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ballot {
    pub accepted: BTreeSet<usize>,
    /// Always a member of `accepted` when present
    pub preferred: Option<usize>,
}

impl Ballot {
    /// A ballot that counts for nothing (failed or malformed vote)
    pub fn abstain() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.accepted.is_empty() && self.preferred.is_none()
    }
}

/// Accumulated votes for one candidate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTally {
    pub accepted: u32,
    pub preferred: u32,
}

/// Count ballots over `candidates` drafts.
///
/// Indices outside the candidate range are ignored.
pub fn tally(ballots: &[Ballot], candidates: usize) -> Vec<VoteTally> {
    let mut tallies = vec![VoteTally::default(); candidates];
    for ballot in ballots {
        for &index in &ballot.accepted {
            if let Some(t) = tallies.get_mut(index) {
                t.accepted += 1;
            }
        }
        if let Some(index) = ballot.preferred
            && let Some(t) = tallies.get_mut(index)
        {
            t.preferred += 1;
        }
    }
    tallies
}

/// Winner by accepted count, then preferred count, then lowest index.
///
/// ```
/// use trio_domain::aggregation::{VoteTally, pick_winner};
///
/// let tallies = [
///     VoteTally { accepted: 2, preferred: 0 },
///     VoteTally { accepted: 2, preferred: 1 },
///     VoteTally { accepted: 1, preferred: 1 },
/// ];
/// assert_eq!(pick_winner(&tallies), Some(1));
/// assert_eq!(pick_winner(&[]), None);
/// ```
pub fn pick_winner(tallies: &[VoteTally]) -> Option<usize> {
    tallies
        .iter()
        .enumerate()
        .max_by(|(ia, a), (ib, b)| {
            (a.accepted, a.preferred)
                .cmp(&(b.accepted, b.preferred))
                .then(ib.cmp(ia))
        })
        .map(|(index, _)| index)
}
