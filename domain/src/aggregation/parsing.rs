//! Ballot and verdict parsing.
//!
//! Pure text matching over free-form model output. Nothing here fails:
//! output that cannot be understood yields an empty ballot or no choice,
//! and the caller applies the method's fallback.
//!
//! | Function | Used by | Expected shape |
//! |----------|---------|----------------|
//! | [`parse_ballot`] | acceptance voting | `ACCEPTED: 1, 3` / `PREFERRED: 3` |
//! | [`parse_judge_choice`] | judge | a draft number anywhere in the text |
//!
//! Numbers are 1-based draft labels on the wire and 0-based indices in the
//! returned values.

use super::vote::Ballot;

const ACCEPTED_LABEL: &str = "ACCEPTED:";
const PREFERRED_LABEL: &str = "PREFERRED:";

/// Parse an acceptance ballot over `draft_count` drafts.
///
/// Out-of-range numbers are dropped. The preferred draft only counts when it
/// is also accepted.
///
/// ```
/// use trio_domain::aggregation::parse_ballot;
///
/// let ballot = parse_ballot("ACCEPTED: 1, 3\nPREFERRED: 3", 3);
/// assert_eq!(ballot.accepted.iter().copied().collect::<Vec<_>>(), vec![0, 2]);
/// assert_eq!(ballot.preferred, Some(2));
///
/// assert!(parse_ballot("I like them all", 3).is_empty());
/// ```
pub fn parse_ballot(response: &str, draft_count: usize) -> Ballot {
    let mut ballot = Ballot::default();

    if let Some(rest) = after_label(response, ACCEPTED_LABEL) {
        let line = rest.lines().next().unwrap_or_default();
        ballot.accepted = numbers(line)
            .filter_map(|n| to_index(n, draft_count))
            .collect();
    }

    if let Some(rest) = after_label(response, PREFERRED_LABEL)
        && let Some(n) = leading_number(rest.trim_start())
        && let Some(index) = to_index(n, draft_count)
        && ballot.accepted.contains(&index)
    {
        ballot.preferred = Some(index);
    }

    ballot
}

/// Parse a judge verdict over `draft_count` drafts.
///
/// Takes the first number in the text that names an existing draft.
///
/// ```
/// use trio_domain::aggregation::parse_judge_choice;
///
/// assert_eq!(parse_judge_choice("2", 3), Some(1));
/// assert_eq!(parse_judge_choice("Draft 3 is best.", 3), Some(2));
/// assert_eq!(parse_judge_choice("None of them", 3), None);
/// ```
pub fn parse_judge_choice(response: &str, draft_count: usize) -> Option<usize> {
    numbers(response).find_map(|n| to_index(n, draft_count))
}

/// Text following the first case-insensitive occurrence of `label`
fn after_label<'a>(text: &'a str, label: &str) -> Option<&'a str> {
    // ASCII uppercasing keeps byte offsets aligned with `text`
    let upper = text.to_ascii_uppercase();
    upper.find(label).map(|pos| &text[pos + label.len()..])
}

/// All unsigned integers appearing in `text`, in order
fn numbers(text: &str) -> impl Iterator<Item = usize> + '_ {
    text.split(|c: char| !c.is_ascii_digit())
        .filter(|run| !run.is_empty())
        .filter_map(|run| run.parse().ok())
}

fn leading_number(text: &str) -> Option<usize> {
    let end = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());
    text[..end].parse().ok()
}

/// Convert a 1-based label into a 0-based index when it names a draft
fn to_index(label: usize, draft_count: usize) -> Option<usize> {
    (1..=draft_count).contains(&label).then(|| label - 1)
}
