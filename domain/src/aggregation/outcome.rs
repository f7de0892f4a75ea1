//! Generation results and the trace payload
//!
//! - [`GenerationResult`] - one member's output (or failure)
//! - [`CandidateSummary`] - a member as it appears in the trace
//! - [`AggregationOutcome`] - how an ensemble reached its answer
//! - [`TrioDetails`] - how a trio reached its answer
//! - [`CompletionDetails`] - either of the above, sent as `X-Trio-Details`

use super::vote::VoteTally;
use crate::composition::AggregationMethod;
use serde::{Deserialize, Serialize};

/// Output of resolving one member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    /// Original position among its siblings
    pub index: usize,
    /// Backend name, or `trio`/`ensemble` for nested composites
    pub model: String,
    /// Generated text, empty on failure
    pub content: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GenerationResult {
    pub fn success(index: usize, model: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            index,
            model: model.into(),
            content: content.into(),
            success: true,
            error: None,
        }
    }

    pub fn failure(index: usize, model: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            index,
            model: model.into(),
            content: String::new(),
            success: false,
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }
}

/// Status of a candidate in the trace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateStatus {
    Ok,
    Failed,
    /// Never generated (not picked by random pre-selection)
    Skipped,
}

/// One member as recorded in the trace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateSummary {
    pub model: String,
    pub response: String,
    pub status: CandidateStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accepted: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred: Option<u32>,
}

impl CandidateSummary {
    pub fn skipped(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            response: String::new(),
            status: CandidateStatus::Skipped,
            error: None,
            accepted: None,
            preferred: None,
        }
    }

    pub fn with_votes(mut self, tally: VoteTally) -> Self {
        self.accepted = Some(tally.accepted);
        self.preferred = Some(tally.preferred);
        self
    }
}

impl From<&GenerationResult> for CandidateSummary {
    fn from(result: &GenerationResult) -> Self {
        Self {
            model: result.model.clone(),
            response: result.content.clone(),
            status: if result.success {
                CandidateStatus::Ok
            } else {
                CandidateStatus::Failed
            },
            error: result.error.clone(),
            accepted: None,
            preferred: None,
        }
    }
}

/// How an ensemble produced its final text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationOutcome {
    /// Original member index of the winner; `None` when no single candidate
    /// won (concat, successful synthesize)
    pub winner_index: Option<usize>,
    /// One entry per member, in member order
    pub candidates: Vec<CandidateSummary>,
    pub aggregation_method: AggregationMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<String>,
}

impl AggregationOutcome {
    pub fn new(
        aggregation_method: AggregationMethod,
        winner_index: Option<usize>,
        candidates: Vec<CandidateSummary>,
    ) -> Self {
        Self {
            winner_index,
            candidates,
            aggregation_method,
            fallback: None,
        }
    }

    pub fn with_fallback(mut self, note: impl Into<String>) -> Self {
        self.fallback = Some(note.into());
        self
    }
}

/// How a trio produced its final text
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrioDetails {
    pub response_a: String,
    pub response_b: String,
    pub model_a: String,
    pub model_b: String,
    pub model_c: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_a: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_b: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<String>,
}

/// Trace of a composite completion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CompletionDetails {
    Ensemble(AggregationOutcome),
    Trio(TrioDetails),
}

impl CompletionDetails {
    /// Compact JSON for the `X-Trio-Details` header.
    ///
    /// Non-ASCII characters and DEL are written as `\uXXXX` escapes so the
    /// value is a valid header on every HTTP stack.
    pub fn to_header_value(&self) -> Result<String, serde_json::Error> {
        let json = serde_json::to_string(self)?;
        if json.bytes().all(|b| b.is_ascii() && b != 0x7f) {
            return Ok(json);
        }

        let mut escaped = String::with_capacity(json.len() + 16);
        let mut units = [0u16; 2];
        for c in json.chars() {
            if c.is_ascii() && c != '\u{7f}' {
                escaped.push(c);
            } else {
                for unit in c.encode_utf16(&mut units) {
                    escaped.push_str(&format!("\\u{:04x}", unit));
                }
            }
        }
        Ok(escaped)
    }
}

/// Labeled join of successful results, in the order given
///
/// ```
/// use trio_domain::aggregation::{GenerationResult, concat_responses};
///
/// let results = [
///     GenerationResult::success(0, "a", "X"),
///     GenerationResult::failure(1, "b", "timeout"),
///     GenerationResult::success(2, "c", "Z"),
/// ];
/// assert_eq!(
///     concat_responses(&results),
///     "### Response 1 (a)\nX\n\n### Response 3 (c)\nZ"
/// );
/// ```
pub fn concat_responses(results: &[GenerationResult]) -> String {
    results
        .iter()
        .filter(|r| r.success)
        .map(|r| format!("### Response {} ({})\n{}", r.index + 1, r.model, r.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}
