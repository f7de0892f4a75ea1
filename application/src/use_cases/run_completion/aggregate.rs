//! Ensemble resolution and aggregation.
//!
//! | Method | Upstream calls (N named members, no failures) | Winner |
//! |--------|-----------------------------------------------|--------|
//! | `acceptance_voting` | N drafts + N ballots | most accepted, then preferred, then lowest index |
//! | `random` | 1 (picked before any call) | the picked member |
//! | `judge` | N drafts + 1 verdict | the judged draft |
//! | `synthesize` | N drafts + 1 synthesis | none |
//! | `concat` | N drafts | none |

use super::generate::Layer;
use super::{RunCompletionError, RunCompletionUseCase};
use crate::ports::completion_client::CompletionClient;
use crate::ports::conversation_logger::ConversationEvent;
use futures::future::join_all;
use rand::Rng;
use tracing::{debug, info, warn};
use trio_domain::aggregation::{
    concat_responses, parse_ballot, parse_judge_choice, pick_winner, tally,
};
use trio_domain::core::string::preview;
use trio_domain::{
    AggregationMethod, AggregationOutcome, Ballot, CandidateSummary, CompletionDetails,
    DomainError, EnsembleSpec, GenerationResult, Member, ModelRef, PromptRole,
};

type Aggregated = (String, AggregationOutcome);

impl<C: CompletionClient + 'static> RunCompletionUseCase<C> {
    pub(super) async fn run_ensemble(
        &self,
        ensemble: &EnsembleSpec,
        layer: Layer<'_>,
    ) -> Result<(String, CompletionDetails), RunCompletionError> {
        let method = ensemble.method;
        debug!(
            "[{}] Ensemble: {} members, {}",
            layer.depth,
            ensemble.members.len(),
            method
        );

        let (text, outcome) = match method {
            AggregationMethod::Random => self.aggregate_random(ensemble, &layer).await?,
            AggregationMethod::AcceptanceVoting => {
                let results = self.generate_all(&ensemble.members, &layer).await?;
                self.aggregate_voting(ensemble, results, &layer).await?
            }
            AggregationMethod::Judge => {
                let judge = required_model(&ensemble.judge_model, "judge_model")?;
                let results = self.generate_all(&ensemble.members, &layer).await?;
                self.aggregate_judge(judge, results, &layer).await?
            }
            AggregationMethod::Synthesize => {
                let synthesizer = required_model(&ensemble.synthesize_model, "synthesize_model")?;
                let results = self.generate_all(&ensemble.members, &layer).await?;
                self.aggregate_synthesis(synthesizer, results, &layer).await?
            }
            AggregationMethod::Concat => {
                let results = self.generate_all(&ensemble.members, &layer).await?;
                let outcome = AggregationOutcome::new(method, None, summaries(&results));
                (concat_responses(&results), outcome)
            }
        };

        info!(
            "[{}] Ensemble aggregated with {}: winner {:?}{}",
            layer.depth,
            method,
            outcome.winner_index,
            outcome
                .fallback
                .as_deref()
                .map(|f| format!(" (fallback: {})", f))
                .unwrap_or_default()
        );
        self.conversation_logger.log(ConversationEvent::new(
            "aggregation_completed",
            serde_json::json!({
                "depth": layer.depth,
                "method": method.as_str(),
                "winner_index": outcome.winner_index,
                "fallback": outcome.fallback,
            }),
        ));

        Ok((text, CompletionDetails::Ensemble(outcome)))
    }

    /// Generate every member concurrently, keeping member order.
    ///
    /// Fails with `AllMembersFailed` when nothing survives.
    async fn generate_all(
        &self,
        members: &[Member],
        layer: &Layer<'_>,
    ) -> Result<Vec<GenerationResult>, RunCompletionError> {
        let results = join_all(
            members
                .iter()
                .enumerate()
                .map(|(i, member)| self.generate_member(i, member, layer)),
        )
        .await
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;

        if !results.iter().any(GenerationResult::is_success) {
            return Err(all_failed(&results));
        }
        Ok(results)
    }

    async fn aggregate_random(
        &self,
        ensemble: &EnsembleSpec,
        layer: &Layer<'_>,
    ) -> Result<Aggregated, RunCompletionError> {
        let chosen = rand::rng().random_range(0..ensemble.members.len());
        debug!("[{}] Random pre-selection picked member {}", layer.depth, chosen);

        let result = self
            .generate_member(chosen, &ensemble.members[chosen], layer)
            .await?;
        if !result.success {
            return Err(all_failed(std::slice::from_ref(&result)));
        }

        let candidates = ensemble
            .members
            .iter()
            .enumerate()
            .map(|(i, member)| {
                if i == chosen {
                    CandidateSummary::from(&result)
                } else {
                    CandidateSummary::skipped(member.model.display_name())
                }
            })
            .collect();

        Ok((
            result.content,
            AggregationOutcome::new(AggregationMethod::Random, Some(chosen), candidates),
        ))
    }

    /// Every surviving candidate's model votes once on all surviving drafts.
    async fn aggregate_voting(
        &self,
        ensemble: &EnsembleSpec,
        results: Vec<GenerationResult>,
        layer: &Layer<'_>,
    ) -> Result<Aggregated, RunCompletionError> {
        let survivors = survivors(&results);
        let voter_layer = layer.with_drafts(PromptRole::Voter, drafts(&survivors));

        let ballots = join_all(survivors.iter().map(|r| {
            self.cast_ballot(&ensemble.members[r.index].model, survivors.len(), &voter_layer)
        }))
        .await
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;

        let tallies = tally(&ballots, survivors.len());
        let winner = survivors[pick_winner(&tallies).unwrap_or_default()];

        let mut candidates = summaries(&results);
        for (result, votes) in survivors.iter().zip(&tallies) {
            candidates[result.index] = candidates[result.index].clone().with_votes(*votes);
        }

        Ok((
            winner.content.clone(),
            AggregationOutcome::new(
                AggregationMethod::AcceptanceVoting,
                Some(winner.index),
                candidates,
            ),
        ))
    }

    /// A failed or unreadable ballot counts as an abstention.
    async fn cast_ballot(
        &self,
        voter: &ModelRef,
        draft_count: usize,
        layer: &Layer<'_>,
    ) -> Result<Ballot, RunCompletionError> {
        let ballot = match self.generate(voter, layer.clone()).await {
            Ok(text) => {
                let ballot = parse_ballot(&text, draft_count);
                if ballot.is_empty() {
                    warn!("Ballot from {} could not be parsed, abstaining", voter.display_name());
                }
                ballot
            }
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                warn!("Voter {} failed, abstaining: {}", voter.display_name(), e);
                Ballot::abstain()
            }
        };

        self.conversation_logger.log(ConversationEvent::new(
            "ballot_cast",
            serde_json::json!({
                "depth": layer.depth,
                "voter": voter.display_name(),
                "accepted": ballot.accepted.iter().map(|i| i + 1).collect::<Vec<_>>(),
                "preferred": ballot.preferred.map(|i| i + 1),
            }),
        ));
        Ok(ballot)
    }

    async fn aggregate_judge(
        &self,
        judge: &ModelRef,
        results: Vec<GenerationResult>,
        layer: &Layer<'_>,
    ) -> Result<Aggregated, RunCompletionError> {
        let survivors = survivors(&results);
        let judge_layer = layer.with_drafts(PromptRole::Judge, drafts(&survivors));

        let (choice, fallback) = match self.generate(judge, judge_layer).await {
            Ok(text) => match parse_judge_choice(&text, survivors.len()) {
                Some(choice) => (choice, None),
                None => {
                    warn!(
                        "Could not parse judge verdict '{}', using first candidate",
                        preview(&text, 120)
                    );
                    let note = "judge verdict could not be parsed; used first surviving candidate";
                    (0, Some(note.to_string()))
                }
            },
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                warn!(
                    "Judge {} failed, using first candidate: {}",
                    judge.display_name(),
                    e
                );
                let note = format!("judge failed ({}); used first surviving candidate", e);
                (0, Some(note))
            }
        };

        let winner = survivors[choice];
        self.conversation_logger.log(ConversationEvent::new(
            "judge_verdict",
            serde_json::json!({
                "depth": layer.depth,
                "judge": judge.display_name(),
                "winner_index": winner.index,
                "fallback": fallback,
            }),
        ));

        let mut outcome = AggregationOutcome::new(
            AggregationMethod::Judge,
            Some(winner.index),
            summaries(&results),
        );
        outcome.fallback = fallback;
        Ok((winner.content.clone(), outcome))
    }

    async fn aggregate_synthesis(
        &self,
        synthesizer: &ModelRef,
        results: Vec<GenerationResult>,
        layer: &Layer<'_>,
    ) -> Result<Aggregated, RunCompletionError> {
        let survivors = survivors(&results);
        let synth_layer = layer.with_drafts(PromptRole::Synthesizer, drafts(&survivors));

        match self.generate(synthesizer, synth_layer).await {
            Ok(text) => Ok((
                text,
                AggregationOutcome::new(AggregationMethod::Synthesize, None, summaries(&results)),
            )),
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                let first = survivors[0];
                warn!(
                    "Synthesizer {} failed, returning draft from {}: {}",
                    synthesizer.display_name(),
                    first.model,
                    e
                );
                let outcome = AggregationOutcome::new(
                    AggregationMethod::Synthesize,
                    Some(first.index),
                    summaries(&results),
                )
                .with_fallback(format!(
                    "synthesizer failed ({}); used first surviving candidate",
                    e
                ));
                Ok((first.content.clone(), outcome))
            }
        }
    }
}

fn survivors(results: &[GenerationResult]) -> Vec<&GenerationResult> {
    results.iter().filter(|r| r.success).collect()
}

fn drafts(survivors: &[&GenerationResult]) -> Vec<String> {
    survivors.iter().map(|r| r.content.clone()).collect()
}

fn summaries(results: &[GenerationResult]) -> Vec<CandidateSummary> {
    results.iter().map(CandidateSummary::from).collect()
}

fn all_failed(results: &[GenerationResult]) -> RunCompletionError {
    let detail = results
        .iter()
        .map(|r| format!("{}: {}", r.model, r.error.as_deref().unwrap_or_default()))
        .collect::<Vec<_>>()
        .join("; ");
    DomainError::AllMembersFailed(detail).into()
}

fn required_model<'a>(
    model: &'a Option<ModelRef>,
    field: &str,
) -> Result<&'a ModelRef, RunCompletionError> {
    model.as_ref().ok_or_else(|| {
        DomainError::validation(format!("model.{}", field), "required by aggregation method").into()
    })
}
