//! Trio resolution: A and B draft in parallel, C synthesizes.

use super::generate::Layer;
use super::{RunCompletionError, RunCompletionUseCase};
use crate::ports::completion_client::CompletionClient;
use tracing::{debug, warn};
use trio_domain::prompt::layering::MISSING_DRAFT;
use trio_domain::{
    CompletionDetails, DomainError, GenerationResult, PromptRole, TrioDetails, TrioSpec,
};

impl<C: CompletionClient + 'static> RunCompletionUseCase<C> {
    pub(super) async fn run_trio(
        &self,
        trio: &TrioSpec,
        layer: Layer<'_>,
    ) -> Result<(String, CompletionDetails), RunCompletionError> {
        debug!(
            "[{}] Trio: drafting with {} and {}",
            layer.depth,
            trio.a().model.display_name(),
            trio.b().model.display_name()
        );

        let (a, b) = tokio::join!(
            self.generate_member(0, trio.a(), &layer),
            self.generate_member(1, trio.b(), &layer),
        );
        let (a, b) = (a?, b?);

        let mut details = TrioDetails {
            response_a: a.content.clone(),
            response_b: b.content.clone(),
            model_a: a.model.clone(),
            model_b: b.model.clone(),
            model_c: trio.c().model.display_name().to_string(),
            error_a: a.error.clone(),
            error_b: b.error.clone(),
            fallback: None,
        };

        if !a.success && !b.success {
            return Err(DomainError::AllMembersFailed(format!(
                "trio drafts failed. A ({}): {}. B ({}): {}",
                a.model,
                a.error.as_deref().unwrap_or_default(),
                b.model,
                b.error.as_deref().unwrap_or_default()
            ))
            .into());
        }

        let drafts = vec![draft_text(&a), draft_text(&b)];
        let c = self
            .generate_member(2, trio.c(), &layer.with_drafts(PromptRole::Synthesizer, drafts))
            .await?;

        if c.success {
            return Ok((c.content, CompletionDetails::Trio(details)));
        }

        let survivor = if a.success { &a } else { &b };
        warn!(
            "[{}] Trio synthesizer {} failed, returning draft from {}",
            layer.depth, c.model, survivor.model
        );
        details.fallback = Some(format!(
            "synthesizer {} failed ({}); returned draft from {}",
            c.model,
            c.error.as_deref().unwrap_or_default(),
            survivor.model
        ));
        Ok((survivor.content.clone(), CompletionDetails::Trio(details)))
    }
}

fn draft_text(result: &GenerationResult) -> String {
    if result.success {
        result.content.clone()
    } else {
        MISSING_DRAFT.to_string()
    }
}
