//! Recursive member resolution.
//!
//! [`generate`](RunCompletionUseCase::generate) and
//! [`run_composite`](RunCompletionUseCase::run_composite) call each other
//! through boxed futures, so composites nest to any validated depth.

use super::{RunCompletionError, RunCompletionUseCase};
use crate::ports::completion_client::{CompletionClient, CompletionError};
use crate::ports::conversation_logger::ConversationEvent;
use futures::future::{BoxFuture, FutureExt};
use tracing::{debug, warn};
use trio_domain::core::string::preview;
use trio_domain::{
    CompletionDetails, CompositeSpec, ConversationMessage, DomainError, GenerationParams,
    GenerationResult, Member, ModelRef, PromptRole, build_layered_messages,
};

/// What a call inherits from the composites enclosing it
#[derive(Debug, Clone)]
pub(super) struct Layer<'a> {
    /// Conversation as sent by the host, untouched
    pub conversation: &'a [ConversationMessage],
    pub params: GenerationParams,
    pub role: PromptRole,
    /// Seeds of every enclosing member, outermost first
    pub seeds: Vec<ConversationMessage>,
    pub drafts: Option<Vec<String>>,
    /// Number of composites entered so far
    pub depth: usize,
}

impl<'a> Layer<'a> {
    pub fn root(conversation: &'a [ConversationMessage], params: GenerationParams) -> Self {
        Self {
            conversation,
            params,
            role: PromptRole::Member,
            seeds: Vec::new(),
            drafts: None,
            depth: 0,
        }
    }

    /// Same layer with a member's own seeds after the inherited ones
    pub fn with_seeds(&self, seeds: &[ConversationMessage]) -> Self {
        let mut layer = self.clone();
        layer.seeds.extend_from_slice(seeds);
        layer
    }

    /// Layer for a call that works on drafts (synthesizer, judge, voter)
    pub fn with_drafts(&self, role: PromptRole, drafts: Vec<String>) -> Self {
        Self {
            role,
            drafts: Some(drafts),
            ..self.clone()
        }
    }
}

impl<C: CompletionClient + 'static> RunCompletionUseCase<C> {
    /// Resolve a model reference to its output text.
    pub(super) fn generate<'a>(
        &'a self,
        model: &'a ModelRef,
        layer: Layer<'a>,
    ) -> BoxFuture<'a, Result<String, RunCompletionError>> {
        async move {
            match model {
                ModelRef::Named(name) => {
                    let messages = build_layered_messages(
                        layer.conversation,
                        layer.role,
                        &layer.seeds,
                        layer.drafts.as_deref(),
                    );
                    Ok(self.call(name, &messages, &layer.params).await?)
                }
                ModelRef::Composite(spec) => {
                    let (text, _) = self.run_composite(spec, layer).await?;
                    Ok(text)
                }
            }
        }
        .boxed()
    }

    /// Run a trio or ensemble one level below `layer`.
    pub(super) fn run_composite<'a>(
        &'a self,
        spec: &'a CompositeSpec,
        layer: Layer<'a>,
    ) -> BoxFuture<'a, Result<(String, CompletionDetails), RunCompletionError>> {
        async move {
            let depth = layer.depth + 1;
            if depth > self.params.max_depth {
                return Err(DomainError::CompositionTooDeep {
                    max_depth: self.params.max_depth,
                }
                .into());
            }
            let layer = Layer { depth, ..layer };

            match spec {
                CompositeSpec::Trio(trio) => self.run_trio(trio, layer).await,
                CompositeSpec::Ensemble(ensemble) => self.run_ensemble(ensemble, layer).await,
            }
        }
        .boxed()
    }

    /// Resolve one member. Its failure is captured in the result; only
    /// fatal errors are returned.
    pub(super) async fn generate_member(
        &self,
        index: usize,
        member: &Member,
        layer: &Layer<'_>,
    ) -> Result<GenerationResult, RunCompletionError> {
        let model = member.model.display_name();
        let role = layer.role;
        let depth = layer.depth;

        let result = match self
            .generate(&member.model, layer.with_seeds(&member.seed_messages))
            .await
        {
            Ok(text) => {
                debug!("[{}] {} ({}): {}", depth, model, role, preview(&text, 80));
                GenerationResult::success(index, model, text)
            }
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                warn!("[{}] {} ({}) failed: {}", depth, model, role, e);
                GenerationResult::failure(index, model, e.to_string())
            }
        };

        self.conversation_logger.log(ConversationEvent::new(
            "member_generated",
            serde_json::json!({
                "depth": depth,
                "index": index,
                "model": result.model,
                "role": role.as_str(),
                "success": result.success,
                "content": result.content,
                "error": result.error,
            }),
        ));

        Ok(result)
    }

    /// One upstream call, bounded by the configured call timeout.
    pub(super) async fn call(
        &self,
        model: &str,
        messages: &[ConversationMessage],
        params: &GenerationParams,
    ) -> Result<String, CompletionError> {
        let request = self.client.complete(model, messages, params);
        match self.params.call_timeout {
            Some(limit) => tokio::time::timeout(limit, request)
                .await
                .map_err(|_| CompletionError::Timeout)?,
            None => request.await,
        }
    }
}
