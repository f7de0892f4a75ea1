//! Run Completion use case
//!
//! Turns one chat-completion request into one response:
//!
//! | Phase        | Pass-through            | Composite                              |
//! |--------------|-------------------------|----------------------------------------|
//! | 1. Validate  | non-empty name/messages | full spec check, depth guard           |
//! | 2. Generate  | one upstream call       | recursive fan-out (`generate.rs`, `trio.rs`) |
//! | 3. Aggregate | -                       | per method (`aggregate.rs`)            |
//! | 4. Assemble  | model = backend name    | model = `trio-1.0`, trace details      |
//!
//! Nothing is called upstream until validation has passed.

mod aggregate;
mod generate;
mod trio;
mod types;

pub use types::{RunCompletionError, RunCompletionInput, RunCompletionOutput};

use crate::config::ExecutionParams;
use crate::ports::completion_client::CompletionClient;
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use generate::Layer;
use std::sync::Arc;
use tracing::{info, warn};
use trio_domain::{
    COMPOSITE_MODEL_ID, ChatCompletionResponse, CompositeSpec, DomainError, ModelRef,
};

/// Use case for producing a (possibly composed) chat completion
pub struct RunCompletionUseCase<C: CompletionClient + 'static> {
    client: Arc<C>,
    params: ExecutionParams,
    conversation_logger: Arc<dyn ConversationLogger>,
}

impl<C: CompletionClient + 'static> Clone for RunCompletionUseCase<C> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            params: self.params.clone(),
            conversation_logger: self.conversation_logger.clone(),
        }
    }
}

impl<C: CompletionClient + 'static> RunCompletionUseCase<C> {
    pub fn new(client: Arc<C>) -> Self {
        Self {
            client,
            params: ExecutionParams::default(),
            conversation_logger: Arc::new(NoConversationLogger),
        }
    }

    pub fn with_params(mut self, params: ExecutionParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    pub fn params(&self) -> &ExecutionParams {
        &self.params
    }

    /// Execute the use case
    pub async fn execute(
        &self,
        input: RunCompletionInput,
    ) -> Result<RunCompletionOutput, RunCompletionError> {
        if input.messages.is_empty() {
            return Err(
                DomainError::validation("messages", "At least one message is required").into(),
            );
        }

        match input.model.validate(self.params.max_depth)? {
            ModelRef::Named(name) => self.pass_through(&name, &input).await,
            ModelRef::Composite(spec) => self.compose(&spec, &input).await,
        }
    }

    /// Forward the conversation unmodified to a single backend model
    async fn pass_through(
        &self,
        model: &str,
        input: &RunCompletionInput,
    ) -> Result<RunCompletionOutput, RunCompletionError> {
        info!(
            "Pass-through request to {}: {} messages",
            model,
            input.messages.len()
        );

        let text = self
            .call(model, &input.messages, &input.params)
            .await
            .inspect_err(|e| warn!("Pass-through to {} failed: {}", model, e))?;

        Ok(RunCompletionOutput {
            response: ChatCompletionResponse::new(model, text),
            details: None,
        })
    }

    async fn compose(
        &self,
        spec: &CompositeSpec,
        input: &RunCompletionInput,
    ) -> Result<RunCompletionOutput, RunCompletionError> {
        info!(
            "Composite request ({}, depth {}): {} messages",
            spec.display_name(),
            spec.depth(),
            input.messages.len()
        );

        let layer = Layer::root(&input.messages, input.params);
        match self.run_composite(spec, layer).await {
            Ok((text, details)) => {
                self.conversation_logger.log(ConversationEvent::new(
                    "completion_finished",
                    serde_json::json!({
                        "composite": spec.display_name(),
                        "content": text,
                        "details": details,
                    }),
                ));
                Ok(RunCompletionOutput {
                    response: ChatCompletionResponse::new(COMPOSITE_MODEL_ID, text),
                    details: Some(details),
                })
            }
            Err(e) => {
                warn!("Composite request failed: {}", e);
                self.conversation_logger.log(ConversationEvent::new(
                    "completion_failed",
                    serde_json::json!({
                        "composite": spec.display_name(),
                        "error": e.to_string(),
                    }),
                ));
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests;
