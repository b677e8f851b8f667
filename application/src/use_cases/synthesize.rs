//! Synthesize use case
//!
//! Turns the successful responses of a run into one consensus answer:
//!
//! - no responses: contract violation, reported as [`SynthesizeError::EmptyInput`]
//! - one response: returned verbatim, the judge model is never called
//! - two or more: the judge model receives [`JudgePromptTemplate`] and its
//!   (streamed) answer is the consensus
//!
//! A judge failure is terminal. There is no retry and no fallback answer.

use crate::ports::provider::{ChunkCallback, Provider, ProviderError};
use consensus_domain::{JudgePromptTemplate, ModelResponse, QueryRequest};
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Errors that can occur during synthesis
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SynthesizeError {
    #[error("no responses to synthesize")]
    EmptyInput,

    #[error("judge query failed: {0}")]
    JudgeQueryFailed(#[source] ProviderError),
}

/// Synthesizes a consensus from several model responses
pub struct Judge {
    provider: Arc<dyn Provider>,
    model: String,
    cancellation: CancellationToken,
}

impl Judge {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            cancellation: CancellationToken::new(),
        }
    }

    /// Cancelling `token` aborts an in-flight judge query.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// The judge model id.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Synthesize without streaming.
    pub async fn synthesize(
        &self,
        original_prompt: &str,
        responses: &[ModelResponse],
    ) -> Result<String, SynthesizeError> {
        self.synthesize_stream(original_prompt, responses, &|_: &str| {})
            .await
    }

    /// Synthesize, relaying the judge's output to `on_chunk` as it arrives.
    ///
    /// In the single-response case the content is delivered to `on_chunk`
    /// once, so the concatenation of chunks always equals the result.
    pub async fn synthesize_stream(
        &self,
        original_prompt: &str,
        responses: &[ModelResponse],
        on_chunk: &ChunkCallback<'_>,
    ) -> Result<String, SynthesizeError> {
        match responses {
            [] => Err(SynthesizeError::EmptyInput),
            [only] => {
                debug!(
                    "Single response from {}, skipping judge {}",
                    only.model, self.model
                );
                if !only.content.is_empty() {
                    on_chunk(&only.content);
                }
                Ok(only.content.clone())
            }
            _ => {
                info!(
                    "Synthesizing {} responses with judge {}",
                    responses.len(),
                    self.model
                );
                let prompt = JudgePromptTemplate::build(original_prompt, responses);
                let request = QueryRequest::new(self.model.clone(), prompt);

                let outcome = tokio::select! {
                    biased;
                    _ = self.cancellation.cancelled() => Err(ProviderError::Cancelled),
                    result = self.provider.query_stream(&request, on_chunk) => result,
                };

                let response = outcome.map_err(SynthesizeError::JudgeQueryFailed)?;
                debug!(
                    "Judge {} answered in {:?} ({} bytes)",
                    self.model,
                    response.latency,
                    response.content.len()
                );
                Ok(response.content)
            }
        }
    }
}
