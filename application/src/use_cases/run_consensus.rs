//! Run Consensus use case
//!
//! Orchestrates the full consensus flow: query every model, then let the
//! judge reconcile the answers into one.

use crate::config::RunParams;
use crate::ports::progress::{NoProgress, QueryProgressNotifier};
use crate::registry::{ProviderRegistry, RegistryError};
use crate::use_cases::run_query::{QueryRunner, RunQueryError};
use crate::use_cases::synthesize::{Judge, SynthesizeError};
use consensus_domain::{ConsensusResult, DomainError, ModelResponse};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Errors that can occur during a consensus run
#[derive(Error, Debug)]
pub enum RunConsensusError {
    #[error("invalid run parameters: {0}")]
    InvalidParams(#[from] DomainError),

    #[error("judge model is not registered: {0}")]
    JudgeNotRegistered(#[source] RegistryError),

    #[error("query phase failed: {0}")]
    Query(#[from] RunQueryError),

    #[error("synthesis phase failed: {0}")]
    Synthesis(#[from] SynthesizeError),
}

/// Input for the RunConsensus use case
#[derive(Debug, Clone)]
pub struct RunConsensusInput {
    /// The user prompt, sent unchanged to every model
    pub prompt: String,
    pub params: RunParams,
}

impl RunConsensusInput {
    pub fn new(prompt: impl Into<String>, params: RunParams) -> Self {
        Self {
            prompt: prompt.into(),
            params,
        }
    }
}

/// Use case for running a consensus
pub struct RunConsensusUseCase {
    registry: Arc<ProviderRegistry>,
    cancellation: CancellationToken,
}

impl RunConsensusUseCase {
    pub fn new(registry: Arc<ProviderRegistry>) -> Self {
        Self {
            registry,
            cancellation: CancellationToken::new(),
        }
    }

    /// Cancelling `token` aborts both the query phase and the judge.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(
        &self,
        input: RunConsensusInput,
    ) -> Result<ConsensusResult, RunConsensusError> {
        self.execute_with_progress(input, &NoProgress).await
    }

    /// Execute the use case with progress callbacks
    pub async fn execute_with_progress(
        &self,
        input: RunConsensusInput,
        progress: &dyn QueryProgressNotifier,
    ) -> Result<ConsensusResult, RunConsensusError> {
        let RunConsensusInput { prompt, params } = input;
        if prompt.trim().is_empty() {
            return Err(DomainError::EmptyPrompt.into());
        }
        params.validate()?;

        // Resolve the judge up front so a typo costs no model traffic.
        let judge_provider = self
            .registry
            .get(&params.judge)
            .map_err(RunConsensusError::JudgeNotRegistered)?;

        info!(
            "Starting consensus with {} models, judge {}",
            params.models.len(),
            params.judge
        );

        // Phase 1: query all models
        let runner = QueryRunner::new(Arc::clone(&self.registry), params.timeout)
            .with_cancellation(self.cancellation.clone());
        let run = runner
            .run_with_progress(&params.models, &prompt, progress)
            .await?;

        if run.is_partial() {
            warn!(
                "{} of {} models failed; synthesizing from the rest",
                run.failed_models.len(),
                run.attempted()
            );
        }

        // Phase 2: synthesis
        let judge_provider_name = judge_provider.name().to_string();
        let judge = Judge::new(judge_provider, params.judge.clone())
            .with_cancellation(self.cancellation.clone());

        progress.on_model_start(&params.judge);
        let started = Instant::now();
        let on_chunk = |chunk: &str| progress.on_model_stream(&params.judge, chunk);

        let consensus = match judge
            .synthesize_stream(&prompt, &run.responses, &on_chunk)
            .await
        {
            Ok(consensus) => consensus,
            Err(e) => {
                progress.on_model_error(&params.judge, &e.to_string());
                return Err(e.into());
            }
        };

        let judge_response = ModelResponse::new(
            params.judge.clone(),
            consensus.clone(),
            judge_provider_name,
        )
        .with_latency(started.elapsed());
        progress.on_model_complete(&params.judge, &judge_response);

        info!("Consensus complete ({} bytes)", consensus.len());

        Ok(ConsensusResult::from_run(
            prompt,
            run,
            consensus,
            params.judge,
        ))
    }
}
