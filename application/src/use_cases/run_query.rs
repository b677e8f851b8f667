//! Run Query use case
//!
//! Fans one prompt out to every requested model in parallel and collects
//! the outcomes on a best-effort basis:
//!
//! - every model gets its own task and its own timeout, so a slow or broken
//!   model never delays or fails its siblings
//! - per-model failures (unknown model, provider error, timeout,
//!   cancellation) become a warning plus a failed-model entry
//! - the run waits for every task; it only fails when no model answered
//!
//! Progress events travel from the tasks to the caller over a channel and
//! are dispatched on the caller's task, so a slow observer never stalls a
//! query.

use crate::ports::progress::{NoProgress, QueryProgressNotifier};
use crate::ports::provider::ProviderError;
use crate::registry::ProviderRegistry;
use consensus_domain::{ModelResponse, QueryRequest, RunResult};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Errors that end a run without a usable result
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RunQueryError {
    #[error("no models to query")]
    NoModels,

    #[error("all models failed:{}", format_warnings(.warnings))]
    AllModelsFailed { warnings: Vec<String> },
}

fn format_warnings(warnings: &[String]) -> String {
    warnings
        .iter()
        .map(|w| format!("\n  - {}", w))
        .collect::<String>()
}

/// Progress event emitted by a query task.
#[derive(Debug)]
enum RunEvent {
    Start(String),
    Chunk(String, String),
    Complete(String, ModelResponse),
    Error(String, String),
}

/// Shared accumulator, appended to by every task under one lock.
#[derive(Default)]
struct Accumulator {
    responses: Vec<ModelResponse>,
    warnings: Vec<String>,
    failed_models: Vec<String>,
    /// Requested model ids that reported an outcome, success or failure
    settled: Vec<String>,
}

impl Accumulator {
    fn record_success(&mut self, model: &str, response: ModelResponse) {
        self.responses.push(response);
        self.settled.push(model.to_string());
    }

    fn record_failure(&mut self, model: &str, error: &str) {
        self.warnings.push(format!("{}: {}", model, error));
        self.failed_models.push(model.to_string());
        self.settled.push(model.to_string());
    }
}

/// Queries several models concurrently with a per-model timeout
pub struct QueryRunner {
    registry: Arc<ProviderRegistry>,
    timeout: Duration,
    cancellation: CancellationToken,
}

impl QueryRunner {
    pub fn new(registry: Arc<ProviderRegistry>, timeout: Duration) -> Self {
        Self {
            registry,
            timeout,
            cancellation: CancellationToken::new(),
        }
    }

    /// Cancelling `token` aborts every in-flight query of the run.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Execute the run with default (no-op) progress
    pub async fn run(&self, models: &[String], prompt: &str) -> Result<RunResult, RunQueryError> {
        self.run_with_progress(models, prompt, &NoProgress).await
    }

    /// Execute the run with progress callbacks
    pub async fn run_with_progress(
        &self,
        models: &[String],
        prompt: &str,
        progress: &dyn QueryProgressNotifier,
    ) -> Result<RunResult, RunQueryError> {
        if models.is_empty() {
            return Err(RunQueryError::NoModels);
        }

        info!(
            "Querying {} models (timeout {:?} each)",
            models.len(),
            self.timeout
        );

        let accumulator = Arc::new(Mutex::new(Accumulator::default()));
        let (events_tx, mut events_rx) = mpsc::unbounded_channel();
        let mut join_set = JoinSet::new();

        for model in models {
            let task = ModelTask {
                registry: Arc::clone(&self.registry),
                request: QueryRequest::new(model.clone(), prompt),
                timeout: self.timeout,
                cancellation: self.cancellation.clone(),
                accumulator: Arc::clone(&accumulator),
                events: events_tx.clone(),
            };
            join_set.spawn(task.run());
        }
        // Only the tasks hold senders now; the channel closes when the last one ends.
        drop(events_tx);

        while let Some(event) = events_rx.recv().await {
            dispatch(progress, event);
        }

        while let Some(joined) = join_set.join_next().await {
            if let Err(e) = joined {
                warn!("Query task ended abnormally: {}", e);
            }
        }

        let mut accumulator = match Arc::try_unwrap(accumulator) {
            Ok(mutex) => mutex.into_inner().unwrap_or_else(PoisonError::into_inner),
            Err(shared) => {
                let mut guard = shared.lock().unwrap_or_else(PoisonError::into_inner);
                std::mem::take(&mut *guard)
            }
        };
        record_unsettled(&mut accumulator, models, progress);

        if accumulator.responses.is_empty() {
            warn!("All {} models failed", models.len());
            return Err(RunQueryError::AllModelsFailed {
                warnings: accumulator.warnings,
            });
        }

        info!(
            "Run finished: {} succeeded, {} failed",
            accumulator.responses.len(),
            accumulator.failed_models.len()
        );

        Ok(RunResult {
            responses: accumulator.responses,
            warnings: accumulator.warnings,
            failed_models: accumulator.failed_models,
        })
    }
}

fn dispatch(progress: &dyn QueryProgressNotifier, event: RunEvent) {
    match event {
        RunEvent::Start(model) => progress.on_model_start(&model),
        RunEvent::Chunk(model, chunk) => progress.on_model_stream(&model, &chunk),
        RunEvent::Complete(model, response) => progress.on_model_complete(&model, &response),
        RunEvent::Error(model, error) => progress.on_model_error(&model, &error),
    }
}

/// Record requested models whose task died without reporting (panic).
///
/// Keeps `responses + failed_models == requested` even then.
fn record_unsettled(
    accumulator: &mut Accumulator,
    models: &[String],
    progress: &dyn QueryProgressNotifier,
) {
    let mut settled = accumulator.settled.clone();

    let mut unsettled = Vec::new();
    for model in models {
        match settled.iter().position(|m| m == model) {
            Some(index) => {
                settled.swap_remove(index);
            }
            None => unsettled.push(model.clone()),
        }
    }

    for model in unsettled {
        warn!("Model {} never reported a result", model);
        accumulator.record_failure(&model, "task panicked");
        progress.on_model_error(&model, "task panicked");
    }
}

/// Everything one query task needs, moved into the spawned future.
struct ModelTask {
    registry: Arc<ProviderRegistry>,
    request: QueryRequest,
    timeout: Duration,
    cancellation: CancellationToken,
    accumulator: Arc<Mutex<Accumulator>>,
    events: mpsc::UnboundedSender<RunEvent>,
}

impl ModelTask {
    async fn run(self) {
        let model = self.request.model.clone();
        self.emit(RunEvent::Start(model.clone()));

        let provider = match self.registry.get(&model) {
            Ok(provider) => provider,
            Err(e) => {
                warn!("Model {} is not registered", model);
                self.fail(&model, e.to_string());
                return;
            }
        };

        debug!("Querying {} via {}", model, provider.name());
        let started = Instant::now();

        let events = self.events.clone();
        let chunk_model = model.clone();
        let on_chunk = move |chunk: &str| {
            let _ = events.send(RunEvent::Chunk(chunk_model.clone(), chunk.to_string()));
        };

        let outcome = tokio::select! {
            biased;
            _ = self.cancellation.cancelled() => Err(ProviderError::Cancelled),
            result = tokio::time::timeout(
                self.timeout,
                provider.query_stream(&self.request, &on_chunk),
            ) => match result {
                Ok(result) => result,
                Err(_) => Err(ProviderError::Timeout(self.timeout)),
            },
        };

        match outcome {
            Ok(mut response) => {
                if response.model.is_empty() {
                    response.model = model.clone();
                }
                if response.latency.is_zero() {
                    response.latency = started.elapsed();
                }
                debug!(
                    "Model {} responded in {:?} ({} bytes)",
                    model,
                    response.latency,
                    response.content.len()
                );
                self.lock().record_success(&model, response.clone());
                self.emit(RunEvent::Complete(model, response));
            }
            Err(e) => {
                warn!("Model {} failed: {}", model, e);
                self.fail(&model, e.to_string());
            }
        }
    }

    fn fail(&self, model: &str, error: String) {
        self.lock().record_failure(model, &error);
        self.emit(RunEvent::Error(model.to_string(), error));
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Accumulator> {
        self.accumulator
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: RunEvent) {
        // The receiver only goes away if the run itself was dropped.
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::provider::{ChunkCallback, FnProvider, Provider, ProviderFuture};
    use async_trait::async_trait;

    // -- Test providers --------------------------------------------------------

    fn succeeding(content: &'static str) -> Arc<dyn Provider> {
        Arc::new(FnProvider::new("test", move |request: QueryRequest| -> ProviderFuture {
            Box::pin(async move { Ok(ModelResponse::new(request.model, content, "test")) })
        }))
    }

    fn failing(message: &'static str) -> Arc<dyn Provider> {
        Arc::new(FnProvider::new("test", move |_request: QueryRequest| -> ProviderFuture {
            Box::pin(async move { Err(ProviderError::Other(message.to_string())) })
        }))
    }

    fn hanging() -> Arc<dyn Provider> {
        Arc::new(FnProvider::new("test", |request: QueryRequest| -> ProviderFuture {
            Box::pin(async move {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok(ModelResponse::new(request.model, "too slow", "test"))
            })
        }))
    }

    fn panicking() -> Arc<dyn Provider> {
        Arc::new(FnProvider::new("test", |_request: QueryRequest| -> ProviderFuture {
            panic!("provider bug")
        }))
    }

    struct StreamingProvider {
        chunks: Vec<&'static str>,
    }

    #[async_trait]
    impl Provider for StreamingProvider {
        fn name(&self) -> &str {
            "streaming"
        }

        async fn query(&self, request: &QueryRequest) -> Result<ModelResponse, ProviderError> {
            Ok(ModelResponse::new(
                request.model.clone(),
                self.chunks.concat(),
                "streaming",
            ))
        }

        async fn query_stream(
            &self,
            request: &QueryRequest,
            on_chunk: &ChunkCallback<'_>,
        ) -> Result<ModelResponse, ProviderError> {
            let mut content = String::new();
            for chunk in &self.chunks {
                tokio::task::yield_now().await;
                on_chunk(chunk);
                content.push_str(chunk);
            }
            Ok(ModelResponse::new(request.model.clone(), content, "streaming"))
        }
    }

    #[derive(Default)]
    struct RecordingProgress {
        events: Mutex<Vec<String>>,
    }

    impl RecordingProgress {
        fn events_for(&self, model: &str) -> Vec<String> {
            let prefix = format!("{model}:");
            self.events
                .lock()
                .unwrap()
                .iter()
                .filter(|e| e.starts_with(&prefix))
                .cloned()
                .collect()
        }
    }

    impl QueryProgressNotifier for RecordingProgress {
        fn on_model_start(&self, model: &str) {
            self.events.lock().unwrap().push(format!("{model}:start"));
        }

        fn on_model_stream(&self, model: &str, chunk: &str) {
            self.events
                .lock()
                .unwrap()
                .push(format!("{model}:chunk:{chunk}"));
        }

        fn on_model_complete(&self, model: &str, _response: &ModelResponse) {
            self.events.lock().unwrap().push(format!("{model}:complete"));
        }

        fn on_model_error(&self, model: &str, error: &str) {
            self.events
                .lock()
                .unwrap()
                .push(format!("{model}:error:{error}"));
        }
    }

    // -- Helpers ---------------------------------------------------------------

    fn models(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn runner(registry: ProviderRegistry) -> QueryRunner {
        QueryRunner::new(Arc::new(registry), Duration::from_secs(5))
    }

    // -- Scenarios -------------------------------------------------------------

    #[tokio::test]
    async fn test_all_models_succeed() {
        let registry = ProviderRegistry::new();
        registry.register("a", succeeding("X"));
        registry.register("b", succeeding("Y"));

        let result = runner(registry)
            .run(&models(&["a", "b"]), "prompt")
            .await
            .unwrap();

        assert_eq!(result.responses.len(), 2);
        assert_eq!(result.response_for("a").unwrap().content, "X");
        assert_eq!(result.response_for("b").unwrap().content, "Y");
        assert!(result.warnings.is_empty());
        assert!(result.failed_models.is_empty());
    }

    #[tokio::test]
    async fn test_partial_failure_is_tolerated() {
        let registry = ProviderRegistry::new();
        registry.register("a", failing("boom"));
        registry.register("b", succeeding("Y"));

        let result = runner(registry)
            .run(&models(&["a", "b"]), "prompt")
            .await
            .unwrap();

        assert_eq!(result.responses.len(), 1);
        assert_eq!(result.responses[0].content, "Y");
        assert_eq!(result.failed_models, vec!["a".to_string()]);
        assert_eq!(result.warnings, vec!["a: boom".to_string()]);
    }

    #[tokio::test]
    async fn test_all_models_fail() {
        let registry = ProviderRegistry::new();
        registry.register("a", failing("error a"));
        registry.register("b", failing("error b"));

        let err = runner(registry)
            .run(&models(&["a", "b"]), "prompt")
            .await
            .unwrap_err();

        match &err {
            RunQueryError::AllModelsFailed { warnings } => {
                assert_eq!(warnings.len(), 2);
                assert!(warnings.contains(&"a: error a".to_string()));
                assert!(warnings.contains(&"b: error b".to_string()));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        let message = err.to_string();
        assert!(message.contains("a: error a"));
        assert!(message.contains("b: error b"));
    }

    #[tokio::test]
    async fn test_unregistered_model_is_a_failure_not_an_abort() {
        let registry = ProviderRegistry::new();
        registry.register("b", succeeding("Y"));

        let result = runner(registry)
            .run(&models(&["unknown-model", "b"]), "prompt")
            .await
            .unwrap();

        assert_eq!(result.responses.len(), 1);
        assert_eq!(result.failed_models, vec!["unknown-model".to_string()]);
        assert_eq!(
            result.warnings,
            vec!["unknown-model: unknown model: unknown-model".to_string()]
        );
    }

    #[tokio::test]
    async fn test_only_unregistered_models_fail_the_run() {
        let err = runner(ProviderRegistry::new())
            .run(&models(&["unknown-model"]), "prompt")
            .await
            .unwrap_err();
        assert!(matches!(err, RunQueryError::AllModelsFailed { .. }));
    }

    #[tokio::test]
    async fn test_empty_model_list() {
        let err = runner(ProviderRegistry::new())
            .run(&[], "prompt")
            .await
            .unwrap_err();
        assert_eq!(err, RunQueryError::NoModels);
    }

    #[tokio::test]
    async fn test_timeout_isolates_slow_model() {
        let registry = ProviderRegistry::new();
        registry.register("slow", hanging());
        registry.register("fast", succeeding("quick"));

        let runner = QueryRunner::new(Arc::new(registry), Duration::from_millis(100));
        let started = Instant::now();
        let result = runner
            .run(&models(&["slow", "fast"]), "prompt")
            .await
            .unwrap();

        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(result.responses.len(), 1);
        assert_eq!(result.responses[0].model, "fast");
        assert_eq!(result.failed_models, vec!["slow".to_string()]);
        assert_eq!(result.warnings, vec!["slow: timed out after 0.1s".to_string()]);
    }

    #[tokio::test]
    async fn test_single_slow_model_fails_the_run() {
        let registry = ProviderRegistry::new();
        registry.register("slow", hanging());

        let runner = QueryRunner::new(Arc::new(registry), Duration::from_millis(50));
        let err = runner.run(&models(&["slow"]), "prompt").await.unwrap_err();

        assert!(err.to_string().contains("slow: timed out"));
    }

    #[tokio::test]
    async fn test_cancellation_propagates_to_every_task() {
        let registry = ProviderRegistry::new();
        registry.register("a", hanging());
        registry.register("b", hanging());

        let token = CancellationToken::new();
        let runner = QueryRunner::new(Arc::new(registry), Duration::from_secs(30))
            .with_cancellation(token.clone());

        let cancel = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            token.cancel();
        });

        let started = Instant::now();
        let err = runner
            .run(&models(&["a", "b"]), "prompt")
            .await
            .unwrap_err();
        cancel.await.unwrap();

        assert!(started.elapsed() < Duration::from_secs(5));
        match err {
            RunQueryError::AllModelsFailed { mut warnings } => {
                warnings.sort();
                assert_eq!(warnings, vec!["a: cancelled", "b: cancelled"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_panicking_provider_is_recorded_as_failed() {
        let registry = ProviderRegistry::new();
        registry.register("bad", panicking());
        registry.register("good", succeeding("ok"));

        let result = runner(registry)
            .run(&models(&["bad", "good"]), "prompt")
            .await
            .unwrap();

        assert_eq!(result.responses.len(), 1);
        assert_eq!(result.failed_models, vec!["bad".to_string()]);
        assert_eq!(result.warnings, vec!["bad: task panicked".to_string()]);
    }

    #[tokio::test]
    async fn test_count_invariant_with_mixed_outcomes() {
        let registry = ProviderRegistry::new();
        registry.register("a", succeeding("1"));
        registry.register("b", failing("nope"));
        registry.register("c", succeeding("3"));

        let requested = models(&["a", "b", "c", "missing"]);
        let result = runner(registry).run(&requested, "prompt").await.unwrap();

        assert_eq!(
            result.responses.len() + result.failed_models.len(),
            requested.len()
        );
        assert_eq!(result.failed_models.len(), 2);
        assert_eq!(result.warnings.len(), 2);
    }

    #[tokio::test]
    async fn test_latency_is_measured_when_provider_leaves_it_unset() {
        let registry = ProviderRegistry::new();
        registry.register(
            "a",
            Arc::new(FnProvider::new("test", |request: QueryRequest| -> ProviderFuture {
                Box::pin(async move {
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    Ok(ModelResponse::new(request.model, "X", "test"))
                })
            })),
        );

        let result = runner(registry).run(&models(&["a"]), "prompt").await.unwrap();
        assert!(result.responses[0].latency >= Duration::from_millis(20));
    }

    #[tokio::test]
    async fn test_progress_events_are_ordered_per_model() {
        let registry = ProviderRegistry::new();
        registry.register(
            "s",
            Arc::new(StreamingProvider {
                chunks: vec!["Hel", "lo"],
            }),
        );
        registry.register("f", failing("boom"));

        let progress = RecordingProgress::default();
        let result = runner(registry)
            .run_with_progress(&models(&["s", "f", "missing"]), "prompt", &progress)
            .await
            .unwrap();

        assert_eq!(result.responses[0].content, "Hello");
        assert_eq!(
            progress.events_for("s"),
            vec!["s:start", "s:chunk:Hel", "s:chunk:lo", "s:complete"]
        );
        assert_eq!(progress.events_for("f"), vec!["f:start", "f:error:boom"]);
        assert_eq!(
            progress.events_for("missing"),
            vec!["missing:start", "missing:error:unknown model: missing"]
        );
    }

    #[tokio::test]
    async fn test_streamed_chunks_concatenate_to_content() {
        let registry = ProviderRegistry::new();
        registry.register(
            "s",
            Arc::new(StreamingProvider {
                chunks: vec!["a", "b", "c", "d"],
            }),
        );

        let progress = RecordingProgress::default();
        let result = runner(registry)
            .run_with_progress(&models(&["s"]), "prompt", &progress)
            .await
            .unwrap();

        let streamed: String = progress
            .events_for("s")
            .iter()
            .filter_map(|e| e.strip_prefix("s:chunk:"))
            .collect();
        assert_eq!(streamed, result.responses[0].content);
    }
}
