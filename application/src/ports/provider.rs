//! Provider port
//!
//! Defines the capability every LLM backend implements: turn a
//! [`QueryRequest`] into a [`ModelResponse`], optionally streaming text
//! fragments as they arrive.
//!
//! Cancellation is by drop: the runner abandons a provider future when the
//! per-model timeout expires or the run is cancelled. Implementations must
//! not leave detached work running once their future is dropped.

use async_trait::async_trait;
use consensus_domain::{ModelResponse, QueryRequest};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use thiserror::Error;

/// Callback receiving streamed text fragments in delivery order.
pub type ChunkCallback<'a> = dyn Fn(&str) + Send + Sync + 'a;

/// Errors that can occur while querying a provider
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("process failed: {0}")]
    Process(String),

    #[error("invalid response: {0}")]
    Parse(String),

    #[error("timed out after {}s", .0.as_secs_f64())]
    Timeout(Duration),

    #[error("cancelled")]
    Cancelled,

    #[error("{0}")]
    Other(String),
}

impl ProviderError {
    /// Timeouts and cancellations are imposed by the runner, not the backend.
    pub fn is_interrupted(&self) -> bool {
        matches!(self, ProviderError::Timeout(_) | ProviderError::Cancelled)
    }
}

/// An LLM backend able to answer prompts for one or more models
#[async_trait]
pub trait Provider: Send + Sync {
    /// Provider name reported in [`ModelResponse::provider`].
    fn name(&self) -> &str;

    /// Send the prompt and wait for the complete response.
    async fn query(&self, request: &QueryRequest) -> Result<ModelResponse, ProviderError>;

    /// Send the prompt, relaying partial text to `on_chunk` before returning.
    ///
    /// The returned content equals the concatenation of every chunk passed
    /// to `on_chunk`, in order. The default implementation cannot stream, so
    /// it calls [`query`](Self::query) and delivers the full content as a
    /// single chunk.
    async fn query_stream(
        &self,
        request: &QueryRequest,
        on_chunk: &ChunkCallback<'_>,
    ) -> Result<ModelResponse, ProviderError> {
        let response = self.query(request).await?;
        if !response.content.is_empty() {
            on_chunk(&response.content);
        }
        Ok(response)
    }
}

/// Boxed future returned by [`FnProvider`] closures.
pub type ProviderFuture = Pin<Box<dyn Future<Output = Result<ModelResponse, ProviderError>> + Send>>;

/// Adapter turning a closure into a [`Provider`]
///
/// Useful for tests and ad-hoc backends that don't deserve a named type.
///
/// ```
/// use consensus_application::ports::provider::{FnProvider, Provider, ProviderFuture};
/// use consensus_domain::{ModelResponse, QueryRequest};
///
/// let provider = FnProvider::new("test", |request: QueryRequest| -> ProviderFuture {
///     Box::pin(async move {
///         Ok(ModelResponse::new(request.model, "hello", "test"))
///     })
/// });
/// assert_eq!(provider.name(), "test");
/// ```
pub struct FnProvider<F> {
    name: String,
    func: F,
}

impl<F> FnProvider<F>
where
    F: Fn(QueryRequest) -> ProviderFuture + Send + Sync,
{
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

#[async_trait]
impl<F> Provider for FnProvider<F>
where
    F: Fn(QueryRequest) -> ProviderFuture + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn query(&self, request: &QueryRequest) -> Result<ModelResponse, ProviderError> {
        (self.func)(request.clone()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct ChunkedProvider {
        chunks: Vec<&'static str>,
    }

    #[async_trait]
    impl Provider for ChunkedProvider {
        fn name(&self) -> &str {
            "chunked"
        }

        async fn query(&self, request: &QueryRequest) -> Result<ModelResponse, ProviderError> {
            Ok(ModelResponse::new(
                request.model.clone(),
                self.chunks.concat(),
                self.name(),
            ))
        }

        async fn query_stream(
            &self,
            request: &QueryRequest,
            on_chunk: &ChunkCallback<'_>,
        ) -> Result<ModelResponse, ProviderError> {
            let mut content = String::new();
            for chunk in &self.chunks {
                on_chunk(chunk);
                content.push_str(chunk);
            }
            Ok(ModelResponse::new(request.model.clone(), content, self.name()))
        }
    }

    fn collect_chunks(received: &Mutex<Vec<String>>) -> impl Fn(&str) + Send + Sync + '_ {
        move |chunk: &str| received.lock().unwrap().push(chunk.to_string())
    }

    #[tokio::test]
    async fn test_default_stream_delivers_single_chunk() {
        let provider = FnProvider::new("fn", |request: QueryRequest| -> ProviderFuture {
            Box::pin(async move { Ok(ModelResponse::new(request.model, "full text", "fn")) })
        });

        let received = Mutex::new(Vec::new());
        let on_chunk = collect_chunks(&received);
        let response = provider
            .query_stream(&QueryRequest::new("m", "p"), &on_chunk)
            .await
            .unwrap();

        assert_eq!(*received.lock().unwrap(), vec!["full text".to_string()]);
        assert_eq!(response.content, "full text");
    }

    #[tokio::test]
    async fn test_native_stream_concatenation_matches_content() {
        let provider = ChunkedProvider {
            chunks: vec!["Hel", "lo, ", "world"],
        };

        let received = Mutex::new(Vec::new());
        let on_chunk = collect_chunks(&received);
        let response = provider
            .query_stream(&QueryRequest::new("m", "p"), &on_chunk)
            .await
            .unwrap();

        assert_eq!(received.lock().unwrap().concat(), response.content);
        assert_eq!(response.content, "Hello, world");
    }

    #[tokio::test]
    async fn test_default_stream_skips_empty_content() {
        let provider = FnProvider::new("fn", |request: QueryRequest| -> ProviderFuture {
            Box::pin(async move { Ok(ModelResponse::new(request.model, "", "fn")) })
        });

        let received = Mutex::new(Vec::new());
        let on_chunk = collect_chunks(&received);
        provider
            .query_stream(&QueryRequest::new("m", "p"), &on_chunk)
            .await
            .unwrap();

        assert!(received.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fn_provider_propagates_errors() {
        let provider = FnProvider::new("fn", |_request: QueryRequest| -> ProviderFuture {
            Box::pin(async { Err(ProviderError::Request("boom".to_string())) })
        });

        let err = provider.query(&QueryRequest::new("m", "p")).await.unwrap_err();
        assert_eq!(err.to_string(), "request failed: boom");
    }

    #[test]
    fn test_timeout_display() {
        let err = ProviderError::Timeout(Duration::from_secs(120));
        assert_eq!(err.to_string(), "timed out after 120s");
        assert!(err.is_interrupted());
        assert!(ProviderError::Cancelled.is_interrupted());
        assert!(!ProviderError::Other("x".to_string()).is_interrupted());
    }
}
