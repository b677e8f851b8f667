//! Provider with a canned answer, for offline runs and demos.

use async_trait::async_trait;
use consensus_application::ports::provider::{Provider, ProviderError};
use consensus_domain::{ModelResponse, QueryRequest};
use std::time::{Duration, Instant};

pub struct StaticProvider {
    name: String,
    response: String,
    delay: Option<Duration>,
}

impl StaticProvider {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            name: "static".to_string(),
            response: response.into(),
            delay: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Wait this long before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl Provider for StaticProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn query(&self, request: &QueryRequest) -> Result<ModelResponse, ProviderError> {
        let started = Instant::now();
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(
            ModelResponse::new(request.model.clone(), self.response.clone(), self.name.clone())
                .with_latency(started.elapsed()),
        )
    }
}
