//! Model response value object
//!
//! [`ModelResponse`] is produced exactly once per successful query. Its
//! serialized form is part of the persisted result contract:
//! `{model, content, provider, latency_ms}`.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Successful response from a single model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelResponse {
    /// The model that generated this response
    pub model: String,
    /// Full response text
    pub content: String,
    /// Name of the provider that served the model
    pub provider: String,
    /// Wall-clock time from request to final byte
    #[serde(rename = "latency_ms", with = "latency_millis")]
    pub latency: Duration,
}

impl ModelResponse {
    /// Creates a response with zero latency.
    ///
    /// Providers normally follow up with [`with_latency`](Self::with_latency).
    pub fn new(
        model: impl Into<String>,
        content: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            model: model.into(),
            content: content.into(),
            provider: provider.into(),
            latency: Duration::ZERO,
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Latency rounded down to whole milliseconds.
    pub fn latency_ms(&self) -> u64 {
        u64::try_from(self.latency.as_millis()).unwrap_or(u64::MAX)
    }
}

/// Serializes a [`Duration`] as an integer number of milliseconds.
mod latency_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(latency: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
        serializer.serialize_u64(millis)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
