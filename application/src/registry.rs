//! Provider registry
//!
//! Maps model identifiers to the provider that serves them. Registration
//! normally happens once during startup; lookups happen concurrently from
//! every query task. Both are guarded by one reader-writer lock.

use crate::ports::provider::Provider;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;

/// Errors returned by registry lookups
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("unknown model: {0}")]
    UnknownModel(String),
}

/// Thread-safe mapping from model id to provider
#[derive(Default)]
pub struct ProviderRegistry {
    providers: RwLock<HashMap<String, Arc<dyn Provider>>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Associate `model` with `provider`, replacing any previous entry.
    pub fn register(&self, model: impl Into<String>, provider: Arc<dyn Provider>) {
        let mut providers = self
            .providers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        providers.insert(model.into(), provider);
    }

    /// Look up the provider serving `model`.
    pub fn get(&self, model: &str) -> Result<Arc<dyn Provider>, RegistryError> {
        let providers = self
            .providers
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        providers
            .get(model)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownModel(model.to_string()))
    }

    pub fn contains(&self, model: &str) -> bool {
        self.providers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(model)
    }

    /// All registered model ids, in no particular order.
    pub fn models(&self) -> Vec<String> {
        self.providers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.providers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut models = self.models();
        models.sort();
        f.debug_struct("ProviderRegistry")
            .field("models", &models)
            .finish()
    }
}
