//! Provider catalog and registry building
//!
//! The catalog is the explicit model → provider table loaded from the
//! `[providers]` config section. [`build_registry`] turns the subset a run
//! needs into a [`ProviderRegistry`].

use super::{CommandProvider, ProviderKind, StaticProvider};
use crate::config::{FileConfig, FileProviderConfig, FileProvidersConfig};
use consensus_application::ports::provider::{Provider, ProviderError};
use consensus_application::registry::ProviderRegistry;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("unknown model {model:?}; configured models: {available}")]
    UnknownModel { model: String, available: String },

    #[error("invalid provider for {model}: {source}")]
    InvalidProvider {
        model: String,
        #[source]
        source: ProviderError,
    },
}

/// Model id → provider configuration
#[derive(Debug, Clone, Default)]
pub struct ProviderCatalog {
    entries: BTreeMap<String, FileProviderConfig>,
}

impl ProviderCatalog {
    pub fn new(entries: FileProvidersConfig) -> Self {
        Self { entries }
    }

    pub fn from_config(config: &FileConfig) -> Self {
        Self::new(config.providers.clone())
    }

    pub fn insert(&mut self, model: impl Into<String>, entry: FileProviderConfig) {
        self.entries.insert(model.into(), entry);
    }

    /// Configured model ids, sorted.
    pub fn models(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    pub fn kind(&self, model: &str) -> Option<ProviderKind> {
        self.entries.get(model).map(ProviderKind::from)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Instantiate the provider configured for `model`.
    pub fn create(&self, model: &str) -> Result<Arc<dyn Provider>, CatalogError> {
        let entry = self
            .entries
            .get(model)
            .ok_or_else(|| CatalogError::UnknownModel {
                model: model.to_string(),
                available: self.available(),
            })?;

        let provider: Arc<dyn Provider> = match entry {
            FileProviderConfig::Command {
                command,
                provider,
                env,
            } => {
                let mut built = CommandProvider::new(command.clone())
                    .map_err(|source| CatalogError::InvalidProvider {
                        model: model.to_string(),
                        source,
                    })?
                    .with_env(env.clone());
                if let Some(name) = provider {
                    built = built.with_name(name.clone());
                }
                Arc::new(built)
            }
            FileProviderConfig::Static {
                response,
                provider,
                delay_ms,
            } => {
                let mut built = StaticProvider::new(response.clone());
                if let Some(name) = provider {
                    built = built.with_name(name.clone());
                }
                if let Some(ms) = delay_ms {
                    built = built.with_delay(Duration::from_millis(*ms));
                }
                Arc::new(built)
            }
        };
        Ok(provider)
    }

    fn available(&self) -> String {
        if self.entries.is_empty() {
            "none (add [providers.<model>] tables to the config)".to_string()
        } else {
            self.models().join(", ")
        }
    }
}

/// Register a provider for every requested model and the judge.
///
/// Models the catalog cannot serve are left out and logged; the runner then
/// reports them as failed models instead of aborting the run.
pub fn build_registry(catalog: &ProviderCatalog, models: &[String], judge: &str) -> ProviderRegistry {
    let registry = ProviderRegistry::new();

    let mut needed: Vec<&str> = Vec::with_capacity(models.len() + 1);
    for model in models.iter().map(String::as_str).chain(std::iter::once(judge)) {
        if !needed.contains(&model) {
            needed.push(model);
        }
    }

    for model in needed {
        match catalog.create(model) {
            Ok(provider) => {
                debug!("Registered {} via {}", model, provider.name());
                registry.register(model, provider);
            }
            Err(e) => warn!("Skipping {}: {}", model, e),
        }
    }

    registry
}
