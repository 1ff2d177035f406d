//! Language tag → loaded model registry.
//!
//! Built once at startup and shared behind an `Arc`. A language whose model
//! directory is missing or fails to load is logged and left out; only an
//! empty registry is an error.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::RegistryError;
use crate::recognizer::{AcousticModel, ModelLoader};

/// A configured language and the directory holding its model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelSource {
    /// Language tag, e.g. `"en"`.
    pub tag: String,
    /// Model directory.
    pub path: PathBuf,
}

impl ModelSource {
    /// Create a source entry.
    pub fn new(tag: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            tag: tag.into(),
            path: path.into(),
        }
    }
}

/// Loaded models keyed by language tag, in load order.
pub struct ModelRegistry {
    models: Vec<(String, Arc<dyn AcousticModel>)>,
    default_tag: String,
}

impl ModelRegistry {
    /// Load every source through `loader`.
    ///
    /// The default language is `preferred` when it loaded, otherwise the
    /// first tag that loaded. Duplicate tags keep their first occurrence.
    pub fn load(
        sources: &[ModelSource],
        preferred: Option<&str>,
        loader: &dyn ModelLoader,
    ) -> Result<Self, RegistryError> {
        let mut models: Vec<(String, Arc<dyn AcousticModel>)> = Vec::new();

        for source in sources {
            if models.iter().any(|(tag, _)| *tag == source.tag) {
                warn!(tag = %source.tag, "duplicate language entry, keeping the first");
                continue;
            }
            if !source.path.exists() {
                warn!(
                    tag = %source.tag,
                    path = %source.path.display(),
                    "model directory does not exist, skipping language"
                );
                continue;
            }
            match loader.load(&source.tag, &source.path) {
                Ok(model) => {
                    info!(tag = %source.tag, path = %source.path.display(), "loaded recognition model");
                    models.push((source.tag.clone(), model));
                }
                Err(e) => {
                    warn!(tag = %source.tag, error = %e, "failed to load recognition model");
                }
            }
        }

        Self::from_models(models, preferred).map_err(|_| RegistryError::NoModelsLoaded {
            tried: sources.iter().map(|s| s.tag.clone()).collect(),
        })
    }

    /// Build a registry from already-loaded models.
    pub fn from_models(
        models: Vec<(String, Arc<dyn AcousticModel>)>,
        preferred: Option<&str>,
    ) -> Result<Self, RegistryError> {
        let default_tag = preferred
            .filter(|p| models.iter().any(|(tag, _)| tag == p))
            .map(str::to_string)
            .or_else(|| models.first().map(|(tag, _)| tag.clone()))
            .ok_or_else(|| RegistryError::NoModelsLoaded { tried: Vec::new() })?;

        debug!(default = %default_tag, count = models.len(), "model registry ready");
        Ok(Self {
            models,
            default_tag,
        })
    }

    /// Look up the model for a tag.
    pub fn resolve(&self, tag: &str) -> Option<Arc<dyn AcousticModel>> {
        self.models
            .iter()
            .find(|(t, _)| t == tag)
            .map(|(_, model)| Arc::clone(model))
    }

    /// Whether a model is loaded for `tag`.
    pub fn contains(&self, tag: &str) -> bool {
        self.models.iter().any(|(t, _)| t == tag)
    }

    /// The language new sessions start in.
    pub fn default_tag(&self) -> &str {
        &self.default_tag
    }

    /// Every loaded tag, in load order.
    pub fn available(&self) -> Vec<String> {
        self.models.iter().map(|(tag, _)| tag.clone()).collect()
    }

    /// Number of loaded models.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Always `false` for a constructed registry.
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl std::fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelRegistry")
            .field("languages", &self.available())
            .field("default_tag", &self.default_tag)
            .finish()
    }
}
