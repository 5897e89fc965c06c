//! Translation entry point: validation, model lookup and bounded inference

use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::debug;

use crate::core::backend::ModelLoader;
use crate::core::config::ServiceConfig;
use crate::core::errors::{Result, TranslationError};
use crate::core::marian::MarianLoader;
use crate::core::models::{Language, TranslationRequest, TranslationResult};
use crate::core::registry::ModelRegistry;

/// Validates requests and runs them against the registry
pub struct Translator {
    registry: Arc<ModelRegistry>,
    semaphore: Arc<Semaphore>,
    max_text_chars: usize,
}

impl Translator {
    /// Create a translator over an existing registry
    pub fn new(registry: Arc<ModelRegistry>, config: &ServiceConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(registry, config))
    }

    fn build(registry: Arc<ModelRegistry>, config: &ServiceConfig) -> Self {
        Self {
            registry,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent)),
            max_text_chars: config.max_text_chars,
        }
    }

    /// Build the registry with `loader` and apply the configured load strategy
    pub async fn with_loader(config: &ServiceConfig, loader: Arc<dyn ModelLoader>) -> Result<Self> {
        config.validate()?;
        let registry = ModelRegistry::initialize(config, loader).await?;
        Ok(Self::build(Arc::new(registry), config))
    }

    /// Build a translator backed by MarianMT models on disk
    pub async fn from_config(config: &ServiceConfig) -> Result<Self> {
        let loader = MarianLoader::from_config(config)?;
        Self::with_loader(config, Arc::new(loader)).await
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Translate a single request
    pub async fn translate(&self, request: &TranslationRequest) -> Result<TranslationResult> {
        request.validate_text(self.max_text_chars)?;

        let language: Language = request.language.parse()?;
        if !self.registry.supports(language) {
            return Err(TranslationError::UnsupportedLanguage(request.language.clone()));
        }

        let start = Instant::now();

        // held across the load too, so per-request loads stay bounded
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|e| TranslationError::InternalError(e.to_string()))?;

        let model = self.registry.get(language).await?;

        let text = request.text.clone();
        let translated_text = tokio::task::spawn_blocking(move || model.translate(&text)).await??;

        let elapsed_ms = start.elapsed().as_millis() as u64;
        debug!(
            language = %language,
            chars = request.text.chars().count(),
            elapsed_ms,
            "Translated text"
        );

        Ok(TranslationResult {
            translated_text,
            language,
            elapsed_ms,
        })
    }

    /// Convenience wrapper over [`translate`](Self::translate)
    pub async fn translate_text(&self, text: &str, language: &str) -> Result<String> {
        let request = TranslationRequest::new(text, language);
        Ok(self.translate(&request).await?.translated_text)
    }
}
