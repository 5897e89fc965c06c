//! Language-keyed model registry

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::core::backend::{ModelLoader, TranslationModel};
use crate::core::config::{LoadStrategy, ServiceConfig};
use crate::core::errors::{Result, TranslationError};
use crate::core::models::Language;

/// Maps each enabled language to its loaded model
pub struct ModelRegistry {
    strategy: LoadStrategy,
    model_root: PathBuf,
    loader: Arc<dyn ModelLoader>,
    // one cell per language so concurrent first requests share a single load
    slots: HashMap<Language, OnceCell<Arc<dyn TranslationModel>>>,
}

impl ModelRegistry {
    /// Create an empty registry. Nothing is loaded until [`preload`](Self::preload) or [`get`](Self::get).
    pub fn new(config: &ServiceConfig, loader: Arc<dyn ModelLoader>) -> Self {
        let slots = config
            .languages
            .iter()
            .map(|lang| (*lang, OnceCell::new()))
            .collect();

        Self {
            strategy: config.load_strategy,
            model_root: config.model_root.clone(),
            loader,
            slots,
        }
    }

    /// Create a registry and, for the eager strategy, load every language
    pub async fn initialize(config: &ServiceConfig, loader: Arc<dyn ModelLoader>) -> Result<Self> {
        let registry = Self::new(config, loader);
        if registry.strategy == LoadStrategy::Eager {
            registry.preload().await?;
        }
        Ok(registry)
    }

    /// Load every enabled language now
    pub async fn preload(&self) -> Result<()> {
        info!(
            "Loading {} models from {}",
            self.slots.len(),
            self.model_root.display()
        );
        for lang in self.languages() {
            if let Some(slot) = self.slots.get(&lang) {
                slot.get_or_try_init(|| self.load(lang)).await?;
            }
        }
        Ok(())
    }

    pub fn strategy(&self) -> LoadStrategy {
        self.strategy
    }

    /// Whether a language is enabled
    pub fn supports(&self, language: Language) -> bool {
        self.slots.contains_key(&language)
    }

    /// Enabled languages in canonical order
    pub fn languages(&self) -> Vec<Language> {
        Language::ALL
            .iter()
            .copied()
            .filter(|lang| self.supports(*lang))
            .collect()
    }

    /// Whether a cached model is resident for `language`
    pub fn is_loaded(&self, language: Language) -> bool {
        self.slots
            .get(&language)
            .map(|slot| slot.initialized())
            .unwrap_or(false)
    }

    /// Fetch the model for `language`, loading it as the strategy dictates
    pub async fn get(&self, language: Language) -> Result<Arc<dyn TranslationModel>> {
        let slot = self
            .slots
            .get(&language)
            .ok_or_else(|| TranslationError::UnsupportedLanguage(language.code().to_string()))?;

        match self.strategy {
            LoadStrategy::Eager | LoadStrategy::Lazy => {
                let model = slot.get_or_try_init(|| self.load(language)).await?;
                Ok(Arc::clone(model))
            }
            LoadStrategy::PerRequest => self.load(language).await,
        }
    }

    /// Run the loader on the blocking pool
    async fn load(&self, language: Language) -> Result<Arc<dyn TranslationModel>> {
        let dir = self.model_root.join(language.code());
        let loader = Arc::clone(&self.loader);
        debug!(language = %language, path = %dir.display(), "Loading model");

        tokio::task::spawn_blocking(move || loader.load(language, &dir)).await?
    }
}
