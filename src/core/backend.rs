//! Model backend traits
//!
//! The registry only sees these two traits. Production uses the Marian
//! loader in [`crate::core::marian`]; tests plug in their own.

use std::path::Path;
use std::sync::Arc;

use crate::core::errors::Result;
use crate::core::models::Language;

/// A loaded model/tokenizer pair for one language
pub trait TranslationModel: Send + Sync {
    /// Translate `text` into the model's target language. Blocking.
    fn translate(&self, text: &str) -> Result<String>;
}

/// Reads a [`TranslationModel`] from a model directory
pub trait ModelLoader: Send + Sync {
    /// Load the pair stored under `dir`. Blocking.
    fn load(&self, language: Language, dir: &Path) -> Result<Arc<dyn TranslationModel>>;
}
