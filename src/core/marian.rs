//! MarianMT inference on candle
//!
//! A model directory holds `config.json`, `model.safetensors`,
//! `tokenizer.json` for the source side and optionally
//! `tokenizer-target.json` when the target vocabulary differs.

use candle_core::{DType, Device, Tensor, D};
use candle_nn::VarBuilder;
use candle_transformers::models::marian;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokenizers::Tokenizer;
use tracing::{debug, info};

use crate::core::backend::{ModelLoader, TranslationModel};
use crate::core::config::ServiceConfig;
use crate::core::errors::{Result, TranslationError};
use crate::core::models::Language;

pub const CONFIG_FILE: &str = "config.json";
pub const WEIGHTS_FILE: &str = "model.safetensors";
pub const SOURCE_TOKENIZER_FILE: &str = "tokenizer.json";
pub const TARGET_TOKENIZER_FILE: &str = "tokenizer-target.json";

/// Truncate encoder ids to `max_length`, always ending with `eos`.
fn truncate_with_eos(mut ids: Vec<u32>, max_length: usize, eos: u32) -> Vec<u32> {
    if ids.last() == Some(&eos) {
        ids.pop();
    }
    ids.truncate(max_length.saturating_sub(1));
    ids.push(eos);
    ids
}

fn tokenizer_error(err: impl std::fmt::Display) -> TranslationError {
    TranslationError::TokenizerError {
        message: err.to_string(),
    }
}

/// Marian encoder-decoder with its tokenizers
pub struct MarianModel {
    language: Language,
    // decode() mutates the kv cache
    model: Mutex<marian::MTModel>,
    config: marian::Config,
    source_tokenizer: Tokenizer,
    target_tokenizer: Tokenizer,
    device: Device,
    max_length: usize,
}

impl MarianModel {
    fn encode(&self, text: &str) -> Result<Vec<u32>> {
        let encoding = self
            .source_tokenizer
            .encode(text, true)
            .map_err(tokenizer_error)?;
        Ok(truncate_with_eos(
            encoding.get_ids().to_vec(),
            self.max_length,
            self.config.eos_token_id,
        ))
    }

    /// Greedy decoding until end-of-sequence or `max_length` tokens
    fn generate(&self, input_ids: &[u32]) -> Result<Vec<u32>> {
        let mut model = self.model.lock().map_err(|_| TranslationError::InferenceError {
            message: format!("model for '{}' is poisoned", self.language),
        })?;
        model.reset_kv_cache();

        let input = Tensor::new(input_ids, &self.device)?.unsqueeze(0)?;
        let encoder_xs = model.encoder().forward(&input, 0)?;

        let mut tokens = vec![self.config.decoder_start_token_id];
        for step in 0..self.max_length {
            let context = if step == 0 { tokens.len() } else { 1 };
            let start = tokens.len() - context;
            let decoder_input = Tensor::new(&tokens[start..], &self.device)?.unsqueeze(0)?;
            let logits = model.decode(&decoder_input, &encoder_xs, start)?;
            let logits = logits.squeeze(0)?;
            let logits = logits.get(logits.dim(0)? - 1)?;
            let next = logits.argmax(D::Minus1)?.to_scalar::<u32>()?;
            tokens.push(next);
            if next == self.config.eos_token_id || next == self.config.forced_eos_token_id {
                break;
            }
        }

        Ok(tokens)
    }
}

impl TranslationModel for MarianModel {
    fn translate(&self, text: &str) -> Result<String> {
        let start = Instant::now();
        let input_ids = self.encode(text)?;
        let output_ids = self.generate(&input_ids)?;
        let translated = self
            .target_tokenizer
            .decode(&output_ids, true)
            .map_err(tokenizer_error)?;

        debug!(
            language = %self.language,
            input_tokens = input_ids.len(),
            output_tokens = output_ids.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Generated translation"
        );

        Ok(translated)
    }
}

/// Loads [`MarianModel`]s onto one device
#[derive(Debug, Clone)]
pub struct MarianLoader {
    device: Device,
    max_length: usize,
}

impl MarianLoader {
    pub fn new(device: Device, max_length: usize) -> Self {
        Self { device, max_length }
    }

    /// CPU unless `use_gpu` is set and CUDA is present
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        let device = if config.use_gpu {
            Device::cuda_if_available(0)?
        } else {
            Device::Cpu
        };
        info!("Using device {:?} for inference", device);
        Ok(Self::new(device, config.max_length))
    }

    /// Read the Marian artifacts under `dir`
    pub fn load_model(&self, language: Language, dir: &Path) -> Result<MarianModel> {
        let load_error = |message: String| TranslationError::ModelLoadError {
            language: language.code().to_string(),
            path: dir.display().to_string(),
            message,
        };

        let raw = std::fs::read_to_string(dir.join(CONFIG_FILE))
            .map_err(|e| load_error(format!("{}: {}", CONFIG_FILE, e)))?;
        let config: marian::Config = serde_json::from_str(&raw)
            .map_err(|e| load_error(format!("{}: {}", CONFIG_FILE, e)))?;

        let source_tokenizer = Tokenizer::from_file(dir.join(SOURCE_TOKENIZER_FILE))
            .map_err(|e| load_error(format!("{}: {}", SOURCE_TOKENIZER_FILE, e)))?;
        let target_path = dir.join(TARGET_TOKENIZER_FILE);
        let target_tokenizer = if target_path.exists() {
            Tokenizer::from_file(&target_path)
                .map_err(|e| load_error(format!("{}: {}", TARGET_TOKENIZER_FILE, e)))?
        } else {
            source_tokenizer.clone()
        };

        let tensors = candle_core::safetensors::load(dir.join(WEIGHTS_FILE), &self.device)
            .map_err(|e| load_error(format!("{}: {}", WEIGHTS_FILE, e)))?;
        let vb = VarBuilder::from_tensors(tensors, DType::F32, &self.device);
        let model = marian::MTModel::new(&config, vb).map_err(|e| load_error(e.to_string()))?;

        info!(language = %language, path = %dir.display(), "Loaded Marian model");

        Ok(MarianModel {
            language,
            model: Mutex::new(model),
            config,
            source_tokenizer,
            target_tokenizer,
            device: self.device.clone(),
            max_length: self.max_length,
        })
    }
}

impl ModelLoader for MarianLoader {
    fn load(&self, language: Language, dir: &Path) -> Result<Arc<dyn TranslationModel>> {
        Ok(Arc::new(self.load_model(language, dir)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_nn::VarMap;

    const TINY_CONFIG: &str = r#"{
        "vocab_size": 16,
        "decoder_vocab_size": 16,
        "max_position_embeddings": 64,
        "encoder_layers": 1,
        "encoder_ffn_dim": 16,
        "encoder_attention_heads": 2,
        "decoder_layers": 1,
        "decoder_ffn_dim": 16,
        "decoder_attention_heads": 2,
        "use_cache": true,
        "is_encoder_decoder": true,
        "activation_function": "swish",
        "d_model": 8,
        "decoder_start_token_id": 15,
        "scale_embedding": true,
        "pad_token_id": 15,
        "eos_token_id": 0,
        "forced_eos_token_id": 0,
        "share_encoder_decoder_embeddings": true
    }"#;

    fn special_token(id: u32, content: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "content": content,
            "single_word": false,
            "lstrip": false,
            "rstrip": false,
            "normalized": false,
            "special": true
        })
    }

    /// Write a randomly initialised 16-token Marian model into `dir`
    fn write_tiny_model(dir: &Path) {
        std::fs::write(dir.join(CONFIG_FILE), TINY_CONFIG).unwrap();

        let config: marian::Config = serde_json::from_str(TINY_CONFIG).unwrap();
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
        marian::MTModel::new(&config, vb).unwrap();
        varmap.save(dir.join(WEIGHTS_FILE)).unwrap();

        let mut vocab = serde_json::Map::new();
        vocab.insert("</s>".to_string(), 0.into());
        vocab.insert("<unk>".to_string(), 1.into());
        for id in 2..15 {
            vocab.insert(format!("w{}", id), id.into());
        }
        vocab.insert("<pad>".to_string(), 15.into());

        let tokenizer = serde_json::json!({
            "version": "1.0",
            "truncation": null,
            "padding": null,
            "added_tokens": [special_token(0, "</s>"), special_token(15, "<pad>")],
            "normalizer": null,
            "pre_tokenizer": { "type": "WhitespaceSplit" },
            "post_processor": null,
            "decoder": null,
            "model": { "type": "WordLevel", "vocab": vocab, "unk_token": "<unk>" }
        });
        std::fs::write(dir.join(SOURCE_TOKENIZER_FILE), tokenizer.to_string()).unwrap();
    }

    #[test]
    fn test_tiny_model_translates() {
        let dir = tempfile::tempdir().unwrap();
        write_tiny_model(dir.path());

        let loader = MarianLoader::new(Device::Cpu, 8);
        let model = loader.load_model(Language::Hindi, dir.path()).unwrap();

        let translated = model.translate("w2 w3 w4").unwrap();
        assert!(!translated.contains("</s>"));
        assert!(!translated.contains("<pad>"));
        assert!(translated.split_whitespace().count() <= 8);

        // same model again, so the kv cache must have been reset
        assert_eq!(model.translate("w2 w3 w4").unwrap(), translated);
    }

    #[test]
    fn test_tiny_model_truncates_long_input() {
        let dir = tempfile::tempdir().unwrap();
        write_tiny_model(dir.path());

        let loader = MarianLoader::new(Device::Cpu, 8);
        let model = loader.load_model(Language::Arabic, dir.path()).unwrap();

        let long_input = (0..40)
            .map(|i| format!("w{}", 2 + i % 13))
            .collect::<Vec<_>>()
            .join(" ");

        let ids = model.encode(&long_input).unwrap();
        assert_eq!(ids.len(), 8);
        assert_eq!(*ids.last().unwrap(), 0);

        assert!(model.translate(&long_input).is_ok());
    }

    #[test]
    fn test_loader_trait_returns_shared_model() {
        let dir = tempfile::tempdir().unwrap();
        write_tiny_model(dir.path());

        let loader: Arc<dyn ModelLoader> = Arc::new(MarianLoader::new(Device::Cpu, 8));
        let model = loader.load(Language::Urdu, dir.path()).unwrap();
        assert!(model.translate("w5").is_ok());
    }

    #[test]
    fn test_truncate_keeps_short_input() {
        assert_eq!(truncate_with_eos(vec![5, 6, 0], 512, 0), vec![5, 6, 0]);
        assert_eq!(truncate_with_eos(vec![5, 6], 512, 0), vec![5, 6, 0]);
    }

    #[test]
    fn test_truncate_caps_length_including_eos() {
        let ids: Vec<u32> = (1..=600).collect();
        let truncated = truncate_with_eos(ids, 512, 0);
        assert_eq!(truncated.len(), 512);
        assert_eq!(truncated[510], 511);
        assert_eq!(*truncated.last().unwrap(), 0);
    }

    #[test]
    fn test_load_fails_without_config() {
        let dir = tempfile::tempdir().unwrap();
        let loader = MarianLoader::new(Device::Cpu, 512);

        let err = match loader.load(Language::Hindi, dir.path()) {
            Ok(_) => panic!("empty directory should not load"),
            Err(e) => e,
        };
        assert!(matches!(err, TranslationError::ModelLoadError { ref language, .. } if language == "hi"));
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn test_load_fails_on_malformed_config() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "{ not json").unwrap();
        let loader = MarianLoader::new(Device::Cpu, 512);

        match loader.load(Language::Urdu, dir.path()) {
            Ok(_) => panic!("malformed config should not load"),
            Err(e) => assert!(e.to_string().contains(CONFIG_FILE)),
        }
    }
}
