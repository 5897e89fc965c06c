//! Configuration management

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, warn};

use crate::core::errors::{Result, TranslationError};
use crate::core::models::{Language, MAX_TEXT_CHARS};

/// When models are read from disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoadStrategy {
    /// Load every language at startup
    #[default]
    Eager,
    /// Load a language on first use and keep it
    Lazy,
    /// Load for each request and drop afterwards
    PerRequest,
}

impl fmt::Display for LoadStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadStrategy::Eager => write!(f, "eager"),
            LoadStrategy::Lazy => write!(f, "lazy"),
            LoadStrategy::PerRequest => write!(f, "per-request"),
        }
    }
}

impl FromStr for LoadStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "eager" => Ok(LoadStrategy::Eager),
            "lazy" => Ok(LoadStrategy::Lazy),
            "per-request" | "per_request" => Ok(LoadStrategy::PerRequest),
            other => Err(format!(
                "unknown load strategy '{}', expected eager, lazy or per-request",
                other
            )),
        }
    }
}

/// Service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub model_root: PathBuf,
    pub languages: Vec<Language>,
    pub load_strategy: LoadStrategy,
    pub max_text_chars: usize,
    pub max_length: usize,
    pub max_concurrent: usize,
    pub use_gpu: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            model_root: PathBuf::from("./Indian"),
            languages: Language::ALL.to_vec(),
            load_strategy: LoadStrategy::Eager,
            max_text_chars: MAX_TEXT_CHARS,
            max_length: 512,
            max_concurrent: 4,
            use_gpu: false,
        }
    }
}

fn parse_var<T: FromStr>(name: &str, value: Option<String>, default: T) -> Result<T>
where
    T::Err: fmt::Display,
{
    match value {
        Some(raw) => raw.trim().parse::<T>().map_err(|e| TranslationError::ConfigError {
            message: format!("{}: {}", name, e),
        }),
        None => Ok(default),
    }
}

fn parse_languages(raw: &str) -> Result<Vec<Language>> {
    raw.split(',')
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(|code| {
            code.parse::<Language>().map_err(|_| TranslationError::ConfigError {
                message: format!("LANGUAGES: unknown language code '{}'", code),
            })
        })
        .collect()
}

impl ServiceConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let languages = match lookup("LANGUAGES") {
            Some(raw) => parse_languages(&raw)?,
            None => defaults.languages,
        };

        Ok(Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_var("PORT", lookup("PORT"), defaults.port)?,
            model_root: lookup("MODEL_ROOT")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_root),
            languages,
            load_strategy: parse_var(
                "LOAD_STRATEGY",
                lookup("LOAD_STRATEGY"),
                defaults.load_strategy,
            )?,
            max_text_chars: parse_var(
                "MAX_TEXT_CHARS",
                lookup("MAX_TEXT_CHARS"),
                defaults.max_text_chars,
            )?,
            max_length: parse_var("MAX_LENGTH", lookup("MAX_LENGTH"), defaults.max_length)?,
            max_concurrent: parse_var(
                "MAX_CONCURRENT",
                lookup("MAX_CONCURRENT"),
                defaults.max_concurrent,
            )?,
            use_gpu: parse_var("USE_GPU", lookup("USE_GPU"), defaults.use_gpu)?,
        })
    }

    /// Load from a JSON or YAML file, chosen by extension
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config: Self = match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)?,
            _ => serde_json::from_str(&content)?,
        };
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Save configuration to file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let fail = |message: &str| {
            Err(TranslationError::ConfigError {
                message: message.to_string(),
            })
        };

        if self.languages.is_empty() {
            return fail("at least one language must be enabled");
        }

        for (i, lang) in self.languages.iter().enumerate() {
            if self.languages[..i].contains(lang) {
                return Err(TranslationError::ConfigError {
                    message: format!("language '{}' listed more than once", lang),
                });
            }
        }

        if self.port == 0 {
            return fail("port must be greater than 0");
        }

        if self.max_text_chars == 0 {
            return fail("max_text_chars must be greater than 0");
        }

        if self.max_length < 2 {
            return fail("max_length must leave room for at least one token");
        }

        if self.max_concurrent == 0 {
            return fail("max_concurrent must be greater than 0");
        }

        if !self.model_root.exists() {
            warn!("Model root {} does not exist", self.model_root.display());
        }

        Ok(())
    }

    /// Directory holding the pretrained artifacts for a language
    pub fn model_dir(&self, language: Language) -> PathBuf {
        self.model_root.join(language.code())
    }
}
