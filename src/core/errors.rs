//! Custom error types for translation operations

use thiserror::Error;

/// Translation-related errors
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Request text was empty
    #[error("Text input cannot be empty")]
    EmptyText,

    /// Request text exceeds the character limit
    #[error("Text input is too long, maximum length is {max} characters")]
    TextTooLong {
        max: usize,
    },

    /// Language code not known or not enabled
    #[error("Language '{0}' not supported")]
    UnsupportedLanguage(String),

    /// Model artifacts could not be loaded
    #[error("Failed to load model for '{language}' from {path}: {message}")]
    ModelLoadError {
        language: String,
        path: String,
        message: String,
    },

    /// Tokenizer failed to encode or decode
    #[error("Tokenizer error: {message}")]
    TokenizerError {
        message: String,
    },

    /// Generation failed
    #[error("Inference error: {message}")]
    InferenceError {
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
    },

    /// Wrapper for anyhow errors
    #[error("Internal error: {0}")]
    InternalError(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Tensor backend error
    #[error("Tensor error: {0}")]
    CandleError(#[from] candle_core::Error),
}

impl TranslationError {
    /// Whether the caller is at fault (bad text or language)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            TranslationError::EmptyText
                | TranslationError::TextTooLong { .. }
                | TranslationError::UnsupportedLanguage(_)
        )
    }

    /// HTTP status code this error maps to
    pub fn status_code(&self) -> u16 {
        if self.is_client_error() {
            400
        } else {
            500
        }
    }
}

impl From<anyhow::Error> for TranslationError {
    fn from(err: anyhow::Error) -> Self {
        TranslationError::InternalError(err.to_string())
    }
}

impl From<tokio::task::JoinError> for TranslationError {
    fn from(err: tokio::task::JoinError) -> Self {
        TranslationError::InternalError(format!("blocking task failed: {}", err))
    }
}

/// Result type for translation operations
pub type Result<T> = std::result::Result<T, TranslationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_map_to_400() {
        assert_eq!(TranslationError::EmptyText.status_code(), 400);
        assert_eq!(TranslationError::TextTooLong { max: 512 }.status_code(), 400);
        assert_eq!(
            TranslationError::UnsupportedLanguage("fr".to_string()).status_code(),
            400
        );
    }

    #[test]
    fn test_internal_errors_map_to_500() {
        let load = TranslationError::ModelLoadError {
            language: "hi".to_string(),
            path: "./Indian/hi".to_string(),
            message: "missing config.json".to_string(),
        };
        assert_eq!(load.status_code(), 500);
        assert_eq!(
            TranslationError::InferenceError { message: "boom".to_string() }.status_code(),
            500
        );
        assert_eq!(TranslationError::InternalError("x".to_string()).status_code(), 500);
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            TranslationError::TextTooLong { max: 512 }.to_string(),
            "Text input is too long, maximum length is 512 characters"
        );
        assert_eq!(
            TranslationError::UnsupportedLanguage("fr".to_string()).to_string(),
            "Language 'fr' not supported"
        );
    }
}
