//! Core data models for translation

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::errors::{Result, TranslationError};

/// Maximum number of characters accepted in a single request
pub const MAX_TEXT_CHARS: usize = 512;

/// Target languages with a pretrained model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    /// Hindi (`hi`)
    #[serde(rename = "hi")]
    Hindi,
    /// Arabic (`ar`)
    #[serde(rename = "ar")]
    Arabic,
    /// Urdu (`ur`)
    #[serde(rename = "ur")]
    Urdu,
    /// Tagalog (`tl`)
    #[serde(rename = "tl")]
    Tagalog,
}

impl Language {
    /// Every language the service knows how to load
    pub const ALL: [Language; 4] = [
        Language::Hindi,
        Language::Arabic,
        Language::Urdu,
        Language::Tagalog,
    ];

    /// Short code used on the wire and as the model directory name
    pub fn code(&self) -> &'static str {
        match self {
            Language::Hindi => "hi",
            Language::Arabic => "ar",
            Language::Urdu => "ur",
            Language::Tagalog => "tl",
        }
    }

    /// English name
    pub fn name(&self) -> &'static str {
        match self {
            Language::Hindi => "Hindi",
            Language::Arabic => "Arabic",
            Language::Urdu => "Urdu",
            Language::Tagalog => "Tagalog",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Language {
    type Err = TranslationError;

    fn from_str(s: &str) -> Result<Self> {
        Language::ALL
            .iter()
            .copied()
            .find(|lang| lang.code() == s)
            .ok_or_else(|| TranslationError::UnsupportedLanguage(s.to_string()))
    }
}

/// Translation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationRequest {
    pub text: String,
    pub language: String,
}

impl TranslationRequest {
    pub fn new(text: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            language: language.into(),
        }
    }

    /// Check the text is non-empty and at most `max_chars` characters.
    ///
    /// Length is counted in Unicode scalar values, so Devanagari or Arabic
    /// input is not penalised for its UTF-8 width.
    pub fn validate_text(&self, max_chars: usize) -> Result<()> {
        if self.text.is_empty() {
            return Err(TranslationError::EmptyText);
        }
        if self.text.chars().count() > max_chars {
            return Err(TranslationError::TextTooLong { max: max_chars });
        }
        Ok(())
    }
}

/// Translation result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationResult {
    pub translated_text: String,
    pub language: Language,
    pub elapsed_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_round_trips_through_code() {
        for lang in Language::ALL {
            assert_eq!(lang.code().parse::<Language>().unwrap(), lang);
        }
    }

    #[test]
    fn test_unknown_language_is_unsupported() {
        let err = "fr".parse::<Language>().unwrap_err();
        assert!(matches!(err, TranslationError::UnsupportedLanguage(ref code) if code == "fr"));
        assert!("HI".parse::<Language>().is_err());
    }

    #[test]
    fn test_language_serde_uses_codes() {
        let json = serde_json::to_string(&Language::Urdu).unwrap();
        assert_eq!(json, "\"ur\"");
        let lang: Language = serde_json::from_str("\"tl\"").unwrap();
        assert_eq!(lang, Language::Tagalog);
    }

    #[test]
    fn test_empty_text_rejected() {
        let request = TranslationRequest::new("", "hi");
        assert!(matches!(
            request.validate_text(MAX_TEXT_CHARS),
            Err(TranslationError::EmptyText)
        ));
    }

    #[test]
    fn test_whitespace_is_not_empty() {
        let request = TranslationRequest::new("   ", "hi");
        assert!(request.validate_text(MAX_TEXT_CHARS).is_ok());
    }

    #[test]
    fn test_length_limit_is_inclusive() {
        let ok = TranslationRequest::new("a".repeat(512), "hi");
        assert!(ok.validate_text(MAX_TEXT_CHARS).is_ok());

        let too_long = TranslationRequest::new("a".repeat(513), "hi");
        assert!(matches!(
            too_long.validate_text(MAX_TEXT_CHARS),
            Err(TranslationError::TextTooLong { max: 512 })
        ));
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        // 512 Devanagari characters are 1536 bytes
        let request = TranslationRequest::new("न".repeat(512), "hi");
        assert!(request.validate_text(MAX_TEXT_CHARS).is_ok());
    }
}
