//! Indic Translator - MarianMT translation service
//!
//! This library loads pretrained MarianMT models for a fixed set of target
//! languages and serves them over a small HTTP API.

#![forbid(unsafe_code)]

pub mod cli;
pub mod core;
pub mod server;

// Re-export key types for convenience
pub use crate::core::{
    backend::{ModelLoader, TranslationModel},
    config::{LoadStrategy, ServiceConfig},
    errors::TranslationError,
    marian::MarianLoader,
    models::{Language, TranslationRequest, TranslationResult, MAX_TEXT_CHARS},
    registry::ModelRegistry,
    translator::Translator,
};

pub use crate::server::api::{build_router, run_server, AppState};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
