//! CLI command definitions and handlers

use clap::Subcommand;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::core::config::{LoadStrategy, ServiceConfig};
use crate::core::models::Language;
use crate::core::translator::Translator;

/// Commands for the Indic translator
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP API server
    Serve {
        /// Bind address (default: 0.0.0.0)
        #[arg(long)]
        host: Option<String>,

        /// Listen port (default: 8000)
        #[arg(short, long)]
        port: Option<u16>,

        /// Directory containing one model directory per language code
        #[arg(long)]
        model_root: Option<PathBuf>,

        /// When to load models: eager, lazy or per-request
        #[arg(long)]
        strategy: Option<LoadStrategy>,
    },

    /// Translate a single text without starting the server
    Translate {
        /// Text to translate
        #[arg(short, long)]
        text: String,

        /// Target language code (hi, ar, ur, tl)
        #[arg(short, long)]
        language: String,

        /// Directory containing one model directory per language code
        #[arg(long)]
        model_root: Option<PathBuf>,
    },

    /// List supported language codes
    Languages,
}

/// Resolve the configuration: file if given, otherwise environment
pub fn load_config(path: Option<&Path>) -> anyhow::Result<ServiceConfig> {
    let config = match path {
        Some(path) => ServiceConfig::from_file(path)?,
        None => ServiceConfig::from_env()?,
    };
    Ok(config)
}

/// Handle server command
pub async fn handle_serve(
    mut config: ServiceConfig,
    host: Option<String>,
    port: Option<u16>,
    model_root: Option<PathBuf>,
    strategy: Option<LoadStrategy>,
) -> anyhow::Result<()> {
    use crate::server::api::run_server;

    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }
    if let Some(model_root) = model_root {
        config.model_root = model_root;
    }
    if let Some(strategy) = strategy {
        config.load_strategy = strategy;
    }
    config.validate()?;

    info!("Starting HTTP server on {}:{}", config.host, config.port);
    println!("🚀 Server starting on http://{}:{}", config.host, config.port);
    println!("📄 OpenAPI document: http://{}:{}/openapi.json", config.host, config.port);

    run_server(config).await?;

    Ok(())
}

/// Handle one-shot translation command
pub async fn handle_translate(
    mut config: ServiceConfig,
    text: String,
    language: String,
    model_root: Option<PathBuf>,
) -> anyhow::Result<()> {
    if let Some(model_root) = model_root {
        config.model_root = model_root;
    }

    // only the requested model is needed
    config.load_strategy = LoadStrategy::Lazy;

    let translator = Translator::from_config(&config).await?;
    let translated = translator.translate_text(&text, &language).await?;

    println!("{}", translated);

    Ok(())
}

/// Handle languages command
pub fn handle_languages(config: &ServiceConfig) {
    for lang in Language::ALL {
        let marker = if config.languages.contains(&lang) {
            "enabled"
        } else {
            "disabled"
        };
        println!(
            "{}  {:<8} {:<8} {}",
            lang.code(),
            lang.name(),
            marker,
            config.model_dir(lang).display()
        );
    }
}
