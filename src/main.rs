//! Main entry point for the Indic translator CLI

#![forbid(unsafe_code)]

use clap::Parser;
use dotenvy::dotenv;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use indic_translator::cli::commands::{self, Commands};

/// MarianMT translation API for Indian languages
#[derive(Parser, Debug)]
#[command(name = "indic-translator", version, about, long_about = None)]
struct Args {
    /// JSON or YAML configuration file (defaults to environment variables)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "{}={},tower_http={}",
                    env!("CARGO_CRATE_NAME"),
                    log_level,
                    log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = commands::load_config(args.config.as_deref())?;

    // Execute command
    match args.command {
        Some(Commands::Serve {
            host,
            port,
            model_root,
            strategy,
        }) => {
            commands::handle_serve(config, host, port, model_root, strategy).await?;
        }
        Some(Commands::Translate {
            text,
            language,
            model_root,
        }) => {
            commands::handle_translate(config, text, language, model_root).await?;
        }
        Some(Commands::Languages) => {
            commands::handle_languages(&config);
        }
        None => {
            println!("Please specify a command. Use --help for more information.");
        }
    }

    Ok(())
}
