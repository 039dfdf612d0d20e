//! Notat CLI entry point.

use clap::Parser;
use notat::cli::{commands, Cli, Commands, Output};
use notat::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("notat={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Load configuration
    let settings = match &cli.config {
        Some(path) => Settings::load_from(Some(&std::path::PathBuf::from(path)))?,
        None => Settings::load()?,
    };

    // Execute command; every failure surfaces as a single styled message
    let result = match &cli.command {
        Commands::Notes { url, json } => commands::run_notes(url, *json, settings).await,

        Commands::Transcript { url, output } => {
            commands::run_transcript(url, output.clone(), settings).await
        }

        Commands::Doctor => {
            commands::run_doctor(&settings)?;
            Ok(())
        }

        Commands::Config { action } => {
            commands::run_config(action, settings)?;
            Ok(())
        }
    };

    if let Err(e) = result {
        Output::error(&e.to_string());
        std::process::exit(1);
    }

    Ok(())
}
