// Mend Coding Assistant
// Main entry point for the mend binary

use clap::Parser;
use mend_engine::cli::{Cli, Command};
use mend_engine::config::Config;
use mend_engine::handlers::{
    handle_ask, handle_clear, handle_doctor, handle_run, OutputFormat,
};
use mend_engine::repl;
use mend_engine::telemetry::{init_telemetry, init_telemetry_with_level};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize basic telemetry first (before config is loaded)
    init_telemetry();

    let version = env!("CARGO_PKG_VERSION");
    let commit = env!("GIT_COMMIT_HASH");
    let timestamp = env!("BUILD_TIMESTAMP");

    tracing::info!("Mend v{} ({} - {})", version, commit, timestamp);

    // Determine output format
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    // Load configuration (or use custom path if provided)
    let config = if let Some(config_path) = &cli.config {
        Config::load_from_path(config_path)?
    } else {
        Config::load_or_create()?
    };

    // Re-initialize telemetry with the configured log level, unless the
    // --log flag overrides it
    let log_level = cli.log.as_deref().unwrap_or(&config.core.log_level);
    init_telemetry_with_level(log_level);

    // Handle commands; no command starts the interactive session
    match cli.command {
        None | Some(Command::Session) => {
            repl::run(&config).await?;
            Ok(())
        }

        Some(Command::Run { task }) => handle_run(task, &config, format).await,

        Some(Command::Ask { prompt }) => handle_ask(prompt, &config, format).await,

        Some(Command::Clear) => handle_clear(&config, format).await,

        Some(Command::Doctor) => handle_doctor(&config, format).await,
    }
}
