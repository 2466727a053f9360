//! campus-events CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use tracing::debug;

use campus_events_app::cli::{Cli, Command, ConfigAction};
use campus_events_app::commands;
use campus_events_app::config::AppConfig;
use campus_events_app::error::AppResult;
use campus_events_core::{TracingConfig, init_tracing};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(TracingConfig::from_flags(cli.debug, cli.log_json)) {
        eprintln!("error: {e}");
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> AppResult<()> {
    let config = match cli.config {
        Some(ref path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };
    debug!(feeds = config.feeds.len(), zone = %config.zone, "Loaded configuration");

    match cli.command {
        Some(Command::Config { ref action }) => match action {
            ConfigAction::Dump => commands::config::dump(&config),
            ConfigAction::Validate => commands::config::validate(&config),
            ConfigAction::Path => commands::config::path(),
        },
        Some(Command::Cache { install: false }) => commands::cache::manifest(&config),
        Some(Command::Cache { install: true }) => commands::cache::install(&config).await,
        Some(Command::Search { ref query }) => {
            config.validate()?;
            commands::search::run(&cli, &config, query).await
        }
        None => {
            config.validate()?;
            commands::page::run(&cli, &config).await
        }
    }
}
