//! Search across every loaded event.

use campus_events_core::{OutputFormat, TextFormatter, to_json};

use crate::cli::Cli;
use crate::config::AppConfig;
use crate::error::AppResult;
use crate::page::search_events;

/// Loads every feed and prints the events matching `query`.
pub async fn run(cli: &Cli, config: &AppConfig, query: &str) -> AppResult<()> {
    let client = super::client(config)?;
    let loaded = super::load_feeds(config, &client).await?;
    let now = super::local_now(config)?;

    if let Some(banner) = loaded.banner() {
        eprintln!("{banner}");
    }
    let results = search_events(config, &loaded, query, now);

    match cli.output_format() {
        OutputFormat::Json => println!("{}", to_json(&results)?),
        OutputFormat::Text => {
            println!("{}", TextFormatter::new(config.text_options()).format_search(&results));
        }
    }
    Ok(())
}
