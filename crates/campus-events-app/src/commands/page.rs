//! The default command: print the events page.

use campus_events_core::{OutputFormat, TextFormatter, to_json};
use tracing::debug;

use crate::announcement::fetch_announcement;
use crate::cli::Cli;
use crate::config::AppConfig;
use crate::error::AppResult;
use crate::page::build_page;

/// Loads every feed and prints the page.
pub async fn run(cli: &Cli, config: &AppConfig) -> AppResult<()> {
    let client = super::client(config)?;
    let announcement_url = config.messages_url.as_deref().filter(|_| !cli.no_announcement);

    let (loaded, announcement) = tokio::join!(super::load_feeds(config, &client), async {
        match announcement_url {
            Some(url) => fetch_announcement(&client, url).await,
            None => None,
        }
    });
    let loaded = loaded?;

    let now = super::local_now(config)?;
    let page = build_page(config, &loaded, announcement, cli.filter.as_deref(), now);
    debug!(sections = page.sections.len(), error = ?page.error, "Built page");

    match cli.output_format() {
        OutputFormat::Json => println!("{}", to_json(&page)?),
        OutputFormat::Text => {
            let mut options = config.text_options();
            options.expand_all = cli.expand_all;
            if cli.max_title_length.is_some() {
                options.max_title_length = cli.max_title_length;
            }
            println!("{}", TextFormatter::new(options).format_page(&page, &cli.disclosure()));
        }
    }
    Ok(())
}
