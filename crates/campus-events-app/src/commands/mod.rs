//! Subcommand implementations.

pub mod cache;
pub mod config;
pub mod page;
pub mod search;

use std::sync::Arc;

use campus_events_feeds::{FeedSource, ProxyFeedSource, build_client};
use chrono::{DateTime, FixedOffset, Utc};

use crate::config::AppConfig;
use crate::error::AppResult;
use crate::loader::{FeedLoader, LoadedFeeds};

/// Fetches every configured feed through the proxy.
pub(crate) async fn load_feeds(config: &AppConfig, client: &reqwest::Client) -> AppResult<LoadedFeeds> {
    let mut loader = FeedLoader::new(config.loader);
    for feed in &config.feeds {
        let source: Arc<dyn FeedSource> =
            Arc::new(ProxyFeedSource::new(client.clone(), &config.proxy, feed));
        loader = loader.with_feed(feed.meta(), source, config.parser_for(feed)?);
    }
    Ok(loader.load().await)
}

/// Returns the local "now" in the configured zone.
pub(crate) fn local_now(config: &AppConfig) -> AppResult<DateTime<FixedOffset>> {
    Ok(campus_events_core::time::local_now(Utc::now(), config.zone()?))
}

/// Builds the HTTP client shared by feeds and the announcement.
pub(crate) fn client(config: &AppConfig) -> AppResult<reqwest::Client> {
    Ok(build_client(&config.proxy)?)
}
