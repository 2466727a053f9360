//! Page assembly from loaded feeds.

use campus_events_core::{PageView, SearchResults, apply_filter, project_section, search};
use chrono::{DateTime, FixedOffset};
use tracing::debug;

use crate::config::AppConfig;
use crate::loader::LoadedFeeds;

/// Builds the page for the given local "now".
///
/// Each feed becomes one section, in config order. A `filter` query hides the
/// events it does not match.
pub fn build_page(
    config: &AppConfig,
    loaded: &LoadedFeeds,
    announcement: Option<String>,
    filter: Option<&str>,
    now: DateTime<FixedOffset>,
) -> PageView {
    let mut page = PageView::new(config.heading.clone(), &now);
    page.announcement = announcement;
    page.error = loaded.banner().map(str::to_string);

    let bucketizer = config.bucketizer();
    let options = config.view_options();
    for feed in &loaded.feeds {
        let buckets = bucketizer.bucketize(feed.events(), now);
        let mut section = project_section(feed.meta.clone(), &buckets, &options);
        if let Some(query) = filter {
            let visible = apply_filter(&mut section, query, config.min_query_len);
            debug!(feed = %feed.meta.feed, query, visible, "Applied filter");
        }
        page.sections.push(section);
    }
    page
}

/// Searches every loaded event, regardless of day window.
pub fn search_events(
    config: &AppConfig,
    loaded: &LoadedFeeds,
    query: &str,
    now: DateTime<FixedOffset>,
) -> SearchResults {
    search(
        &loaded.feed_events(),
        query,
        config.min_query_len,
        &now,
        &config.view_options(),
    )
}
