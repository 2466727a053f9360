//! Feed definitions and proxy settings.

use std::time::Duration;

use campus_events_core::{FeedId, SectionMeta};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{FeedResult, FetchError};

/// Default CORS proxy fronting the calendar publisher.
pub const DEFAULT_PROXY_URL: &str = "https://api.bruceelgort.com/get_data.php";

/// One configured feed: where it comes from and how its section is titled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedConfig {
    pub id: FeedId,
    /// Section title.
    pub title: String,
    /// Section intro text.
    #[serde(default)]
    pub description: String,
    /// Upstream RSS URL, passed to the proxy.
    pub upstream: String,
    /// Base URL feed links are rewritten onto. Also the section link.
    pub base_url: String,
}

impl FeedConfig {
    pub fn new(
        id: impl Into<FeedId>,
        title: impl Into<String>,
        upstream: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            upstream: upstream.into(),
            base_url: base_url.into(),
        }
    }

    /// Sets the section intro text.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// The college-wide events feed.
    pub fn general() -> Self {
        Self::new(
            "general",
            "Events at Clark College",
            "https://25livepub.collegenet.com/calendars/clark-events.rss",
            "https://www.clark.edu/about/calendars/events.php",
        )
        .with_description(
            "Displaying college community events, important dates, enrollment deadlines, \
             and student activities happening today and tomorrow.",
        )
    }

    /// The employee training feed.
    pub fn training() -> Self {
        Self::new(
            "training",
            "Employee Training and Development Events",
            "https://25livepub.collegenet.com/calendars/training-and-development.rss",
            "https://www.clark.edu/tlc/main-schedule.php",
        )
        .with_description(
            "These events are part of Clark College's Employee Training and Development \
             programs happening today and tomorrow.",
        )
    }

    /// Returns the feeds shown by default, in page order.
    pub fn defaults() -> Vec<Self> {
        vec![Self::general(), Self::training()]
    }

    /// Returns the static section description for this feed.
    pub fn meta(&self) -> SectionMeta {
        SectionMeta::new(self.id.clone(), self.title.clone())
            .with_description(self.description.clone())
            .with_link(self.base_url.clone())
    }

    /// Checks that the upstream and base URLs are absolute.
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming the offending field.
    pub fn validate(&self) -> FeedResult<()> {
        for (field, value) in [("upstream", &self.upstream), ("base_url", &self.base_url)] {
            Url::parse(value).map_err(|e| {
                FetchError::configuration(format!("invalid {field} URL {value:?}"))
                    .with_feed(self.id.as_str())
                    .with_source(e)
            })?;
        }
        Ok(())
    }
}

/// Settings of the HTTP proxy every feed is fetched through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    pub url: String,
    /// Per-request timeout, in milliseconds.
    pub timeout_ms: u64,
    pub user_agent: String,
}

impl ProxyConfig {
    /// Default per-request timeout in milliseconds.
    pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

    /// Sets the proxy URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Builds the proxied URL for an upstream feed.
    pub fn feed_url(&self, upstream: &str) -> String {
        format!("{}?feed={}", self.url, urlencoding::encode(upstream))
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_PROXY_URL.to_string(),
            timeout_ms: Self::DEFAULT_TIMEOUT_MS,
            user_agent: format!("campus-events/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}
