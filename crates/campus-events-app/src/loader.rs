//! Concurrent feed loading with a global deadline.
//!
//! Every feed is fetched and parsed at the same time. A feed that fails is
//! replaced by an empty one; the page only shows the error banner when every
//! feed failed or the global deadline passed. A shorter timer flags the load
//! as slow through a [`watch`] channel without touching the result.

use std::sync::Arc;
use std::time::Duration;

use campus_events_core::{FeedEvents, LOAD_FAILED_MESSAGE, SectionMeta};
use campus_events_feeds::{FeedParser, FeedSource, FetchError, ParseReport, load_feed};
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Timers of a page load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Milliseconds after which the whole load is abandoned.
    pub timeout_ms: u64,
    /// Milliseconds after which the load is reported as slow.
    pub slow_after_ms: u64,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            slow_after_ms: 2_000,
        }
    }
}

impl LoaderConfig {
    /// Builder: set the global timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = millis(timeout);
        self
    }

    /// Builder: set the slow-load threshold.
    pub fn with_slow_after(mut self, slow_after: Duration) -> Self {
        self.slow_after_ms = millis(slow_after);
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn slow_after(&self) -> Duration {
        Duration::from_millis(self.slow_after_ms)
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Progress of a load, as seen by a loading indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    /// Still loading after the slow threshold.
    Slow,
    Done,
}

/// The result of loading one feed.
#[derive(Debug)]
pub struct FeedOutcome {
    pub meta: SectionMeta,
    pub result: Result<ParseReport, FetchError>,
}

impl FeedOutcome {
    /// Returns the parsed events; a failed feed has none.
    pub fn events(&self) -> &[campus_events_core::Event] {
        match &self.result {
            Ok(report) => &report.events,
            Err(_) => &[],
        }
    }

    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// The result of a whole load.
#[derive(Debug)]
pub struct LoadedFeeds {
    pub feeds: Vec<FeedOutcome>,
    /// The global deadline passed before every feed finished.
    pub timed_out: bool,
    /// The slow threshold passed before every feed finished.
    pub was_slow: bool,
}

impl LoadedFeeds {
    /// Returns the error banner, if the page is in the error state.
    pub fn banner(&self) -> Option<&'static str> {
        let all_failed = !self.feeds.is_empty() && self.feeds.iter().all(|f| !f.is_ok());
        (self.timed_out || all_failed).then_some(LOAD_FAILED_MESSAGE)
    }

    /// Returns the events of every feed, failed feeds being empty.
    pub fn feed_events(&self) -> Vec<FeedEvents> {
        self.feeds
            .iter()
            .map(|f| FeedEvents {
                meta: f.meta.clone(),
                events: f.events().to_vec(),
            })
            .collect()
    }
}

struct LoaderFeed {
    meta: SectionMeta,
    source: Arc<dyn FeedSource>,
    parser: FeedParser,
}

/// Loads a set of feeds concurrently.
pub struct FeedLoader {
    config: LoaderConfig,
    feeds: Vec<LoaderFeed>,
    status: watch::Sender<LoadStatus>,
}

impl FeedLoader {
    pub fn new(config: LoaderConfig) -> Self {
        let (status, _) = watch::channel(LoadStatus::Idle);
        Self {
            config,
            feeds: Vec::new(),
            status,
        }
    }

    /// Builder: add a feed. Sections keep the order feeds are added in.
    pub fn with_feed(
        mut self,
        meta: SectionMeta,
        source: Arc<dyn FeedSource>,
        parser: FeedParser,
    ) -> Self {
        self.feeds.push(LoaderFeed {
            meta,
            source,
            parser,
        });
        self
    }

    /// Subscribes to load progress.
    pub fn subscribe(&self) -> watch::Receiver<LoadStatus> {
        self.status.subscribe()
    }

    /// Loads every feed.
    pub async fn load(&self) -> LoadedFeeds {
        self.status.send_replace(LoadStatus::Loading);

        let loads = join_all(self.feeds.iter().map(|feed| async move {
            let result = load_feed(feed.source.as_ref(), &feed.parser).await;
            match &result {
                Ok(report) => debug!(
                    feed = %feed.meta.feed,
                    events = report.events.len(),
                    skipped = report.skipped,
                    "Feed loaded"
                ),
                Err(e) => warn!(feed = %feed.meta.feed, error = %e, "Feed failed, showing it empty"),
            }
            FeedOutcome {
                meta: feed.meta.clone(),
                result,
            }
        }));
        tokio::pin!(loads);

        let slow = tokio::time::sleep(self.config.slow_after());
        tokio::pin!(slow);
        let deadline = tokio::time::sleep(self.config.timeout());
        tokio::pin!(deadline);

        let mut was_slow = false;
        let finished = loop {
            tokio::select! {
                outcomes = &mut loads => break Some(outcomes),
                () = &mut slow, if !was_slow => {
                    was_slow = true;
                    self.status.send_replace(LoadStatus::Slow);
                    info!(after = ?self.config.slow_after(), "Feeds are still loading");
                }
                () = &mut deadline => break None,
            }
        };
        self.status.send_replace(LoadStatus::Done);

        match finished {
            Some(feeds) => LoadedFeeds {
                feeds,
                timed_out: false,
                was_slow,
            },
            None => {
                warn!(timeout = ?self.config.timeout(), "Feed load timed out");
                let feeds = self
                    .feeds
                    .iter()
                    .map(|feed| FeedOutcome {
                        meta: feed.meta.clone(),
                        result: Err(FetchError::timeout("page load timed out")
                            .with_feed(feed.meta.feed.as_str())),
                    })
                    .collect();
                LoadedFeeds {
                    feeds,
                    timed_out: true,
                    was_slow,
                }
            }
        }
    }
}
