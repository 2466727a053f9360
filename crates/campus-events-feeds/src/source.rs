//! The [`FeedSource`] trait.
//!
//! A source delivers the raw text of one feed document. The HTTP proxy source
//! lives in [`crate::http`]; [`StaticSource`] serves fixed content for offline
//! use and tests.

use std::future::Future;
use std::pin::Pin;

use campus_events_core::FeedId;
use tracing::debug;

use crate::error::{FeedResult, FetchError, FetchErrorCode};
use crate::rss::{FeedParser, ParseReport};

/// A boxed future for trait methods that must stay object-safe.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Delivers the raw RSS text of a feed.
///
/// Implementations must be `Send + Sync` so feeds can be fetched concurrently.
pub trait FeedSource: Send + Sync {
    /// Returns the id of the feed this source serves.
    fn id(&self) -> &FeedId;

    /// Fetches the feed document.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] on network failure, timeout or a non-success
    /// status from the proxy.
    fn fetch(&self) -> BoxFuture<'_, FeedResult<String>>;
}

/// Fetches a feed and parses it.
///
/// # Errors
///
/// Returns the fetch error, tagged with the feed id. Parse problems are not
/// errors; they are reported in the returned [`ParseReport`].
pub async fn load_feed(source: &dyn FeedSource, parser: &FeedParser) -> FeedResult<ParseReport> {
    let body = source
        .fetch()
        .await
        .map_err(|e| {
            if e.feed().is_some() {
                e
            } else {
                e.with_feed(source.id().as_str())
            }
        })?;
    debug!(feed = %source.id(), bytes = body.len(), "Fetched feed");
    Ok(parser.parse(&body))
}

/// A source serving a fixed document, or a fixed error.
#[derive(Debug, Clone)]
pub struct StaticSource {
    id: FeedId,
    content: Result<String, (FetchErrorCode, String)>,
}

impl StaticSource {
    /// Creates a source always returning `body`.
    pub fn new(id: impl Into<FeedId>, body: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: Ok(body.into()),
        }
    }

    /// Creates a source always failing with the given error.
    pub fn failing(id: impl Into<FeedId>, code: FetchErrorCode, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: Err((code, message.into())),
        }
    }
}

impl FeedSource for StaticSource {
    fn id(&self) -> &FeedId {
        &self.id
    }

    fn fetch(&self) -> BoxFuture<'_, FeedResult<String>> {
        let result = match &self.content {
            Ok(body) => Ok(body.clone()),
            Err((code, message)) => {
                Err(FetchError::new(*code, message.clone()).with_feed(self.id.as_str()))
            }
        };
        Box::pin(async move { result })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ITEM: &str = "<rss><channel><item><title>Fair</title>\
        <pubDate>Mon, 20 Oct 2025 16:00:00 GMT</pubDate></item></channel></rss>";

    #[tokio::test]
    async fn static_source_is_parsed() {
        let source = StaticSource::new("general", ITEM);
        let report = load_feed(&source, &FeedParser::new("https://example.edu/e"))
            .await
            .unwrap();
        assert_eq!(report.events.len(), 1);
        assert_eq!(report.events[0].title, "Fair");
    }

    #[tokio::test]
    async fn empty_body_is_an_empty_feed() {
        let source = StaticSource::new("general", "");
        let report = load_feed(&source, &FeedParser::new("https://example.edu/e"))
            .await
            .unwrap();
        assert!(report.events.is_empty());
    }

    #[tokio::test]
    async fn failure_is_tagged_with_feed() {
        let source = StaticSource::failing("training", FetchErrorCode::Network, "unreachable");
        let err = load_feed(&source, &FeedParser::new("https://example.edu/e"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), FetchErrorCode::Network);
        assert_eq!(err.feed(), Some("training"));
    }
}
