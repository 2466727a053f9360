//! Feed source fetching through the HTTP proxy.
//!
//! The proxy is opaque: `GET <proxy>?feed=<url-encoded upstream>` returns the
//! upstream RSS document. Some proxy failures surface as an empty `200`
//! body, which parses as an empty feed.

use campus_events_core::FeedId;
use reqwest::{Client, Response};
use tracing::{trace, warn};

use crate::config::{FeedConfig, ProxyConfig};
use crate::error::{FeedResult, FetchError};
use crate::source::{BoxFuture, FeedSource};

/// Builds the HTTP client shared by every feed.
///
/// # Errors
///
/// Returns a configuration error if the TLS backend cannot be initialized.
pub fn build_client(proxy: &ProxyConfig) -> FeedResult<Client> {
    Client::builder()
        .timeout(proxy.timeout())
        .user_agent(&proxy.user_agent)
        .build()
        .map_err(|e| FetchError::configuration("failed to create HTTP client").with_source(e))
}

/// Fetches one feed through the proxy.
#[derive(Debug, Clone)]
pub struct ProxyFeedSource {
    id: FeedId,
    client: Client,
    url: String,
}

impl ProxyFeedSource {
    /// Creates a source for `feed`, reusing `client`.
    pub fn new(client: Client, proxy: &ProxyConfig, feed: &FeedConfig) -> Self {
        Self {
            id: feed.id.clone(),
            client,
            url: proxy.feed_url(&feed.upstream),
        }
    }

    /// Returns the proxied URL this source requests.
    pub fn url(&self) -> &str {
        &self.url
    }

    async fn get(&self) -> FeedResult<String> {
        trace!(feed = %self.id, url = %self.url, "Sending request");
        let response = self.client.get(&self.url).send().await?;
        self.handle_response(response).await
    }

    async fn handle_response(&self, response: Response) -> FeedResult<String> {
        let status = response.status();
        trace!(feed = %self.id, status = %status, "Received response");

        if !status.is_success() {
            warn!(feed = %self.id, status = %status, "Proxy returned an error status");
            return Err(FetchError::http_status(status.as_u16()));
        }

        Ok(response.text().await?)
    }
}

impl FeedSource for ProxyFeedSource {
    fn id(&self) -> &FeedId {
        &self.id
    }

    fn fetch(&self) -> BoxFuture<'_, FeedResult<String>> {
        Box::pin(async move { self.get().await.map_err(|e| e.with_feed(self.id.as_str())) })
    }
}
