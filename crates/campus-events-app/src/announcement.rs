//! The announcement banner shown above the sections.

use campus_events_feeds::{FeedResult, FetchError};
use serde::Deserialize;
use tracing::{debug, warn};

/// The announcement document: `{"message": "<html>"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Announcement {
    #[serde(default)]
    pub message: String,
}

impl Announcement {
    pub fn parse(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Returns the message to display, if any.
    pub fn into_message(self) -> Option<String> {
        let message = self.message.trim();
        (!message.is_empty()).then(|| message.to_string())
    }
}

/// Fetches the announcement. Failures are logged and yield no announcement.
pub async fn fetch_announcement(client: &reqwest::Client, url: &str) -> Option<String> {
    match try_fetch(client, url).await {
        Ok(message) => {
            debug!(url, shown = message.is_some(), "Fetched announcement");
            message
        }
        Err(e) => {
            warn!(url, error = %e, "Failed to fetch announcement");
            None
        }
    }
}

async fn try_fetch(client: &reqwest::Client, url: &str) -> FeedResult<Option<String>> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::http_status(status.as_u16()).with_feed("announcement"));
    }
    let body = response.text().await?;
    let announcement = Announcement::parse(&body).map_err(|e| {
        FetchError::invalid_response("announcement is not valid JSON")
            .with_feed("announcement")
            .with_source(e)
    })?;
    Ok(announcement.into_message())
}
