//! Event types for feed items.
//!
//! - [`Event`]: a normalized, immutable event parsed from one RSS item
//! - [`FeedId`]: identifies which feed an event came from

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::time::{ProximityFlags, ProximityWindows, is_midnight};

/// Identifier of a configured feed (e.g., "general", "training").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeedId(String);

impl FeedId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FeedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FeedId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A normalized event from an RSS feed.
///
/// Events are immutable after construction. Proximity flags are not stored;
/// they are derived on demand relative to a reference "now".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// The event title.
    pub title: String,
    /// Start time, expressed in the feed's display zone.
    pub start: DateTime<FixedOffset>,
    /// Link to the event page (already rewritten onto the feed's base URL).
    pub link: String,
    /// Sanitized HTML description.
    pub description: String,
    /// Leading location line of the description, if one was found.
    pub location: Option<String>,
    /// Whether the event starts exactly at midnight.
    pub is_all_day: bool,
}

impl Event {
    /// Creates a new event. `is_all_day` is derived from the start time.
    pub fn new(title: impl Into<String>, start: DateTime<FixedOffset>) -> Self {
        Self {
            title: title.into(),
            start,
            link: String::new(),
            description: String::new(),
            location: None,
            is_all_day: is_midnight(&start),
        }
    }

    /// Builder method to set the link.
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = link.into();
        self
    }

    /// Builder method to set the sanitized description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Builder method to set the location.
    pub fn with_location(mut self, location: Option<String>) -> Self {
        self.location = location;
        self
    }

    /// Returns the zone-local calendar day of the event.
    pub fn day(&self) -> NaiveDate {
        self.start.date_naive()
    }

    /// Computes the proximity flags relative to `now`.
    pub fn flags(&self, now: &DateTime<FixedOffset>, windows: &ProximityWindows) -> ProximityFlags {
        windows.classify(&self.start, self.is_all_day, now)
    }

    /// Returns the location for display.
    pub fn location_or_default(&self) -> &str {
        self.location.as_deref().unwrap_or("Location not specified")
    }
}
