//! Application configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/campus-events/config.toml` by default. Every field is optional;
//! an absent file yields the built-in Clark College setup.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use campus_events_cache::CacheConfig;
use campus_events_core::{
    Bucketizer, DEFAULT_MIN_QUERY_LEN, DEFAULT_WINDOW_DAYS, NO_EVENTS_MESSAGE, ProximityWindows,
    TextOptions, TimeFormat, ViewOptions,
};
use campus_events_feeds::{FeedConfig, FeedParser, ProxyConfig};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::loader::LoaderConfig;

/// Heading shown above the sections.
pub const DEFAULT_HEADING: &str = "Clark College Events";

/// Announcement document shown above the sections.
pub const DEFAULT_MESSAGES_URL: &str =
    "https://raw.githubusercontent.com/belgort-clark/clark-college-events-messages/refs/heads/main/messages.json";

/// Configuration for the events page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub heading: String,

    /// IANA zone events are shown in.
    pub zone: String,

    /// Forward calendar days shown under "Upcoming".
    pub window_days: u32,

    /// Shortest query that filters or searches.
    pub min_query_len: usize,

    /// Announcement JSON document; no announcement when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messages_url: Option<String>,

    pub display: DisplaySettings,

    pub proximity: ProximityWindows,

    pub loader: LoaderConfig,

    pub proxy: ProxyConfig,

    /// Offline cache generation of the static site.
    pub cache: CacheConfig,

    /// Feeds, in page order.
    pub feeds: Vec<FeedConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            heading: DEFAULT_HEADING.to_string(),
            zone: campus_events_core::DEFAULT_ZONE.name().to_string(),
            window_days: DEFAULT_WINDOW_DAYS,
            min_query_len: DEFAULT_MIN_QUERY_LEN,
            messages_url: Some(DEFAULT_MESSAGES_URL.to_string()),
            display: DisplaySettings::default(),
            proximity: ProximityWindows::default(),
            loader: LoaderConfig::default(),
            proxy: ProxyConfig::default(),
            cache: CacheConfig::default(),
            feeds: FeedConfig::defaults(),
        }
    }
}

/// Display settings for output formatting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    pub time_format: TimeFormat,

    /// Maximum title length (truncated with ellipsis).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_title_length: Option<usize>,

    /// Wrap titles in terminal hyperlinks.
    pub hyperlinks: bool,

    /// Message under Today/Tomorrow when they have no events.
    pub no_events_text: String,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            time_format: TimeFormat::default(),
            max_title_length: None,
            hyperlinks: false,
            no_events_text: NO_EVENTS_MESSAGE.to_string(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from the default path, or the defaults when the
    /// file does not exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("campus-events")
            .join("config.toml")
    }

    /// Renders the configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Parses the display zone.
    pub fn zone(&self) -> Result<Tz, ConfigError> {
        self.zone
            .parse()
            .map_err(|_| ConfigError::UnknownZone(self.zone.clone()))
    }

    /// Checks the whole configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.zone()?;

        if !self.proximity.is_consistent() {
            return Err(ConfigError::invalid(
                "proximity windows must be non-negative and past_after_minutes must be at least in_progress_minutes",
            ));
        }
        if self.loader.slow_after_ms >= self.loader.timeout_ms {
            return Err(ConfigError::invalid(
                "loader.slow_after_ms must be shorter than loader.timeout_ms",
            ));
        }
        if self.feeds.is_empty() {
            return Err(ConfigError::invalid("at least one feed must be configured"));
        }

        let mut seen = HashSet::new();
        for feed in &self.feeds {
            if !seen.insert(feed.id.as_str()) {
                return Err(ConfigError::invalid(format!("duplicate feed id {:?}", feed.id.as_str())));
            }
            feed.validate().map_err(|e| ConfigError::invalid(e.to_string()))?;
        }

        self.cache
            .validate()
            .map_err(|e| ConfigError::invalid(e.to_string()))
    }

    /// Returns the options used to project events.
    pub fn view_options(&self) -> ViewOptions {
        ViewOptions {
            time_format: self.display.time_format,
            windows: self.proximity,
            empty_message: self.display.no_events_text.clone(),
        }
    }

    /// Returns the text renderer options.
    pub fn text_options(&self) -> TextOptions {
        TextOptions {
            max_title_length: self.display.max_title_length,
            hyperlinks: self.display.hyperlinks,
            expand_all: false,
        }
    }

    pub fn bucketizer(&self) -> Bucketizer {
        Bucketizer::new(self.window_days, self.proximity)
    }

    /// Returns the parser for one feed.
    pub fn parser_for(&self, feed: &FeedConfig) -> Result<FeedParser, ConfigError> {
        Ok(FeedParser::new(feed.base_url.clone()).with_zone(self.zone()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    mod loading {
        use super::*;

        #[test]
        fn missing_fields_use_defaults() {
            let config: AppConfig = toml::from_str("window_days = 3\n").unwrap();
            assert_eq!(config.window_days, 3);
            assert_eq!(config.zone, "America/Los_Angeles");
            assert_eq!(config.feeds.len(), 2);
            assert_eq!(config.feeds[0].id.as_str(), "general");
            assert_eq!(config.min_query_len, 3);
            assert!(config.validate().is_ok());
        }

        #[test]
        fn load_from_file() {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            writeln!(
                file,
                r#"
heading = "Test Events"
zone = "America/New_York"

[display]
time_format = "h24"

[loader]
timeout_ms = 5000
slow_after_ms = 1500

[[feeds]]
id = "only"
title = "Only Feed"
upstream = "https://example.edu/only.rss"
base_url = "https://example.edu/only"
"#
            )
            .unwrap();

            let config = AppConfig::load_from(file.path()).unwrap();
            assert_eq!(config.heading, "Test Events");
            assert_eq!(config.zone().unwrap(), chrono_tz::America::New_York);
            assert_eq!(config.display.time_format, TimeFormat::H24);
            assert_eq!(config.loader.timeout(), std::time::Duration::from_secs(5));
            assert_eq!(config.loader.slow_after_ms, 1500);
            assert_eq!(config.feeds.len(), 1);
            assert_eq!(config.feeds[0].description, "");
            assert_eq!(config.view_options().time_format, TimeFormat::H24);
        }

        #[test]
        fn unreadable_and_malformed_files() {
            let dir = tempfile::tempdir().unwrap();
            let missing = dir.path().join("nope.toml");
            assert!(matches!(
                AppConfig::load_from(&missing),
                Err(ConfigError::Read { .. })
            ));

            let bad = dir.path().join("bad.toml");
            std::fs::write(&bad, "window_days = \"ten\"").unwrap();
            let err = AppConfig::load_from(&bad).unwrap_err();
            assert!(matches!(err, ConfigError::Parse { .. }));
            assert!(err.to_string().contains("bad.toml"));
        }

        #[test]
        fn dump_reloads_to_same_config() {
            let config = AppConfig::default();
            let reloaded: AppConfig = toml::from_str(&config.to_toml().unwrap()).unwrap();
            assert_eq!(reloaded, config);
        }
    }

    mod validation {
        use super::*;

        #[test]
        fn rejects_unknown_zone() {
            let config = AppConfig {
                zone: "Mars/Olympus_Mons".into(),
                ..Default::default()
            };
            assert!(matches!(config.validate(), Err(ConfigError::UnknownZone(_))));
        }

        #[test]
        fn rejects_overlapping_past_and_in_progress() {
            let config = AppConfig {
                proximity: ProximityWindows::default().with_in_progress(90),
                ..Default::default()
            };
            assert!(config.validate().is_err());
        }

        #[test]
        fn rejects_duplicate_feed_ids_and_no_feeds() {
            let config = AppConfig {
                feeds: vec![FeedConfig::general(), FeedConfig::general()],
                ..Default::default()
            };
            let err = config.validate().unwrap_err();
            assert_eq!(err.to_string(), "duplicate feed id \"general\"");

            let config = AppConfig {
                feeds: vec![],
                ..Default::default()
            };
            assert!(config.validate().is_err());
        }

        #[test]
        fn rejects_slow_threshold_after_timeout() {
            let config = AppConfig {
                loader: LoaderConfig {
                    timeout_ms: 2000,
                    slow_after_ms: 2000,
                },
                ..Default::default()
            };
            assert!(config.validate().is_err());
        }
    }
}
