//! Feed fetching and RSS parsing.
//!
//! - [`FeedSource`] - delivers the raw text of one feed
//! - [`ProxyFeedSource`] - fetches a feed through the CORS proxy
//! - [`FeedParser`] - turns RSS text into ordered events
//! - [`FetchError`] - error taxonomy for fetch failures
//!
//! ```text
//! ProxyFeedSource ──fetch()──▶ RSS text ──FeedParser::parse()──▶ ParseReport { events, .. }
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod rss;
pub mod source;

pub use config::{DEFAULT_PROXY_URL, FeedConfig, ProxyConfig};
pub use error::{FeedResult, FetchError, FetchErrorCode};
pub use http::{ProxyFeedSource, build_client};
pub use rss::{FeedParser, ParseReport, parse_pub_date};
pub use source::{BoxFuture, FeedSource, StaticSource, load_feed};
