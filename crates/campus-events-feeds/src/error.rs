//! Error types for feed fetching.
//!
//! A failed fetch never aborts the page: the loader substitutes empty buckets
//! for the feed and only raises the page banner when every feed failed.

use std::fmt;
use thiserror::Error;

/// The category of a fetch error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchErrorCode {
    /// Connection failed, DNS resolution, TLS, reset.
    Network,
    /// The request did not complete in time.
    Timeout,
    /// The proxy answered with a non-success status.
    HttpStatus,
    /// The body could not be read as text.
    InvalidResponse,
    /// The feed definition is unusable (bad proxy URL, client setup).
    Configuration,
}

impl FetchErrorCode {
    /// Returns true if retrying later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network | Self::Timeout | Self::HttpStatus)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Timeout => "timeout",
            Self::HttpStatus => "http_status",
            Self::InvalidResponse => "invalid_response",
            Self::Configuration => "configuration",
        }
    }
}

impl fmt::Display for FetchErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error that occurred while fetching a feed.
#[derive(Debug, Error)]
pub struct FetchError {
    code: FetchErrorCode,
    message: String,
    /// The feed that failed, if known.
    feed: Option<String>,
    /// HTTP status returned by the proxy, for [`FetchErrorCode::HttpStatus`].
    status: Option<u16>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl FetchError {
    pub fn new(code: FetchErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            feed: None,
            status: None,
            source: None,
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(FetchErrorCode::Network, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(FetchErrorCode::Timeout, message)
    }

    /// Creates an HTTP status error.
    pub fn http_status(status: u16) -> Self {
        let mut err = Self::new(FetchErrorCode::HttpStatus, format!("proxy returned HTTP {status}"));
        err.status = Some(status);
        err
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(FetchErrorCode::InvalidResponse, message)
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(FetchErrorCode::Configuration, message)
    }

    /// Sets the feed id for this error.
    pub fn with_feed(mut self, feed: impl Into<String>) -> Self {
        self.feed = Some(feed.into());
        self
    }

    /// Sets the source error for this error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    pub fn code(&self) -> FetchErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn feed(&self) -> Option<&str> {
        self.feed.as_deref()
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref feed) = self.feed {
            write!(f, "[{feed}] ")?;
        }
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        let base = if err.is_timeout() {
            Self::timeout("request timed out")
        } else if let Some(status) = err.status() {
            Self::http_status(status.as_u16())
        } else if err.is_builder() {
            Self::configuration(format!("invalid request: {err}"))
        } else if err.is_decode() || err.is_body() {
            Self::invalid_response(format!("failed to read body: {err}"))
        } else {
            Self::network(format!("request failed: {err}"))
        };
        base.with_source(err)
    }
}

/// A specialized Result type for feed operations.
pub type FeedResult<T> = Result<T, FetchError>;
