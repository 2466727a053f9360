//! Cache controller error types.

use thiserror::Error;

/// Result type for cache controller operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// A manifest asset could not be pre-cached. The install is aborted and
/// nothing is written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheInstallError {
    /// The asset request did not complete.
    #[error("failed to fetch {url}: {message}")]
    Network { url: String, message: String },

    /// The asset answered with a non-success status.
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// The manifest entry does not resolve against the origin.
    #[error("invalid manifest entry {path:?}: {source}")]
    InvalidPath {
        path: String,
        #[source]
        source: url::ParseError,
    },
}

impl CacheInstallError {
    /// Returns the URL (or manifest path) that failed.
    pub fn asset(&self) -> &str {
        match self {
            Self::Network { url, .. } | Self::Status { url, .. } => url,
            Self::InvalidPath { path, .. } => path,
        }
    }
}

/// A network request failed before producing a response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("network error: {message}")]
pub struct NetworkError {
    pub message: String,
}

impl NetworkError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors surfaced by the cache controller and its registration.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Installing a generation failed.
    #[error("install failed: {0}")]
    Install(#[from] CacheInstallError),

    /// A control message could not be decoded.
    #[error("invalid control message: {0}")]
    InvalidMessage(#[from] serde_json::Error),

    /// The network could not be set up.
    #[error(transparent)]
    Network(#[from] NetworkError),

    /// Configuration error.
    #[error("invalid cache configuration: {message}")]
    Config { message: String },
}

impl CacheError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}
