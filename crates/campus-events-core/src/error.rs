//! Errors raised while turning feed items into events.
//!
//! Neither error is fatal to the pipeline: a [`ParseError`] drops the offending
//! item, a [`LinkRewriteError`] keeps the original link.

use thiserror::Error;

/// A feed item (or the feed document) could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The `pubDate` of an item is not a recognizable date.
    #[error("invalid pubDate {value:?} for item {title:?}")]
    InvalidDate { title: String, value: String },

    /// The XML stream is malformed.
    #[error("malformed feed XML at byte {position}: {message}")]
    Xml { position: u64, message: String },
}

impl ParseError {
    /// Creates an invalid date error.
    pub fn invalid_date(title: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidDate {
            title: title.into(),
            value: value.into(),
        }
    }

    /// Creates an XML error.
    pub fn xml(position: u64, message: impl Into<String>) -> Self {
        Self::Xml {
            position,
            message: message.into(),
        }
    }
}

/// A feed link could not be parsed as a URL.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid link {link:?}: {source}")]
pub struct LinkRewriteError {
    /// The original link text.
    pub link: String,
    #[source]
    pub source: url::ParseError,
}
