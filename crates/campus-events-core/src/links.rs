//! Link rewriting for feed items.
//!
//! Feed links point at the calendar publisher. The page instead links to the
//! college's own event page, which accepts the same query string. Rewriting
//! keeps the original query and swaps everything before it for a configured
//! base URL.
//!
//! # Example
//!
//! ```
//! use campus_events_core::links::LinkRewriter;
//!
//! let rewriter = LinkRewriter::new("https://www.example.edu/events.php");
//! let link = rewriter.rewrite("https://publisher.example.com/event?eventid=42&date=2025-10-20");
//! assert_eq!(link, "https://www.example.edu/events.php?eventid=42&date=2025-10-20");
//! ```

use tracing::warn;
use url::Url;

use crate::error::LinkRewriteError;

/// Re-hosts the query string of `link` onto `base`.
///
/// An absent or empty query yields `base` unchanged. The fragment is dropped.
///
/// # Errors
///
/// Returns [`LinkRewriteError`] if `link` is not an absolute URL.
pub fn rewrite_link(link: &str, base: &str) -> Result<String, LinkRewriteError> {
    let url = Url::parse(link).map_err(|source| LinkRewriteError {
        link: link.to_string(),
        source,
    })?;

    Ok(match url.query() {
        Some(query) if !query.is_empty() => format!("{base}?{query}"),
        _ => base.to_string(),
    })
}

/// Rewrites feed links onto a fixed base URL, falling back to the original.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRewriter {
    base: String,
}

impl LinkRewriter {
    /// Creates a rewriter for the given base URL.
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }

    /// Returns the base URL.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Rewrites `link`, or returns it unchanged if it is not a valid URL.
    pub fn rewrite(&self, link: &str) -> String {
        match rewrite_link(link, &self.base) {
            Ok(rewritten) => rewritten,
            Err(e) => {
                warn!(error = %e, "Keeping original feed link");
                link.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://www.example.edu/about/calendars/events.php";

    #[test]
    fn preserves_query_exactly() {
        let query = "eventid=123456&date=20251020&trumbaEmbed=view%3Devent";
        let link = format!("https://25livepub.example.com/calendars/events?{query}");
        let rewritten = rewrite_link(&link, BASE).unwrap();
        assert_eq!(rewritten, format!("{BASE}?{query}"));
        assert_eq!(Url::parse(&rewritten).unwrap().query(), Some(query));
    }

    #[test]
    fn no_query_yields_base() {
        assert_eq!(rewrite_link("https://publisher.example.com/e", BASE).unwrap(), BASE);
        assert_eq!(rewrite_link("https://publisher.example.com/e?", BASE).unwrap(), BASE);
    }

    #[test]
    fn fragment_is_dropped() {
        let rewritten = rewrite_link("https://publisher.example.com/e?id=1#details", BASE).unwrap();
        assert_eq!(rewritten, format!("{BASE}?id=1"));
    }

    #[test]
    fn invalid_url_is_an_error() {
        let err = rewrite_link("not a url", BASE).unwrap_err();
        assert_eq!(err.link, "not a url");
        assert_eq!(err.source, url::ParseError::RelativeUrlWithoutBase);
    }

    #[test]
    fn rewriter_falls_back_to_original() {
        let rewriter = LinkRewriter::new(BASE);
        assert_eq!(rewriter.rewrite("/relative?id=1"), "/relative?id=1");
        assert_eq!(rewriter.rewrite(""), "");
        assert_eq!(rewriter.base(), BASE);
    }
}
