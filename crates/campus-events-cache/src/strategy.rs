//! Fetch strategies, keyed by request class.

use serde::{Deserialize, Serialize};

use crate::request::RequestClass;

/// How a request is arbitrated between network and cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchStrategy {
    /// Cached match (query ignored), cached index page, network, cached
    /// offline page, synthetic 503.
    CacheFirst,
    /// Network (stored on success), exact cached match, synthetic 503.
    NetworkFirst,
}

impl FetchStrategy {
    /// The strategy table.
    pub fn for_class(class: RequestClass) -> Self {
        match class {
            RequestClass::Navigation => Self::CacheFirst,
            RequestClass::Asset => Self::NetworkFirst,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CacheFirst => "cache_first",
            Self::NetworkFirst => "network_first",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_table() {
        assert_eq!(FetchStrategy::for_class(RequestClass::Navigation), FetchStrategy::CacheFirst);
        assert_eq!(FetchStrategy::for_class(RequestClass::Asset), FetchStrategy::NetworkFirst);
        assert_eq!(FetchStrategy::NetworkFirst.as_str(), "network_first");
    }
}
