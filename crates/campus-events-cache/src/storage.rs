//! Named response caches.
//!
//! Mirrors the browser cache storage: a set of named caches, each mapping
//! request URLs to stored responses. Clones share the same storage.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, trace};
use url::Url;

use crate::request::{Response, cache_key, cache_key_without_query};

type NamedCache = HashMap<String, Response>;

/// Shared storage of named caches.
#[derive(Debug, Clone, Default)]
pub struct CacheStorage {
    caches: Arc<RwLock<BTreeMap<String, NamedCache>>>,
}

impl CacheStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every cache name, sorted.
    pub async fn keys(&self) -> Vec<String> {
        self.caches.read().await.keys().cloned().collect()
    }

    /// Returns true if a cache with this name exists.
    pub async fn has(&self, name: &str) -> bool {
        self.caches.read().await.contains_key(name)
    }

    /// Deletes a cache. Returns true if it existed.
    pub async fn delete(&self, name: &str) -> bool {
        let removed = self.caches.write().await.remove(name);
        if let Some(ref cache) = removed {
            debug!(cache = %name, entries = cache.len(), "Deleted cache");
        }
        removed.is_some()
    }

    /// Writes all entries into a cache in a single step, creating it if needed.
    pub async fn put_all(&self, name: &str, entries: Vec<(String, Response)>) {
        let count = entries.len();
        let mut caches = self.caches.write().await;
        caches.entry(name.to_string()).or_default().extend(entries);
        debug!(cache = %name, count, "Stored entries");
    }

    /// Stores one response, replacing any previous entry for the key.
    pub async fn put(&self, name: &str, key: impl Into<String>, response: Response) {
        let key = key.into();
        trace!(cache = %name, key = %key, status = response.status, "Storing response");
        self.caches
            .write()
            .await
            .entry(name.to_string())
            .or_default()
            .insert(key, response);
    }

    /// Looks up the exact URL (fragment ignored).
    pub async fn match_url(&self, name: &str, url: &Url) -> Option<Response> {
        let key = cache_key(url);
        self.caches.read().await.get(name)?.get(&key).cloned()
    }

    /// Looks up a URL ignoring the query string of both the request and the
    /// stored entries.
    pub async fn match_ignoring_query(&self, name: &str, url: &Url) -> Option<Response> {
        let wanted = cache_key_without_query(url);
        let caches = self.caches.read().await;
        let cache = caches.get(name)?;

        if let Some(response) = cache.get(&wanted) {
            return Some(response.clone());
        }
        cache
            .iter()
            .find(|(key, _)| {
                Url::parse(key).is_ok_and(|stored| cache_key_without_query(&stored) == wanted)
            })
            .map(|(_, response)| response.clone())
    }

    /// Returns the number of entries in a cache.
    pub async fn len(&self, name: &str) -> usize {
        self.caches.read().await.get(name).map_or(0, HashMap::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn page(body: &str) -> Response {
        Response::ok("text/html", body)
    }

    #[tokio::test]
    async fn put_and_match() {
        let storage = CacheStorage::new();
        storage.put("v1", "http://localhost/a.css", page("a")).await;

        assert!(storage.has("v1").await);
        assert_eq!(storage.len("v1").await, 1);
        let hit = storage.match_url("v1", &url("http://localhost/a.css#x")).await;
        assert_eq!(hit.unwrap().text(), "a");
        assert!(storage.match_url("v2", &url("http://localhost/a.css")).await.is_none());
        assert!(storage.match_url("v1", &url("http://localhost/a.css?v=2")).await.is_none());
    }

    #[tokio::test]
    async fn last_write_wins() {
        let storage = CacheStorage::new();
        storage.put("v1", "http://localhost/a", page("old")).await;
        storage.put("v1", "http://localhost/a", page("new")).await;
        let hit = storage.match_url("v1", &url("http://localhost/a")).await.unwrap();
        assert_eq!(hit.text(), "new");
    }

    #[tokio::test]
    async fn match_ignoring_query_both_ways() {
        let storage = CacheStorage::new();
        storage.put("v1", "http://localhost/index.html", page("index")).await;
        storage.put("v1", "http://localhost/search?q=x", page("search")).await;

        let hit = storage
            .match_ignoring_query("v1", &url("http://localhost/index.html?utm=1"))
            .await;
        assert_eq!(hit.unwrap().text(), "index");

        let hit = storage.match_ignoring_query("v1", &url("http://localhost/search")).await;
        assert_eq!(hit.unwrap().text(), "search");
    }

    #[tokio::test]
    async fn clones_share_state_and_delete() {
        let storage = CacheStorage::new();
        let other = storage.clone();
        storage
            .put_all("v1", vec![("http://localhost/".into(), page("root"))])
            .await;
        other.put("v0", "http://localhost/", page("old")).await;

        assert_eq!(storage.keys().await, vec!["v0", "v1"]);
        assert!(storage.delete("v0").await);
        assert!(!storage.delete("v0").await);
        assert_eq!(other.keys().await, vec!["v1"]);
    }
}
