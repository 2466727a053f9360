//! The cache controller of one generation.
//!
//! A controller owns one versioned cache. It pre-populates that cache on
//! [`install`](CacheController::install), removes every other cache on
//! [`activate`](CacheController::activate), and answers intercepted requests
//! through the [`FetchStrategy`] of their class.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures_util::future::try_join_all;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{debug, info, trace, warn};
use url::Url;

use crate::config::CacheConfig;
use crate::error::{CacheInstallError, CacheResult};
use crate::network::Network;
use crate::request::{Method, Request, Response};
use crate::storage::CacheStorage;
use crate::strategy::FetchStrategy;

/// Controller of one cache generation.
pub struct CacheController {
    config: CacheConfig,
    origin: Url,
    cache_name: String,
    storage: CacheStorage,
    network: Arc<dyn Network>,
    /// Cache writes not awaited by the request that triggered them.
    writes: Mutex<JoinSet<()>>,
    /// Set once a newer generation took over; no further writes start.
    retired: AtomicBool,
}

impl std::fmt::Debug for CacheController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheController")
            .field("cache_name", &self.cache_name)
            .field("origin", &self.origin.as_str())
            .finish_non_exhaustive()
    }
}

impl CacheController {
    /// Creates a controller.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the config does not validate.
    pub fn new(
        config: CacheConfig,
        storage: CacheStorage,
        network: Arc<dyn Network>,
    ) -> CacheResult<Self> {
        config.validate()?;
        let origin = config.origin_url()?;
        Ok(Self {
            cache_name: config.cache_name(),
            config,
            origin,
            storage,
            network,
            writes: Mutex::new(JoinSet::new()),
            retired: AtomicBool::new(false),
        })
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn version(&self) -> &str {
        &self.config.version
    }

    /// Returns the name of the cache this controller serves from.
    pub fn cache_name(&self) -> &str {
        &self.cache_name
    }

    /// Stops this controller from writing to its cache.
    ///
    /// Requests still in flight are answered but their responses are no
    /// longer stored, so a deleted cache is never recreated.
    pub fn retire(&self) {
        self.retired.store(true, Ordering::SeqCst);
    }

    pub fn is_retired(&self) -> bool {
        self.retired.load(Ordering::SeqCst)
    }

    /// Fetches every manifest asset and stores them all, or nothing.
    ///
    /// Returns the number of cached entries.
    ///
    /// # Errors
    ///
    /// Returns the first asset failure: a network error, a non-2xx status or
    /// an unresolvable manifest path.
    pub async fn install(&self) -> Result<usize, CacheInstallError> {
        let urls = self
            .config
            .manifest
            .iter()
            .map(|path| self.config.resolve(&self.origin, path))
            .collect::<Result<Vec<_>, _>>()?;

        let entries = try_join_all(urls.into_iter().map(|url| self.fetch_asset(url)))
            .await
            .inspect_err(|e| warn!(cache = %self.cache_name, error = %e, "Install aborted"))?;

        let count = entries.len();
        self.storage.put_all(&self.cache_name, entries).await;
        info!(cache = %self.cache_name, count, "Installed cache generation");
        Ok(count)
    }

    async fn fetch_asset(&self, url: Url) -> Result<(String, Response), CacheInstallError> {
        let request = Request::new(Method::Get, url);
        let response = self
            .network
            .fetch(&request)
            .await
            .map_err(|e| CacheInstallError::Network {
                url: request.url.to_string(),
                message: e.message,
            })?;
        if !response.is_success() {
            return Err(CacheInstallError::Status {
                url: request.url.to_string(),
                status: response.status,
            });
        }
        trace!(url = %request.url, "Fetched manifest asset");
        Ok((request.cache_key(), response))
    }

    /// Deletes every cache except the current one.
    ///
    /// Returns the deleted cache names.
    pub async fn activate(&self) -> Vec<String> {
        let mut deleted = Vec::new();
        for name in self.storage.keys().await {
            if name != self.cache_name && self.storage.delete(&name).await {
                deleted.push(name);
            }
        }
        info!(cache = %self.cache_name, deleted = deleted.len(), "Activated cache generation");
        deleted
    }

    /// Answers an intercepted request.
    ///
    /// Returns `None` for requests the controller does not handle (non-GET or
    /// cross-origin); those go to the network untouched.
    pub async fn handle_fetch(&self, request: &Request) -> Option<Response> {
        if request.method != Method::Get {
            trace!(url = %request.url, method = ?request.method, "Passing through non-GET request");
            return None;
        }
        if request.url.origin() != self.origin.origin() {
            trace!(url = %request.url, "Passing through cross-origin request");
            return None;
        }

        let strategy = FetchStrategy::for_class(request.class());
        debug!(url = %request.url, strategy = strategy.as_str(), "Intercepted request");

        Some(match strategy {
            FetchStrategy::CacheFirst => self.cache_first(request).await,
            FetchStrategy::NetworkFirst => self.network_first(request).await,
        })
    }

    async fn cache_first(&self, request: &Request) -> Response {
        if let Some(hit) = self.storage.match_ignoring_query(&self.cache_name, &request.url).await {
            return hit;
        }
        if let Some(index) = self.cached_page(&self.config.index_path).await {
            return index;
        }

        match self.network.fetch(request).await {
            Ok(response) => {
                self.store_in_background(request.cache_key(), response.clone()).await;
                response
            }
            Err(e) => {
                warn!(url = %request.url, error = %e, "Navigation failed, serving offline page");
                match self.cached_page(&self.config.offline_path).await {
                    Some(page) => page,
                    None => Response::offline(),
                }
            }
        }
    }

    async fn network_first(&self, request: &Request) -> Response {
        match self.network.fetch(request).await {
            Ok(response) => {
                self.store_in_background(request.cache_key(), response.clone()).await;
                response
            }
            Err(e) => {
                debug!(url = %request.url, error = %e, "Network failed, trying cache");
                self.storage
                    .match_url(&self.cache_name, &request.url)
                    .await
                    .unwrap_or_else(Response::offline)
            }
        }
    }

    async fn cached_page(&self, path: &str) -> Option<Response> {
        let url = self.config.resolve(&self.origin, path).ok()?;
        self.storage.match_url(&self.cache_name, &url).await
    }

    async fn store_in_background(&self, key: String, response: Response) {
        let storage = self.storage.clone();
        let name = self.cache_name.clone();
        let mut writes = self.writes.lock().await;
        // Checked under the lock so `settle` after `retire` sees every write.
        if self.is_retired() {
            debug!(cache = %self.cache_name, key = %key, "Controller retired, not caching");
            return;
        }
        while writes.try_join_next().is_some() {}
        writes.spawn(async move {
            storage.put(&name, key, response).await;
        });
    }

    /// Waits for every background cache write started so far.
    pub async fn settle(&self) {
        let mut pending = std::mem::take(&mut *self.writes.lock().await);
        while let Some(result) = pending.join_next().await {
            if let Err(e) = result {
                warn!(cache = %self.cache_name, error = %e, "Cache write task failed");
            }
        }
    }
}
