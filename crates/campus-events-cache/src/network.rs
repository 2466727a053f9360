//! The network behind the cache controller.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::trace;

use crate::error::NetworkError;
use crate::request::{Method, Request, Response, cache_key};

/// A boxed future for trait methods that must stay object-safe.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Performs real requests for the controller.
///
/// An HTTP error status is a successful fetch; only failures to obtain any
/// response are errors.
pub trait Network: Send + Sync {
    fn fetch<'a>(&'a self, request: &'a Request) -> BoxFuture<'a, Result<Response, NetworkError>>;
}

/// The network reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpNetwork {
    client: reqwest::Client,
}

impl HttpNetwork {
    /// Wraps an existing client.
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Builds a client whose requests give up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialized.
    pub fn with_timeout(timeout: Duration) -> Result<Self, NetworkError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NetworkError::new(format!("failed to create HTTP client: {e}")))?;
        Ok(Self::new(client))
    }

    async fn send(&self, request: &Request) -> Result<Response, NetworkError> {
        let mut builder = self.client.request(http_method(request.method), request.url.clone());
        for (name, value) in request.headers() {
            builder = builder.header(name, value);
        }

        trace!(url = %request.url, method = ?request.method, "Sending request");
        let reply = builder
            .send()
            .await
            .map_err(|e| NetworkError::new(format!("{}: {e}", request.url)))?;

        let status = reply.status();
        let mut response = Response::new(status.as_u16(), status.canonical_reason().unwrap_or_default());
        for (name, value) in reply.headers() {
            if let Ok(value) = value.to_str() {
                response = response.with_header(name.as_str(), value);
            }
        }
        let body = reply
            .bytes()
            .await
            .map_err(|e| NetworkError::new(format!("{}: {e}", request.url)))?;
        trace!(url = %request.url, status = response.status, bytes = body.len(), "Received response");
        Ok(response.with_body(body.to_vec()))
    }
}

impl Network for HttpNetwork {
    fn fetch<'a>(&'a self, request: &'a Request) -> BoxFuture<'a, Result<Response, NetworkError>> {
        Box::pin(self.send(request))
    }
}

fn http_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Head => reqwest::Method::HEAD,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
    }
}

/// An in-memory network serving registered responses.
///
/// Unknown URLs answer `404`. While offline every request fails. Clones share
/// the same routes and switches.
#[derive(Debug, Clone, Default)]
pub struct MemoryNetwork {
    routes: Arc<RwLock<HashMap<String, Response>>>,
    offline: Arc<AtomicBool>,
    requests: Arc<AtomicUsize>,
}

impl MemoryNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the response for a URL.
    pub async fn route(&self, url: &str, response: Response) {
        self.routes.write().await.insert(url.to_string(), response);
    }

    /// Removes the response for a URL.
    pub async fn unroute(&self, url: &str) {
        self.routes.write().await.remove(url);
    }

    /// Switches the network on or off.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Returns the number of requests received, including failed ones.
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

impl Network for MemoryNetwork {
    fn fetch<'a>(&'a self, request: &'a Request) -> BoxFuture<'a, Result<Response, NetworkError>> {
        Box::pin(async move {
            self.requests.fetch_add(1, Ordering::SeqCst);
            if self.offline.load(Ordering::SeqCst) {
                return Err(NetworkError::new(format!("offline: {}", request.url)));
            }
            let routes = self.routes.read().await;
            Ok(routes
                .get(&cache_key(&request.url))
                .cloned()
                .unwrap_or_else(|| Response::new(404, "Not Found")))
        })
    }
}
