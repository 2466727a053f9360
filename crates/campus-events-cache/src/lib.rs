//! Offline cache controller for the events site.
//!
//! This crate keeps the static site usable without a network:
//! - versioned caches pre-populated on install, all or nothing
//! - activation that deletes every stale generation
//! - fetch interception with cache-first navigations and network-first assets
//! - update notifications and the skip-waiting handshake with pages
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use campus_events_cache::{CacheConfig, CacheStorage, HttpNetwork, Registration, Request};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Serve the site on http://localhost:8080/ first.
//!     let network = HttpNetwork::with_timeout(Duration::from_secs(10))?;
//!     let registration = Registration::new(CacheStorage::new(), Arc::new(network));
//!     registration.register(CacheConfig::default()).await?;
//!
//!     let request = Request::navigate("http://localhost:8080/")?;
//!     let response = registration.handle_fetch(&request).await;
//!     println!("{:?}", response.map(|r| r.status));
//!     Ok(())
//! }
//! ```

mod config;
mod controller;
mod error;
mod network;
mod registration;
mod request;
mod storage;
mod strategy;

pub use config::{
    CacheConfig, DEFAULT_CACHE_PREFIX, DEFAULT_MANIFEST, DEFAULT_ORIGIN, DEFAULT_VERSION,
};
pub use controller::CacheController;
pub use error::{CacheError, CacheInstallError, CacheResult, NetworkError};
pub use network::{BoxFuture, HttpNetwork, MemoryNetwork, Network};
pub use registration::{ControlMessage, RegisterOutcome, Registration, UpdateEvent};
pub use request::{
    Method, OFFLINE_BODY, Request, RequestClass, RequestMode, Response, cache_key,
    cache_key_without_query,
};
pub use storage::CacheStorage;
pub use strategy::FetchStrategy;
