//! Offline cache commands.

use std::sync::Arc;

use campus_events_cache::{CacheError, CacheStorage, HttpNetwork, Registration};
use tracing::info;

use crate::config::AppConfig;
use crate::error::AppResult;

/// Prints the current cache generation and the URLs it pre-caches.
pub fn manifest(config: &AppConfig) -> AppResult<()> {
    for line in manifest_lines(config)? {
        println!("{line}");
    }
    Ok(())
}

/// Pre-caches the manifest from the site origin and reports the result.
pub async fn install(config: &AppConfig) -> AppResult<()> {
    let entries = install_generation(config).await?;
    println!("installed {}: {entries} entries", config.cache.cache_name());
    Ok(())
}

async fn install_generation(config: &AppConfig) -> AppResult<usize> {
    let cache = &config.cache;
    let network = HttpNetwork::with_timeout(config.proxy.timeout()).map_err(CacheError::from)?;
    let registration = Registration::new(CacheStorage::new(), Arc::new(network));

    let outcome = registration.register(cache.clone()).await?;
    info!(?outcome, "Registered cache generation");
    Ok(registration.storage().len(&cache.cache_name()).await)
}

fn manifest_lines(config: &AppConfig) -> AppResult<Vec<String>> {
    let cache = &config.cache;
    cache.validate()?;
    let origin = cache.origin_url()?;

    let mut lines = vec![format!("cache: {}", cache.cache_name())];
    for path in &cache.manifest {
        let url = cache
            .resolve(&origin, path)
            .map_err(CacheError::from)?;
        lines.push(format!("  {url}"));
    }
    Ok(lines)
}
