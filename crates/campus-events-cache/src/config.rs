//! Cache controller configuration.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{CacheError, CacheInstallError, CacheResult};

/// Default prefix of cache names; the version is appended.
pub const DEFAULT_CACHE_PREFIX: &str = "clark-events-v";

/// Default cache generation.
pub const DEFAULT_VERSION: &str = "2.1.3";

/// Default origin the static site is served from.
pub const DEFAULT_ORIGIN: &str = "http://localhost:8080/";

/// Static assets pre-cached on install, relative to the origin.
pub const DEFAULT_MANIFEST: &[&str] = &[
    "./",
    "./index.html",
    "./offline.html",
    "./css/style.css",
    "./css/loading-overlay.css",
    "./js/router.js",
    "./js/popup.js",
    "./js/search.js",
    "./js/install.js",
    "./js/pull-to-refresh.js",
    "./js/sw-register.js",
    "./icon_32.png",
    "./icon_48.png",
    "./icon_64.png",
    "./icon_128.png",
    "./images/logo.png",
    "./images/box-arrow-up-right.svg",
];

/// Cache controller configuration.
///
/// The manifest is pinned to the version: bumping the version is the only way
/// to invalidate cached assets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub cache_prefix: String,
    pub version: String,
    /// Asset paths, resolved against `origin`.
    pub manifest: Vec<String>,
    /// Origin (and scope) of the controlled site.
    pub origin: String,
    /// Page served for navigations without a cached match.
    pub index_path: String,
    /// Page served for navigations when the network is down.
    pub offline_path: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_prefix: DEFAULT_CACHE_PREFIX.to_string(),
            version: DEFAULT_VERSION.to_string(),
            manifest: DEFAULT_MANIFEST.iter().map(|p| p.to_string()).collect(),
            origin: DEFAULT_ORIGIN.to_string(),
            index_path: "./index.html".to_string(),
            offline_path: "./offline.html".to_string(),
        }
    }
}

impl CacheConfig {
    /// Creates a configuration for the given origin with default assets.
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            ..Default::default()
        }
    }

    /// Builder: set the version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Builder: set the manifest.
    pub fn with_manifest<I, S>(mut self, manifest: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.manifest = manifest.into_iter().map(Into::into).collect();
        self
    }

    /// Returns the name of the cache of this generation.
    pub fn cache_name(&self) -> String {
        format!("{}{}", self.cache_prefix, self.version)
    }

    /// Parses the origin.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the origin is not an absolute URL.
    pub fn origin_url(&self) -> CacheResult<Url> {
        let url = Url::parse(&self.origin)
            .map_err(|e| CacheError::config(format!("invalid origin {:?}: {e}", self.origin)))?;
        if url.cannot_be_a_base() {
            return Err(CacheError::config(format!("origin {:?} cannot be a base", self.origin)));
        }
        Ok(url)
    }

    /// Resolves a root-relative path against the origin.
    ///
    /// # Errors
    ///
    /// Returns [`CacheInstallError::InvalidPath`] if the path does not resolve.
    pub fn resolve(&self, origin: &Url, path: &str) -> Result<Url, CacheInstallError> {
        origin.join(path).map_err(|source| CacheInstallError::InvalidPath {
            path: path.to_string(),
            source,
        })
    }

    /// Checks the configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an invalid origin or an empty version.
    pub fn validate(&self) -> CacheResult<()> {
        if self.version.trim().is_empty() {
            return Err(CacheError::config("version must not be empty"));
        }
        self.origin_url().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = CacheConfig::default();
        assert_eq!(config.cache_name(), "clark-events-v2.1.3");
        assert_eq!(config.manifest.len(), DEFAULT_MANIFEST.len());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn resolves_relative_paths_under_scope() {
        let config = CacheConfig::new("https://example.github.io/events/");
        let origin = config.origin_url().unwrap();
        assert_eq!(
            config.resolve(&origin, "./css/style.css").unwrap().as_str(),
            "https://example.github.io/events/css/style.css"
        );
        assert_eq!(
            config.resolve(&origin, "./").unwrap().as_str(),
            "https://example.github.io/events/"
        );
    }

    #[test]
    fn invalid_configs_are_rejected() {
        assert!(CacheConfig::new("not a url").validate().is_err());
        assert!(CacheConfig::new("mailto:x@example.com").validate().is_err());
        assert!(CacheConfig::default().with_version(" ").validate().is_err());
    }

    #[test]
    fn builder_methods() {
        let config = CacheConfig::default()
            .with_version("3.0.0")
            .with_manifest(["./", "./index.html"]);
        assert_eq!(config.cache_name(), "clark-events-v3.0.0");
        assert_eq!(config.manifest, vec!["./", "./index.html"]);
    }
}
