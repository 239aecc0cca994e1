//! Cache-First Handler
//!
//! Install seeds the cache with the asset list in one batch. Fetch answers
//! from any cache and only goes to the network on a miss. Network
//! responses are never written back; the cache only grows at install.

use alloc::sync::Arc;
use core::fmt;

use crate::cache::{CacheError, CacheStorage};
use crate::config::WorkerConfig;
use crate::events::{FetchEvent, InstallEvent};
use crate::fetch::{Request, Response};
use crate::network::{Network, NetworkError};

/// Install failure, reported to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallError {
    /// The cache could not be opened
    Open(CacheError),
    /// Pre-caching the asset list failed
    Batch(CacheError),
}

impl fmt::Display for InstallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstallError::Open(e) => write!(f, "failed to open cache: {}", e),
            InstallError::Batch(e) => write!(f, "failed to pre-cache assets: {}", e),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for InstallError {}

/// Fetch failure, seen by the page as a failed load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Cache miss and the network fetch failed
    Network(NetworkError),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Network(e) => write!(f, "network fetch failed: {}", e),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for FetchError {}

/// Lifecycle event handler, called by the host.
pub trait LifecycleHandler: Send + Sync {
    /// React to an install event
    fn on_install(&self, event: &mut InstallEvent);

    /// React to a fetch event
    fn on_fetch(&self, event: &mut FetchEvent);
}

/// The cache-first strategy handler.
///
/// Stateless apart from the injected cache storage and network.
pub struct CacheFirstHandler {
    config: WorkerConfig,
    caches: Arc<dyn CacheStorage>,
    network: Arc<dyn Network>,
}

impl CacheFirstHandler {
    pub fn new(
        config: WorkerConfig,
        caches: Arc<dyn CacheStorage>,
        network: Arc<dyn Network>,
    ) -> Self {
        Self {
            config,
            caches,
            network,
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    /// Open the cache and store every asset, all or nothing.
    pub fn handle_install(&self) -> Result<(), InstallError> {
        let name = &self.config.cache_name;
        let cache = self.caches.open(name).map_err(|e| {
            log::warn!("[SW] Install: cannot open '{}': {}", name, e);
            InstallError::Open(e)
        })?;

        let requests = self.config.precache_requests();
        log::info!("[SW] Install: pre-caching {} assets into '{}'", requests.len(), name);

        cache.add_all(self.network.as_ref(), &requests).map_err(|e| {
            log::warn!("[SW] Install failed: {}", e);
            InstallError::Batch(e)
        })?;

        log::info!("[SW] Install complete ({} entries in '{}')", cache.len(), name);
        Ok(())
    }

    /// Serve from cache, else fetch from the network exactly once.
    pub fn handle_fetch(&self, request: &Request) -> Result<Response, FetchError> {
        let mut request = request.clone();
        request.url = self.config.scope.resolve(&request.url);

        match self.caches.match_request(&request) {
            Ok(Some(response)) => {
                log::debug!("[SW] Cache hit: {}", request.key());
                return Ok(response);
            }
            Ok(None) => log::debug!("[SW] Cache miss: {}", request.key()),
            Err(e) => log::warn!("[SW] Cache lookup failed for {}: {}", request.key(), e),
        }

        self.network.fetch(&request).map_err(|e| {
            log::debug!("[SW] Network fetch failed: {}: {}", request.url, e);
            FetchError::Network(e)
        })
    }
}

impl LifecycleHandler for CacheFirstHandler {
    fn on_install(&self, event: &mut InstallEvent) {
        event.wait_until(self.handle_install());
    }

    fn on_fetch(&self, event: &mut FetchEvent) {
        let result = self.handle_fetch(event.request());
        event.respond_with(result);
    }
}
