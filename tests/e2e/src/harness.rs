//! Test harness for running E2E scenarios
//!
//! Wires a worker to cache storage and a scripted network the way a host
//! would, and can "restart" by rebuilding everything over the same
//! storage backend.

use alloc::boxed::Box;
use alloc::sync::Arc;

use maze_sw::{
    CacheError, CacheFirstHandler, CacheHandle, CacheStorage, LocalCacheStorage, MemoryBackend,
    ServiceWorker, ServiceWorkerError, StorageBackend, WorkerConfig,
};

use crate::fixtures::ScriptedNetwork;

/// A host running one worker.
pub struct OfflineHarness {
    backend: Arc<dyn StorageBackend>,
    config: WorkerConfig,
    /// Network seen by the worker
    pub network: Arc<ScriptedNetwork>,
    /// Cache storage seen by the worker
    pub caches: Arc<LocalCacheStorage>,
    /// The worker under test
    pub worker: ServiceWorker,
}

impl OfflineHarness {
    /// Default configuration over volatile storage
    pub fn new(network: ScriptedNetwork) -> Result<Self, CacheError> {
        let backend: Arc<dyn StorageBackend> = Arc::new(MemoryBackend::new());
        Self::build(backend, Arc::new(network), WorkerConfig::default())
    }

    /// Build over an existing backend, restoring whatever it holds
    pub fn with_backend(
        backend: Arc<dyn StorageBackend>,
        network: Arc<ScriptedNetwork>,
        config: WorkerConfig,
    ) -> Result<Self, CacheError> {
        Self::build(backend, network, config)
    }

    fn build(
        backend: Arc<dyn StorageBackend>,
        network: Arc<ScriptedNetwork>,
        config: WorkerConfig,
    ) -> Result<Self, CacheError> {
        let caches = Arc::new(LocalCacheStorage::new(backend.clone())?);
        let handler = CacheFirstHandler::new(config.clone(), caches.clone(), network.clone());
        let worker = ServiceWorker::new(Box::new(handler), network.clone());
        Ok(Self {
            backend,
            config,
            network,
            caches,
            worker,
        })
    }

    /// Install and, on success, activate
    pub fn install_and_activate(&mut self) -> Result<(), ServiceWorkerError> {
        self.worker.install()?;
        self.worker.activate()
    }

    /// Drop all in-memory state and come back up over the same backend
    pub fn restart(self) -> Result<Self, CacheError> {
        Self::build(self.backend, self.network, self.config)
    }

    /// Restart with a new worker version
    pub fn upgrade(self, config: WorkerConfig) -> Result<Self, CacheError> {
        Self::build(self.backend, self.network, config)
    }

    /// A handler sharing this host's storage and network
    pub fn handler(&self) -> CacheFirstHandler {
        CacheFirstHandler::new(self.config.clone(), self.caches.clone(), self.network.clone())
    }

    /// The worker's own cache
    pub fn cache(&self) -> Result<CacheHandle, CacheError> {
        self.caches.open(&self.config.cache_name)
    }
}
