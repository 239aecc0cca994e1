//! Maze Offline Service Worker
//!
//! Offline support for the maze game page. On install the worker opens a
//! versioned cache and stores the page's static assets in one batch; on
//! every fetch it answers from the cache and only falls back to the
//! network on a miss.
//!
//! # Architecture
//!
//! - `config`: Cache name, asset list and scope
//! - `fetch`: Request / Response model, request identity, scope resolution
//! - `network`: Host network capability
//! - `cache`: Cache API traits and the atomic `add_all` batch
//! - `storage`: Local cache storage persisted through a `StorageBackend`
//! - `events`: Install and fetch events
//! - `handler`: The cache-first handler
//! - `lifecycle`: Host-side worker state machine
//!
//! Cache storage and network are always injected, so every piece runs
//! without a browser host:
//!
//! ```
//! use std::sync::Arc;
//! use maze_sw::{LocalCacheStorage, OfflineNetwork, Request};
//!
//! let caches = Arc::new(LocalCacheStorage::in_memory());
//! let mut worker = maze_sw::maze_worker(caches, Arc::new(OfflineNetwork));
//! assert!(worker.install().is_err());
//! assert!(worker.fetch(Request::new("./index.html")).is_err());
//! ```

#![cfg_attr(not(any(test, feature = "std")), no_std)]

extern crate alloc;

pub mod cache;
pub mod config;
pub mod events;
pub mod fetch;
pub mod handler;
pub mod lifecycle;
pub mod network;
pub mod storage;

pub use cache::{Cache, CacheError, CacheHandle, CacheStorage};
pub use config::{WorkerConfig, CACHE_NAME, PRECACHE_ASSETS};
pub use events::{EventType, ExtendableEvent, FetchEvent, InstallEvent};
pub use fetch::{Request, RequestKey, RequestMethod, Response, Scope};
pub use handler::{CacheFirstHandler, FetchError, InstallError, LifecycleHandler};
pub use lifecycle::{ServiceWorker, ServiceWorkerError, WorkerState};
pub use network::{Network, NetworkError, OfflineNetwork};
pub use storage::{LocalCacheStorage, MemoryBackend, StorageBackend};

#[cfg(feature = "std")]
pub use storage::FsBackend;

use alloc::boxed::Box;
use alloc::sync::Arc;

/// Build the maze page's worker with the default configuration.
pub fn maze_worker(caches: Arc<dyn CacheStorage>, network: Arc<dyn Network>) -> ServiceWorker {
    worker_with_config(WorkerConfig::default(), caches, network)
}

/// Build a cache-first worker for an arbitrary configuration.
pub fn worker_with_config(
    config: WorkerConfig,
    caches: Arc<dyn CacheStorage>,
    network: Arc<dyn Network>,
) -> ServiceWorker {
    log::debug!(
        "[SW] Creating worker for scope {} (cache '{}')",
        config.scope.path(),
        config.cache_name
    );
    let handler = CacheFirstHandler::new(config, caches, network.clone());
    ServiceWorker::new(Box::new(handler), network)
}
