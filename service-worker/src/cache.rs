//! Cache API
//!
//! The host-owned cache storage as seen from the worker. Storage is
//! always reached through these traits so the worker never holds a
//! process-wide singleton.

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use crate::fetch::{Request, Response};
use crate::network::{Network, NetworkError};

/// Cache error types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Cache not found
    NotFound,
    /// Fetching a resource for the cache failed
    Network {
        /// URL being fetched
        url: String,
        /// Underlying failure
        error: NetworkError,
    },
    /// A resource answered with a non-success status
    BadStatus {
        /// URL being fetched
        url: String,
        /// Status received
        status: u16,
    },
    /// Backing store failed
    Storage(String),
    /// Stored snapshot could not be decoded
    Corrupt(String),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheError::NotFound => write!(f, "cache not found"),
            CacheError::Network { url, error } => write!(f, "fetch of {} failed: {}", url, error),
            CacheError::BadStatus { url, status } => {
                write!(f, "fetch of {} returned status {}", url, status)
            }
            CacheError::Storage(msg) => write!(f, "storage error: {}", msg),
            CacheError::Corrupt(msg) => write!(f, "corrupt cache data: {}", msg),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for CacheError {}

/// Result type for cache operations
pub type Result<T> = core::result::Result<T, CacheError>;

/// A named cache (the JS `Cache` object).
///
/// Entries are keyed on [`Request::key`]. Writes go through
/// [`Cache::put_all`], which must apply the whole batch or none of it.
pub trait Cache: Send + Sync {
    /// Cache name
    fn name(&self) -> &str;

    /// Look up the stored response for a request
    fn match_request(&self, request: &Request) -> Option<Response>;

    /// Store a batch of request/response pairs atomically
    fn put_all(&self, entries: Vec<(Request, Response)>) -> Result<()>;

    /// Delete a cached request
    fn delete(&self, request: &Request) -> Result<bool>;

    /// All cached requests
    fn keys(&self) -> Vec<Request>;

    /// Number of entries
    fn len(&self) -> usize;

    /// Whether the cache holds no entries
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Store a single request/response pair
    fn put(&self, request: Request, response: Response) -> Result<()> {
        self.put_all(vec![(request, response)])
    }

    /// Fetch every request and store the responses as one batch.
    ///
    /// Any transport failure or non-2xx status rejects the whole batch
    /// before anything is written.
    fn add_all(&self, network: &dyn Network, requests: &[Request]) -> Result<()> {
        let mut batch = Vec::with_capacity(requests.len());
        for request in requests {
            let response = network.fetch(request).map_err(|error| CacheError::Network {
                url: request.url.clone(),
                error,
            })?;
            if !response.ok() {
                return Err(CacheError::BadStatus {
                    url: request.url.clone(),
                    status: response.status,
                });
            }
            batch.push((request.clone(), response));
        }
        self.put_all(batch)
    }
}

/// Shared handle to an open cache
pub type CacheHandle = Arc<dyn Cache>;

/// Cache storage (the JS `caches` object).
pub trait CacheStorage: Send + Sync {
    /// Open a cache, creating it if absent
    fn open(&self, name: &str) -> Result<CacheHandle>;

    /// Check if a cache exists
    fn has(&self, name: &str) -> bool;

    /// Delete a cache and its persisted data
    fn delete(&self, name: &str) -> Result<bool>;

    /// Names of all caches, oldest first
    fn keys(&self) -> Vec<String>;

    /// Match a request across every cache, first hit wins
    fn match_request(&self, request: &Request) -> Result<Option<Response>>;
}
