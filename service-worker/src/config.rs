//! Worker Configuration
//!
//! The cache name is bumped together with the asset list. A new name opens
//! a disjoint cache; the previous one stays on disk until something else
//! deletes it.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::fetch::{Request, Scope};

/// Name of the cache this version of the worker fills.
pub const CACHE_NAME: &str = "maze-cache-v4";

/// Assets fetched and stored during install, relative to the scope.
pub const PRECACHE_ASSETS: &[&str] = &["./index.html", "./manifest.json"];

/// Scope used when the host does not supply one.
pub const DEFAULT_SCOPE: &str = "/";

/// Service Worker configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerConfig {
    /// Cache opened on install
    pub cache_name: String,
    /// Asset list seeded on install
    pub assets: Vec<String>,
    /// The scope this worker controls
    pub scope: Scope,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            cache_name: CACHE_NAME.to_string(),
            assets: PRECACHE_ASSETS.iter().map(|s| s.to_string()).collect(),
            scope: Scope::new(DEFAULT_SCOPE),
        }
    }
}

impl WorkerConfig {
    pub fn with_cache_name(mut self, name: impl Into<String>) -> Self {
        self.cache_name = name.into();
        self
    }

    pub fn with_assets<I, S>(mut self, assets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.assets = assets.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Scope::new(scope);
        self
    }

    /// Install-time requests, in asset list order, resolved against the scope.
    pub fn precache_requests(&self) -> Vec<Request> {
        self.assets
            .iter()
            .map(|asset| Request::new(self.scope.resolve(asset)))
            .collect()
    }
}
