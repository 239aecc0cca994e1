//! Local Cache Storage
//!
//! Concrete [`CacheStorage`] used by the worker host. Each named cache
//! lives in memory behind a `spin::RwLock` and is mirrored to a
//! [`StorageBackend`] as one postcard snapshot, so its contents survive a
//! restart until the cache is explicitly deleted.
//!
//! Snapshot layout: `CacheSnapshot { version, name, created, entries }`,
//! one blob per cache name. `created` orders caches by creation so that
//! lookups and `keys()` keep that order across restarts.

use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use spin::{Mutex, RwLock};

use crate::cache::{Cache, CacheError, CacheHandle, CacheStorage, Result};
use crate::fetch::{Request, RequestKey, Response};

// ── Constants ───────────────────────────────────────────────

/// Snapshot format version.
const SNAPSHOT_VERSION: u32 = 2;

// ── Backend ─────────────────────────────────────────────────

/// Where cache snapshots are kept between runs.
pub trait StorageBackend: Send + Sync {
    /// Read the snapshot for a cache, `None` if it was never written.
    fn load(&self, name: &str) -> Result<Option<Vec<u8>>>;

    /// Replace the snapshot for a cache.
    fn store(&self, name: &str, bytes: &[u8]) -> Result<()>;

    /// Drop the snapshot for a cache. Missing snapshots are not an error.
    fn remove(&self, name: &str) -> Result<()>;

    /// Names of every stored cache.
    fn list(&self) -> Result<Vec<String>>;
}

/// Volatile backend; contents last as long as the value does.
#[derive(Default)]
pub struct MemoryBackend {
    blobs: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryBackend {
    fn load(&self, name: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.blobs.read().get(name).cloned())
    }

    fn store(&self, name: &str, bytes: &[u8]) -> Result<()> {
        self.blobs.write().insert(name.to_string(), bytes.to_vec());
        Ok(())
    }

    fn remove(&self, name: &str) -> Result<()> {
        self.blobs.write().remove(name);
        Ok(())
    }

    fn list(&self) -> Result<Vec<String>> {
        Ok(self.blobs.read().keys().cloned().collect())
    }
}

#[cfg(feature = "std")]
pub use fs_backend::FsBackend;

#[cfg(feature = "std")]
mod fs_backend {
    use super::*;
    use std::fs;
    use std::io::ErrorKind;
    use std::path::{Path, PathBuf};

    const EXTENSION: &str = "cache";

    /// File-system backend: one `<hex(name)>.cache` file per cache.
    ///
    /// Names are hex encoded so any cache name maps to a safe file name.
    #[derive(Debug, Clone)]
    pub struct FsBackend {
        dir: PathBuf,
    }

    impl FsBackend {
        /// Use `dir` as the storage root, creating it if needed.
        pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
            let dir = dir.into();
            fs::create_dir_all(&dir).map_err(|e| io_error(&dir, e))?;
            Ok(Self { dir })
        }

        /// Storage root
        pub fn dir(&self) -> &Path {
            &self.dir
        }

        fn path_for(&self, name: &str) -> PathBuf {
            self.dir.join(format!("{}.{}", hex_encode(name), EXTENSION))
        }
    }

    impl StorageBackend for FsBackend {
        fn load(&self, name: &str) -> Result<Option<Vec<u8>>> {
            let path = self.path_for(name);
            match fs::read(&path) {
                Ok(bytes) => Ok(Some(bytes)),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
                Err(e) => Err(io_error(&path, e)),
            }
        }

        fn store(&self, name: &str, bytes: &[u8]) -> Result<()> {
            let path = self.path_for(name);
            let tmp = path.with_extension("tmp");
            fs::write(&tmp, bytes).map_err(|e| io_error(&tmp, e))?;
            fs::rename(&tmp, &path).map_err(|e| io_error(&path, e))
        }

        fn remove(&self, name: &str) -> Result<()> {
            let path = self.path_for(name);
            match fs::remove_file(&path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
                Err(e) => Err(io_error(&path, e)),
            }
        }

        fn list(&self) -> Result<Vec<String>> {
            let mut names = Vec::new();
            let dir = fs::read_dir(&self.dir).map_err(|e| io_error(&self.dir, e))?;
            for entry in dir {
                let path = entry.map_err(|e| io_error(&self.dir, e))?.path();
                if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                    continue;
                }
                let decoded = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .and_then(hex_decode);
                match decoded {
                    Some(name) => names.push(name),
                    None => log::warn!("[SW Storage] Skipping foreign file {}", path.display()),
                }
            }
            names.sort();
            Ok(names)
        }
    }

    fn io_error(path: &Path, err: std::io::Error) -> CacheError {
        CacheError::Storage(format!("{}: {}", path.display(), err))
    }

    fn hex_encode(name: &str) -> String {
        name.bytes().map(|b| format!("{:02x}", b)).collect()
    }

    fn hex_decode(stem: &str) -> Option<String> {
        if stem.len() % 2 != 0 {
            return None;
        }
        let bytes = (0..stem.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(stem.get(i..i + 2)?, 16).ok())
            .collect::<Option<Vec<u8>>>()?;
        String::from_utf8(bytes).ok()
    }

}

// ── Snapshot ────────────────────────────────────────────────

/// A cached request-response pair
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    request: Request,
    response: Response,
}

#[derive(Serialize, Deserialize)]
struct CacheSnapshot {
    version: u32,
    name: String,
    created: u64,
    entries: Vec<CacheEntry>,
}

type Entries = BTreeMap<RequestKey, CacheEntry>;

fn encode_snapshot(name: &str, created: u64, entries: &Entries) -> Result<Vec<u8>> {
    let snapshot = CacheSnapshot {
        version: SNAPSHOT_VERSION,
        name: name.to_string(),
        created,
        entries: entries.values().cloned().collect(),
    };
    postcard::to_allocvec(&snapshot).map_err(|e| CacheError::Storage(format!("encode {}: {}", name, e)))
}

fn decode_snapshot(name: &str, bytes: &[u8]) -> Result<(u64, Entries)> {
    let snapshot: CacheSnapshot = postcard::from_bytes(bytes)
        .map_err(|e| CacheError::Corrupt(format!("{}: {}", name, e)))?;
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(CacheError::Corrupt(format!(
            "{}: unsupported snapshot version {}",
            name, snapshot.version
        )));
    }
    if snapshot.name != name {
        return Err(CacheError::Corrupt(format!(
            "{}: snapshot belongs to '{}'",
            name, snapshot.name
        )));
    }
    let entries = snapshot
        .entries
        .into_iter()
        .map(|entry| (entry.request.key(), entry))
        .collect();
    Ok((snapshot.created, entries))
}

// ── LocalCache ──────────────────────────────────────────────

/// A named cache mirrored to a backend.
pub struct LocalCache {
    name: String,
    /// Creation sequence number within its storage
    created: u64,
    entries: RwLock<Entries>,
    /// Serializes writers while a snapshot is persisted
    writer: Mutex<()>,
    backend: Arc<dyn StorageBackend>,
}

impl LocalCache {
    fn with_entries(
        name: &str,
        created: u64,
        entries: Entries,
        backend: Arc<dyn StorageBackend>,
    ) -> Self {
        Self {
            name: name.to_string(),
            created,
            entries: RwLock::new(entries),
            writer: Mutex::new(()),
            backend,
        }
    }

    fn restore(name: &str, bytes: &[u8], backend: Arc<dyn StorageBackend>) -> Result<Self> {
        let (created, entries) = decode_snapshot(name, bytes)?;
        Ok(Self::with_entries(name, created, entries, backend))
    }

    fn persist(&self, entries: &Entries) -> Result<()> {
        let bytes = encode_snapshot(&self.name, self.created, entries)?;
        self.backend.store(&self.name, &bytes)
    }

    /// Persist `next`, then publish it. Readers keep the old map until the
    /// snapshot is durable and never wait on backend I/O.
    fn commit(&self, next: Entries) -> Result<()> {
        self.persist(&next)?;
        *self.entries.write() = next;
        Ok(())
    }
}

impl Cache for LocalCache {
    fn name(&self) -> &str {
        &self.name
    }

    fn match_request(&self, request: &Request) -> Option<Response> {
        self.entries
            .read()
            .get(&request.key())
            .map(|e| e.response.clone())
    }

    fn put_all(&self, batch: Vec<(Request, Response)>) -> Result<()> {
        let _writer = self.writer.lock();
        let mut next = self.entries.read().clone();
        let count = batch.len();
        for (request, response) in batch {
            next.insert(request.key(), CacheEntry { request, response });
        }
        self.commit(next)?;
        log::debug!("[SW Cache] '{}' stored {} entries", self.name, count);
        Ok(())
    }

    fn delete(&self, request: &Request) -> Result<bool> {
        let _writer = self.writer.lock();
        let key = request.key();
        let mut next = self.entries.read().clone();
        if next.remove(&key).is_none() {
            return Ok(false);
        }
        self.commit(next)?;
        Ok(true)
    }

    fn keys(&self) -> Vec<Request> {
        self.entries
            .read()
            .values()
            .map(|e| e.request.clone())
            .collect()
    }

    fn len(&self) -> usize {
        self.entries.read().len()
    }
}

// ── LocalCacheStorage ───────────────────────────────────────

/// Cache storage for one origin.
pub struct LocalCacheStorage {
    /// Open caches, oldest first
    caches: RwLock<Vec<Arc<LocalCache>>>,
    next_created: AtomicU64,
    backend: Arc<dyn StorageBackend>,
}

impl LocalCacheStorage {
    /// Open storage over a backend, restoring every cache it holds.
    ///
    /// A corrupt snapshot is logged and skipped so the remaining caches
    /// still answer. Backend read failures are returned.
    pub fn new(backend: Arc<dyn StorageBackend>) -> Result<Self> {
        let mut caches = Vec::new();
        for name in backend.list()? {
            let Some(bytes) = backend.load(&name)? else {
                continue;
            };
            match LocalCache::restore(&name, &bytes, backend.clone()) {
                Ok(cache) => {
                    log::debug!("[SW Storage] Restored '{}' ({} entries)", name, cache.len());
                    caches.push(Arc::new(cache));
                }
                Err(CacheError::Corrupt(reason)) => {
                    log::warn!("[SW Storage] Skipping corrupt cache: {}", reason);
                }
                Err(e) => return Err(e),
            }
        }
        caches.sort_by_key(|cache| cache.created);
        let next_created = caches.last().map_or(0, |cache| cache.created + 1);

        Ok(Self {
            caches: RwLock::new(caches),
            next_created: AtomicU64::new(next_created),
            backend,
        })
    }

    /// Storage that forgets everything when dropped.
    pub fn in_memory() -> Self {
        Self {
            caches: RwLock::new(Vec::new()),
            next_created: AtomicU64::new(0),
            backend: Arc::new(MemoryBackend::new()),
        }
    }

    fn find(caches: &[Arc<LocalCache>], name: &str) -> Option<Arc<LocalCache>> {
        caches.iter().find(|cache| cache.name == name).cloned()
    }
}

impl CacheStorage for LocalCacheStorage {
    fn open(&self, name: &str) -> Result<CacheHandle> {
        if let Some(cache) = Self::find(&self.caches.read(), name) {
            return Ok(cache);
        }

        let mut caches = self.caches.write();
        // Another opener may have won the race.
        if let Some(cache) = Self::find(&caches, name) {
            return Ok(cache);
        }
        let created = self.next_created.fetch_add(1, Ordering::Relaxed);
        let cache = Arc::new(LocalCache::with_entries(
            name,
            created,
            BTreeMap::new(),
            self.backend.clone(),
        ));
        cache.persist(&BTreeMap::new())?;
        caches.push(cache.clone());
        log::debug!("[SW Storage] Created cache '{}'", name);
        Ok(cache)
    }

    fn has(&self, name: &str) -> bool {
        self.caches.read().iter().any(|cache| cache.name == name)
    }

    fn delete(&self, name: &str) -> Result<bool> {
        let mut caches = self.caches.write();
        let Some(pos) = caches.iter().position(|cache| cache.name == name) else {
            return Ok(false);
        };
        self.backend.remove(name)?;
        caches.remove(pos);
        log::debug!("[SW Storage] Deleted cache '{}'", name);
        Ok(true)
    }

    fn keys(&self) -> Vec<String> {
        self.caches
            .read()
            .iter()
            .map(|cache| cache.name.clone())
            .collect()
    }

    fn match_request(&self, request: &Request) -> Result<Option<Response>> {
        Ok(self
            .caches
            .read()
            .iter()
            .find_map(|cache| cache.match_request(request)))
    }
}

// ── Tests ───────────────────────────────────────────────────
