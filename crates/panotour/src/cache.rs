//! Cache abstractions for fetched records.
//!
//! The [`Client`](crate::Client) consults a `RecordCache` before going to the
//! network, so repeated tours over the same scenes only fetch each record once
//! per cache lifetime.
//!
//! # Implementations
//!
//! - [`MemoryCache`]: In-memory cache with an optional entry limit
//! - [`NoCache`]: Passthrough implementation that caches nothing

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, RwLock};

use crate::error::{Error, Result};
use crate::types::{Hotspot, Scene, SceneId};

/// Future type for cache get operations.
pub type GetFuture<'a> = Pin<Box<dyn Future<Output = Result<Option<CachedRecord>>> + Send + 'a>>;

/// Future type for cache put/remove operations.
pub type CacheFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

/// Future type for cache contains operations.
pub type ContainsFuture<'a> = Pin<Box<dyn Future<Output = Result<bool>> + Send + 'a>>;

/// Key of a cached lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKey {
    /// A scene looked up by id.
    Scene(SceneId),
    /// The hotspots whose origin is the given scene.
    Hotspots(SceneId),
}

/// A cached lookup result.
#[derive(Debug, Clone, PartialEq)]
pub enum CachedRecord {
    Scene(Scene),
    Hotspots(Vec<Hotspot>),
}

/// A cache for fetched records.
pub trait RecordCache: Send + Sync {
    /// Get a record from the cache.
    ///
    /// Returns `Ok(Some(record))` if cached, `Ok(None)` if not, or an error if
    /// the cache itself failed.
    fn get(&self, key: RecordKey) -> GetFuture<'_>;

    /// Store a record under the given key, replacing any previous value.
    fn put(&self, key: RecordKey, record: CachedRecord) -> CacheFuture<'_>;

    /// Check if a key is cached without retrieving it.
    fn contains(&self, key: RecordKey) -> ContainsFuture<'_>;

    /// Remove a record from the cache.
    fn remove(&self, key: RecordKey) -> CacheFuture<'_>;

    /// Clear all cached records.
    fn clear(&self) -> CacheFuture<'_>;
}

/// A cache that stores nothing (passthrough).
#[derive(Debug, Clone, Default)]
pub struct NoCache;

impl NoCache {
    /// Create a new no-op cache.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl RecordCache for NoCache {
    fn get(&self, _key: RecordKey) -> GetFuture<'_> {
        Box::pin(async { Ok(None) })
    }

    fn put(&self, _key: RecordKey, _record: CachedRecord) -> CacheFuture<'_> {
        Box::pin(async { Ok(()) })
    }

    fn contains(&self, _key: RecordKey) -> ContainsFuture<'_> {
        Box::pin(async { Ok(false) })
    }

    fn remove(&self, _key: RecordKey) -> CacheFuture<'_> {
        Box::pin(async { Ok(()) })
    }

    fn clear(&self) -> CacheFuture<'_> {
        Box::pin(async { Ok(()) })
    }
}

/// An in-memory record cache.
///
/// Clones share the same storage. With an entry limit, the oldest inserted
/// entries are evicted first.
#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    data: Arc<RwLock<MemoryCacheInner>>,
    max_entries: Option<usize>,
}

#[derive(Debug, Default)]
struct MemoryCacheInner {
    entries: HashMap<RecordKey, CachedRecord>,
    /// Insertion order for eviction.
    order: VecDeque<RecordKey>,
}

fn poisoned(operation: &'static str) -> Error {
    Error::Cache {
        operation,
        message: "lock poisoned".to_string(),
    }
}

impl MemoryCache {
    /// Create a new memory cache with no entry limit.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new memory cache holding at most `max_entries` records.
    #[must_use]
    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            data: Arc::default(),
            max_entries: Some(max_entries),
        }
    }

    /// Get the number of cached records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.read().map_or(0, |d| d.entries.len())
    }

    /// Check if the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get_now(&self, key: RecordKey) -> Result<Option<CachedRecord>> {
        let data = self.data.read().map_err(|_| poisoned("get"))?;
        Ok(data.entries.get(&key).cloned())
    }

    fn put_now(&self, key: RecordKey, record: CachedRecord) -> Result<()> {
        let mut cache = self.data.write().map_err(|_| poisoned("put"))?;

        if cache.entries.remove(&key).is_some() {
            cache.order.retain(|k| *k != key);
        }

        if let Some(max_entries) = self.max_entries {
            if max_entries == 0 {
                return Ok(());
            }
            while cache.entries.len() >= max_entries {
                let Some(oldest) = cache.order.pop_front() else {
                    break;
                };
                cache.entries.remove(&oldest);
            }
        }

        cache.entries.insert(key, record);
        cache.order.push_back(key);
        Ok(())
    }

    fn remove_now(&self, key: RecordKey) -> Result<()> {
        let mut cache = self.data.write().map_err(|_| poisoned("remove"))?;
        if cache.entries.remove(&key).is_some() {
            cache.order.retain(|k| *k != key);
        }
        Ok(())
    }

    fn clear_now(&self) -> Result<()> {
        let mut cache = self.data.write().map_err(|_| poisoned("clear"))?;
        cache.entries.clear();
        cache.order.clear();
        Ok(())
    }
}

impl RecordCache for MemoryCache {
    fn get(&self, key: RecordKey) -> GetFuture<'_> {
        let result = self.get_now(key);
        Box::pin(async move { result })
    }

    fn put(&self, key: RecordKey, record: CachedRecord) -> CacheFuture<'_> {
        let result = self.put_now(key, record);
        Box::pin(async move { result })
    }

    fn contains(&self, key: RecordKey) -> ContainsFuture<'_> {
        let result = self
            .data
            .read()
            .map(|d| d.entries.contains_key(&key))
            .map_err(|_| poisoned("contains"));
        Box::pin(async move { result })
    }

    fn remove(&self, key: RecordKey) -> CacheFuture<'_> {
        let result = self.remove_now(key);
        Box::pin(async move { result })
    }

    fn clear(&self) -> CacheFuture<'_> {
        let result = self.clear_now();
        Box::pin(async move { result })
    }
}
