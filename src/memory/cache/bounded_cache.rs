//! Fixed-capacity LRU store guarded by a single lock.

use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard, PoisonError};

use lru::LruCache;
use tracing::debug;

use crate::memory::core::errors::{ContextError, ContextResult};

/// Counters describing cache activity since construction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups that found a value.
    pub hits: u64,
    /// Lookups that found nothing.
    pub misses: u64,
    /// Entries dropped to make room for a new key.
    pub evictions: u64,
    /// Live entries.
    pub entries: usize,
    /// Configured capacity.
    pub capacity: usize,
}

impl CacheStats {
    /// Share of lookups that hit, or `0.0` before any lookup.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

struct Inner<K: Hash + Eq, V> {
    entries: LruCache<K, V>,
    hits: u64,
    misses: u64,
    evictions: u64,
}

/// Generic key/value store with strict least-recently-used eviction.
///
/// Values and recency order live behind one mutex, so every operation observes
/// and leaves a consistent pair. No operation performs I/O while holding it.
pub struct BoundedCache<K: Hash + Eq, V> {
    inner: Mutex<Inner<K, V>>,
}

impl<K: Hash + Eq, V> BoundedCache<K, V> {
    /// Create a cache holding at most `capacity` entries.
    #[must_use]
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: LruCache::new(capacity),
                hits: 0,
                misses: 0,
                evictions: 0,
            }),
        }
    }

    /// Create a cache from a plain capacity.
    ///
    /// # Errors
    /// Returns an error if `capacity` is zero.
    pub fn with_capacity(capacity: usize) -> ContextResult<Self> {
        let capacity = NonZeroUsize::new(capacity).ok_or_else(|| {
            ContextError::InvalidConfig("cache capacity must be > 0".to_string())
        })?;
        Ok(Self::new(capacity))
    }

    // Cache state is consistent between operations, so a poisoned lock is safe to reuse.
    fn lock(&self) -> MutexGuard<'_, Inner<K, V>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert or refresh `key`, making it the most recently used entry.
    ///
    /// Refreshing an existing key never evicts. Inserting a new key into a full
    /// cache evicts exactly the least recently used entry first.
    pub fn put(&self, key: K, value: V) {
        let mut inner = self.lock();
        let refreshed = inner.entries.contains(&key);
        let displaced = inner.entries.push(key, value);
        if !refreshed && displaced.is_some() {
            inner.evictions += 1;
            debug!(
                capacity = inner.entries.cap().get(),
                "Evicted least recently used entry"
            );
        }
    }

    /// Remove every entry.
    pub fn clear(&self) {
        self.lock().entries.clear();
    }

    /// Number of live entries.
    #[must_use]
    pub fn count(&self) -> usize {
        self.lock().entries.len()
    }

    /// Maximum number of entries.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.lock().entries.cap().get()
    }

    /// Whether `key` is present, without touching its recency.
    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.lock().entries.contains(key)
    }

    /// Snapshot of activity counters.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let inner = self.lock();
        CacheStats {
            hits: inner.hits,
            misses: inner.misses,
            evictions: inner.evictions,
            entries: inner.entries.len(),
            capacity: inner.entries.cap().get(),
        }
    }
}

impl<K: Hash + Eq, V: Clone> BoundedCache<K, V> {
    /// Look up `key`; a hit makes it the most recently used entry.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<V> {
        let mut inner = self.lock();
        let found = inner.entries.get(key).cloned();
        if found.is_some() {
            inner.hits += 1;
        } else {
            inner.misses += 1;
        }
        found
    }
}

impl<K: Hash + Eq + Clone, V> BoundedCache<K, V> {
    /// Keys ordered from least to most recently used.
    #[must_use]
    pub fn keys_by_recency(&self) -> Vec<K> {
        self.lock()
            .entries
            .iter()
            .rev()
            .map(|(key, _)| key.clone())
            .collect()
    }
}
