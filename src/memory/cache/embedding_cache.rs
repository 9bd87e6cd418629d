//! Memoization of embedding vectors keyed by a hash of the source text.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::memory::cache::bounded_cache::{BoundedCache, CacheStats};
use crate::memory::cache::ttl_entry::{DEFAULT_TTL_SECONDS, TtlEntry};
use crate::memory::core::config::CacheConfig;
use crate::memory::core::errors::{ContextError, ContextResult};
use crate::memory::embedding::embedder::Embedder;

/// Trim and collapse whitespace runs to a single space; case is preserved.
#[must_use]
pub fn normalize_text(text: &str) -> String {
    let mut normalized = String::with_capacity(text.len());
    let mut prev_space = false;

    for ch in text.trim().chars() {
        if ch.is_whitespace() {
            if !prev_space {
                normalized.push(' ');
                prev_space = true;
            }
        } else {
            normalized.push(ch);
            prev_space = false;
        }
    }

    normalized
}

/// Compute the cache key for a text.
///
/// Keys are only meaningful within one process: `DefaultHasher` output may
/// change between Rust releases.
#[must_use]
pub fn cache_key(text: &str) -> String {
    let mut hasher = DefaultHasher::new();
    normalize_text(text).hash(&mut hasher);
    let value = hasher.finish();
    format!("{value:016x}")
}

/// LRU cache of embeddings whose hits are only trusted while fresh.
pub struct EmbeddingCache {
    entries: BoundedCache<String, TtlEntry>,
    ttl: Duration,
}

impl EmbeddingCache {
    /// Build a cache from configuration.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub fn new(config: &CacheConfig) -> ContextResult<Self> {
        config.validate()?;
        let capacity = NonZeroUsize::new(config.capacity).ok_or_else(|| {
            ContextError::InvalidConfig("cache.capacity must be > 0".to_string())
        })?;
        let ttl = Duration::from_std(std::time::Duration::from_secs(config.ttl_seconds))
            .unwrap_or(Duration::seconds(DEFAULT_TTL_SECONDS));

        Ok(Self {
            entries: BoundedCache::new(capacity),
            ttl,
        })
    }

    /// Fresh embedding for `text`, if one is cached.
    #[must_use]
    pub fn get_fresh(&self, text: &str) -> Option<Vec<f32>> {
        self.get_fresh_at(text, Utc::now())
    }

    /// Fresh embedding for `text` as of `now`; an expired hit counts as a miss.
    #[must_use]
    pub fn get_fresh_at(&self, text: &str, now: DateTime<Utc>) -> Option<Vec<f32>> {
        let entry = self.entries.get(&cache_key(text))?;
        if entry.is_expired_at(now) {
            debug!("Ignoring expired embedding cache entry");
            return None;
        }
        Some(entry.embedding().to_vec())
    }

    /// Store an embedding computed now.
    pub fn insert(&self, text: &str, embedding: Vec<f32>) {
        self.insert_at(text, embedding, Utc::now());
    }

    /// Store an embedding with an explicit creation time.
    pub fn insert_at(&self, text: &str, embedding: Vec<f32>, created_at: DateTime<Utc>) {
        let entry = TtlEntry::new_at(embedding, created_at).with_ttl(self.ttl);
        self.entries.put(cache_key(text), entry);
    }

    /// Return the cached embedding for `text`, computing and storing it on a miss.
    ///
    /// # Errors
    /// Returns an error if the embedder fails or returns a vector whose length
    /// differs from `ndims()`; nothing is cached in either case.
    pub async fn get_or_embed(
        &self,
        embedder: &dyn Embedder,
        text: &str,
    ) -> ContextResult<Vec<f32>> {
        if let Some(embedding) = self.get_fresh(text) {
            return Ok(embedding);
        }

        debug!(chars = text.chars().count(), "Embedding cache miss");
        let embedding = embedder.embed_text(text).await?;
        if embedding.len() != embedder.ndims() {
            return Err(ContextError::Embedding(format!(
                "expected {} dimensions, got {}",
                embedder.ndims(),
                embedding.len()
            )));
        }
        self.insert(text, embedding.clone());
        Ok(embedding)
    }

    /// Number of cached embeddings, fresh or not.
    #[must_use]
    pub fn count(&self) -> usize {
        self.entries.count()
    }

    /// Drop every cached embedding.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Underlying cache counters.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.entries.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::embedding::embedder::EmbedFuture;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingEmbedder {
        calls: AtomicUsize,
        ndims: usize,
    }

    impl CountingEmbedder {
        const fn new(ndims: usize) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                ndims,
            }
        }
    }

    impl Embedder for CountingEmbedder {
        fn embed_text(&self, text: &str) -> EmbedFuture<'_, ContextResult<Vec<f32>>> {
            #[allow(clippy::cast_precision_loss)]
            let value = text.len() as f32;
            Box::pin(async move {
                self.calls.fetch_add(1, Ordering::SeqCst);
                Ok(vec![value, 1.0])
            })
        }

        fn ndims(&self) -> usize {
            self.ndims
        }
    }

    struct FailingEmbedder;

    impl Embedder for FailingEmbedder {
        fn embed_text(&self, _text: &str) -> EmbedFuture<'_, ContextResult<Vec<f32>>> {
            Box::pin(async { Err(ContextError::Embedding("model offline".to_string())) })
        }

        fn ndims(&self) -> usize {
            2
        }
    }

    fn small_cache(capacity: usize) -> ContextResult<EmbeddingCache> {
        EmbeddingCache::new(&CacheConfig {
            capacity,
            ttl_seconds: 3600,
        })
    }

    #[test]
    fn test_key_ignores_whitespace_layout() {
        assert_eq!(cache_key("hello"), cache_key("hello"));
        assert_eq!(cache_key("  hello \n world "), cache_key("hello world"));
        assert_ne!(cache_key("hello"), cache_key("Hello"));
        assert_eq!(cache_key("x").len(), 16);
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("  Hello\t\tWorld \n"), "Hello World");
        assert_eq!(normalize_text("   "), "");
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(matches!(small_cache(0), Err(ContextError::InvalidConfig(_))));
    }

    #[test]
    fn test_expired_hit_is_a_miss() {
        let cache = small_cache(4).unwrap();
        let created = Utc::now();
        cache.insert_at("old text", vec![0.5], created);

        assert_eq!(
            cache.get_fresh_at("old text", created + Duration::seconds(3599)),
            Some(vec![0.5])
        );
        assert_eq!(
            cache.get_fresh_at("old text", created + Duration::seconds(3601)),
            None
        );
        assert_eq!(cache.count(), 1);
    }

    #[test]
    fn test_lru_eviction_applies() {
        let cache = small_cache(2).unwrap();
        cache.insert("a", vec![1.0]);
        cache.insert("b", vec![2.0]);
        let _ = cache.get_fresh("a");
        cache.insert("c", vec![3.0]);

        assert_eq!(cache.get_fresh("b"), None);
        assert_eq!(cache.get_fresh("a"), Some(vec![1.0]));
        assert_eq!(cache.count(), 2);
    }

    #[tokio::test]
    async fn test_get_or_embed_memoizes() {
        let cache = small_cache(4).unwrap();
        let embedder = CountingEmbedder::new(2);

        let first = cache.get_or_embed(&embedder, "hello").await.unwrap();
        let second = cache.get_or_embed(&embedder, " hello ").await.unwrap();

        assert_eq!(first, vec![5.0, 1.0]);
        assert_eq!(first, second);
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_embedder_failure_is_not_cached() {
        let cache = small_cache(4).unwrap();
        let result = cache.get_or_embed(&FailingEmbedder, "hello").await;

        assert!(matches!(result, Err(ContextError::Embedding(_))));
        assert_eq!(cache.count(), 0);
    }

    #[tokio::test]
    async fn test_wrong_dimensionality_is_rejected() {
        let cache = small_cache(4).unwrap();
        let embedder = CountingEmbedder::new(3);

        let result = cache.get_or_embed(&embedder, "hello").await;

        assert!(matches!(result, Err(ContextError::Embedding(_))));
        assert_eq!(cache.count(), 0);
        assert_eq!(cache.get_fresh("hello"), None);
    }
}
