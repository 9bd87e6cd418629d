//! Bounded caches used to memoize embedding computations.

pub mod bounded_cache;
pub mod embedding_cache;
pub mod ttl_entry;

pub use bounded_cache::{BoundedCache, CacheStats};
pub use embedding_cache::{EmbeddingCache, cache_key, normalize_text};
pub use ttl_entry::{DEFAULT_TTL_SECONDS, TtlEntry};
