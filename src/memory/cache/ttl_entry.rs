//! Embedding value paired with a creation time and a lazy expiry check.

use chrono::{DateTime, Duration, Utc};

/// Default lifetime of a cached embedding, in seconds.
pub const DEFAULT_TTL_SECONDS: i64 = 3600;

/// Cached embedding with a creation timestamp.
///
/// Expiry is evaluated on read; nothing removes an expired entry from the cache.
/// An entry aged exactly the TTL is still live.
#[derive(Clone, Debug, PartialEq)]
pub struct TtlEntry {
    embedding: Vec<f32>,
    created_at: DateTime<Utc>,
    ttl: Duration,
}

impl TtlEntry {
    /// Wrap an embedding created now with the default TTL.
    #[must_use]
    pub fn new(embedding: Vec<f32>) -> Self {
        Self::new_at(embedding, Utc::now())
    }

    /// Wrap an embedding with an explicit creation time and the default TTL.
    #[must_use]
    pub fn new_at(embedding: Vec<f32>, created_at: DateTime<Utc>) -> Self {
        Self {
            embedding,
            created_at,
            ttl: Duration::seconds(DEFAULT_TTL_SECONDS),
        }
    }

    /// Override the lifetime.
    #[must_use]
    pub const fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Cached embedding vector.
    #[must_use]
    pub fn embedding(&self) -> &[f32] {
        &self.embedding
    }

    /// Creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Age relative to `now`.
    #[must_use]
    pub fn age_at(&self, now: DateTime<Utc>) -> Duration {
        now.signed_duration_since(self.created_at)
    }

    /// Whether the entry is stale at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.age_at(now) > self.ttl
    }

    /// Whether the entry is stale against the wall clock.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry_boundaries() {
        let created = Utc::now();
        let entry = TtlEntry::new_at(vec![0.1, 0.2], created);

        assert!(!entry.is_expired_at(created));
        assert!(!entry.is_expired_at(created + Duration::seconds(3599)));
        assert!(!entry.is_expired_at(created + Duration::seconds(3600)));
        assert!(entry.is_expired_at(created + Duration::seconds(3601)));
    }

    #[test]
    fn test_fresh_entry_not_expired() {
        let entry = TtlEntry::new(vec![1.0]);
        assert!(!entry.is_expired());
        assert_eq!(entry.embedding(), &[1.0_f32]);
    }

    #[test]
    fn test_custom_ttl() {
        let created = Utc::now();
        let entry = TtlEntry::new_at(vec![], created).with_ttl(Duration::seconds(10));
        assert!(entry.is_expired_at(created + Duration::seconds(11)));
        assert_eq!(entry.age_at(created + Duration::seconds(11)).num_seconds(), 11);
    }
}
