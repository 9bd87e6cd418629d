//! Configuration for the context subsystem.

use serde::{Deserialize, Serialize};

use crate::memory::core::errors::{ContextError, ContextResult};

/// Top-level configuration for the context core.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    /// Embedding cache settings.
    pub cache: CacheConfig,
    /// Summarization settings.
    pub summary: SummaryConfig,
}

impl ContextConfig {
    /// Parse a JSON document and validate it.
    ///
    /// Missing sections and fields fall back to their defaults.
    ///
    /// # Errors
    /// Returns an error if the JSON is malformed or a value is out of range.
    pub fn from_json_str(raw: &str) -> ContextResult<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    /// Returns an error if any values are out of range or invalid.
    pub fn validate(&self) -> ContextResult<()> {
        self.cache.validate()?;
        self.summary.validate()
    }
}

/// Embedding cache settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of cached embeddings.
    pub capacity: usize,
    /// Seconds after which a cached embedding is considered stale.
    pub ttl_seconds: u64,
}

impl CacheConfig {
    /// Validate cache settings.
    ///
    /// # Errors
    /// Returns an error if capacity or TTL is zero.
    pub fn validate(&self) -> ContextResult<()> {
        if self.capacity == 0 {
            return Err(ContextError::InvalidConfig(
                "cache.capacity must be > 0".to_string(),
            ));
        }

        if self.ttl_seconds == 0 {
            return Err(ContextError::InvalidConfig(
                "cache.ttl_seconds must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 256,
            ttl_seconds: 3600,
        }
    }
}

/// Summarization settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    /// Default token budget when a call does not pass one.
    pub max_summary_tokens: usize,
    /// Token budget for each query rendered in an extractive summary.
    pub query_token_budget: usize,
    /// Token budget for each response rendered in an extractive summary.
    pub response_token_budget: usize,
    /// Histories at or below this length are rendered verbatim.
    pub full_transcript_threshold: usize,
    /// Pending requests the summarization worker queue can hold.
    pub queue_depth: usize,
}

impl SummaryConfig {
    /// Validate summarization settings.
    ///
    /// # Errors
    /// Returns an error if a per-block budget or the queue depth is zero.
    pub fn validate(&self) -> ContextResult<()> {
        if self.query_token_budget == 0 {
            return Err(ContextError::InvalidConfig(
                "summary.query_token_budget must be > 0".to_string(),
            ));
        }

        if self.response_token_budget == 0 {
            return Err(ContextError::InvalidConfig(
                "summary.response_token_budget must be > 0".to_string(),
            ));
        }

        if self.queue_depth == 0 {
            return Err(ContextError::InvalidConfig(
                "summary.queue_depth must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            max_summary_tokens: 500,
            query_token_budget: 50,
            response_token_budget: 100,
            full_transcript_threshold: 3,
            queue_depth: 32,
        }
    }
}
