//! Conversation context subsystem.
//!
//! This module keeps the working context of a conversation bounded, organized into:
//! - `core`: Configuration, errors, IDs and the interaction record
//! - `cache`: Bounded LRU cache, TTL entries and the embedding cache
//! - `embedding`: Seam to the external embedding generator
//! - `summarization`: Scoring, compression, topics, period buckets and summaries
//! - `engine`: Serialized summarization worker

pub mod cache;
pub mod core;
pub mod embedding;
pub mod engine;
pub mod summarization;

// Re-export commonly used types for convenience
pub use cache::{BoundedCache, CacheStats, EmbeddingCache, TtlEntry};
pub use core::{
    CacheConfig, ContextConfig, ContextError, ContextInteraction, ContextResult, InteractionId,
    SummaryConfig,
};
pub use embedding::{EmbedFuture, Embedder};
pub use engine::{SummarizationEngine, SummarizationHandle};
pub use summarization::{
    ConversationSummary, PeriodSummary, SummarizationPeriod, Summarizer, compress,
    estimate_tokens, extract_topics,
};
