//! Error types for the context subsystem.

use thiserror::Error;

/// Context subsystem error type.
#[derive(Debug, Error)]
pub enum ContextError {
    /// Invalid configuration or unsupported values.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// Error reported by an external embedding generator.
    #[error("embedding error: {0}")]
    Embedding(String),
    /// The summarization worker has stopped and no longer accepts requests.
    #[error("summarization worker is not running")]
    WorkerUnavailable,
}

/// Convenience result alias for context operations.
pub type ContextResult<T> = Result<T, ContextError>;
