//! Abstraction over the external embedding generator.

use std::future::Future;
use std::pin::Pin;

use crate::memory::core::errors::ContextResult;

/// Boxed future type for embedder operations.
pub type EmbedFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Trait abstraction over embedding models.
///
/// The context core never talks to a model itself; callers plug their
/// generator in here and the embedding cache memoizes its output.
pub trait Embedder: Send + Sync {
    /// Embed a single text string.
    ///
    /// # Errors
    /// Returns an error if the embedding request fails.
    fn embed_text(&self, text: &str) -> EmbedFuture<'_, ContextResult<Vec<f32>>>;
    /// Length of every vector `embed_text` returns; the embedding cache
    /// rejects anything else.
    fn ndims(&self) -> usize;
}
