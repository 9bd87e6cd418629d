//! Embedding generator seam.

pub mod embedder;

pub use embedder::{EmbedFuture, Embedder};
