//! Summarization engine orchestration module.

pub mod core;

pub use core::{SummarizationEngine, SummarizationHandle};
