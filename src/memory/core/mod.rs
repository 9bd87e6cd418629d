//! Core context types: configuration, errors, identifiers and interactions.

pub mod config;
pub mod errors;
pub mod ids;
pub mod interaction;

pub use config::{CacheConfig, ContextConfig, SummaryConfig};
pub use errors::{ContextError, ContextResult};
pub use ids::InteractionId;
pub use interaction::ContextInteraction;
