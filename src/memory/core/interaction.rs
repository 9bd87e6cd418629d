//! Interaction record consumed by the summarization engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::memory::core::ids::InteractionId;

/// A single query/response exchange supplied by the conversation store.
///
/// Fields are read-only once the record is built.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextInteraction {
    id: InteractionId,
    query: String,
    response: String,
    timestamp: DateTime<Utc>,
    token_count: usize,
}

impl ContextInteraction {
    /// Build an interaction stamped with the current time.
    #[must_use]
    pub fn new(query: impl Into<String>, response: impl Into<String>, token_count: usize) -> Self {
        Self::at(query, response, Utc::now(), token_count)
    }

    /// Build an interaction with an explicit timestamp.
    #[must_use]
    pub fn at(
        query: impl Into<String>,
        response: impl Into<String>,
        timestamp: DateTime<Utc>,
        token_count: usize,
    ) -> Self {
        Self {
            id: InteractionId::new(),
            query: query.into(),
            response: response.into(),
            timestamp,
            token_count,
        }
    }

    /// Replace the generated id with the one assigned by the producer.
    #[must_use]
    pub const fn with_id(mut self, id: InteractionId) -> Self {
        self.id = id;
        self
    }

    /// Stable identifier of this interaction.
    #[must_use]
    pub const fn id(&self) -> InteractionId {
        self.id
    }

    /// User query text.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Assistant response text.
    #[must_use]
    pub fn response(&self) -> &str {
        &self.response
    }

    /// When the interaction happened.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Token count reported by the producer.
    #[must_use]
    pub const fn token_count(&self) -> usize {
        self.token_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_accessors() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).single().unwrap();
        let interaction = ContextInteraction::at("Hi", "Hello", ts, 2);

        assert_eq!(interaction.query(), "Hi");
        assert_eq!(interaction.response(), "Hello");
        assert_eq!(interaction.timestamp(), ts);
        assert_eq!(interaction.token_count(), 2);
    }

    #[test]
    fn test_with_id_keeps_producer_id() {
        let id = InteractionId::new();
        let ts = Utc::now();
        let first = ContextInteraction::at("q", "r", ts, 1).with_id(id);
        let second = ContextInteraction::at("q", "r", ts, 1).with_id(id);

        assert_eq!(first.id(), id);
        assert_eq!(first, second);
    }

    #[test]
    fn test_serde_keeps_id() {
        let interaction = ContextInteraction::new("q", "r", 1);
        let json = serde_json::to_string(&interaction).unwrap();
        let back: ContextInteraction = serde_json::from_str(&json).unwrap();
        assert_eq!(back, interaction);
    }
}
