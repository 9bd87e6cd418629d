//! Salience scoring for interactions inside a history.

use crate::memory::core::interaction::ContextInteraction;

const BASE_SCORE: f64 = 0.5;
const MAX_RECENCY_BONUS: f64 = 0.3;
const RECENCY_WINDOW_SECONDS: f64 = 86_400.0;
const LENGTH_BONUS: f64 = 0.2;
const QUESTION_BONUS: f64 = 0.1;
const KEY_TERM_BONUS: f64 = 0.1;

/// Query terms that mark an interaction as worth keeping.
pub const KEY_TERMS: [&str; 7] = [
    "important",
    "remember",
    "note",
    "summary",
    "explain",
    "why",
    "how",
];

/// Score `interaction` relative to the history it belongs to.
///
/// Additive and unnormalized: base 0.5, up to 0.3 for recency within the last
/// day of the history, 0.2 for an above-average response length, 0.1 for a
/// question and 0.1 for a key term in the query.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn score(interaction: &ContextInteraction, all: &[ContextInteraction]) -> f64 {
    let mut score = BASE_SCORE;

    let last = all
        .iter()
        .map(ContextInteraction::timestamp)
        .max()
        .unwrap_or_else(|| interaction.timestamp());
    let age_seconds = last
        .signed_duration_since(interaction.timestamp())
        .num_milliseconds() as f64
        / 1000.0;
    let recency_factor = 1.0 - age_seconds / RECENCY_WINDOW_SECONDS;
    score += (recency_factor * MAX_RECENCY_BONUS).clamp(0.0, MAX_RECENCY_BONUS);

    if !all.is_empty() {
        let total_len: usize = all.iter().map(|i| i.response().chars().count()).sum();
        let mean_len = total_len as f64 / all.len() as f64;
        if interaction.response().chars().count() as f64 > mean_len {
            score += LENGTH_BONUS;
        }
    }

    if interaction.query().contains('?') {
        score += QUESTION_BONUS;
    }

    let query = interaction.query().to_lowercase();
    if KEY_TERMS.iter().any(|term| query.contains(term)) {
        score += KEY_TERM_BONUS;
    }

    score
}
