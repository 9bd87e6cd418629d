//! Frequency-based topic extraction.

use std::collections::HashMap;

use crate::memory::core::interaction::ContextInteraction;

/// Maximum number of topics returned.
pub const MAX_TOPICS: usize = 5;

/// Words long enough to pass the length filter but carrying no topic.
pub const STOP_WORDS: [&str; 14] = [
    "this", "that", "with", "from", "have", "they", "what", "when", "where", "which", "about",
    "their", "would", "there",
];

/// Most frequent content words across queries and responses.
///
/// Words are lowercased and split on whitespace; words of three characters or
/// fewer and stop words are ignored. Equal counts keep first-seen order.
#[must_use]
pub fn extract_topics(interactions: &[ContextInteraction]) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut first_seen: Vec<String> = Vec::new();

    for interaction in interactions {
        let text = format!("{} {}", interaction.query(), interaction.response()).to_lowercase();
        for word in text.split_whitespace() {
            if word.chars().count() <= 3 || STOP_WORDS.contains(&word) {
                continue;
            }
            let count = counts.entry(word.to_string()).or_insert(0);
            if *count == 0 {
                first_seen.push(word.to_string());
            }
            *count += 1;
        }
    }

    // stable sort keeps first-seen order among ties
    first_seen.sort_by(|a, b| counts[b].cmp(&counts[a]));
    first_seen.truncate(MAX_TOPICS);
    first_seen
}
