//! Extractive, token-bounded summarization of interaction histories.
//!
//! Short histories are rendered verbatim. Longer ones are scored, the most
//! salient interactions are greedily packed into the token budget, and the
//! survivors are rendered back in chronological order with per-block
//! truncation.

use std::collections::BTreeMap;

use chrono::{DateTime, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::memory::core::config::SummaryConfig;
use crate::memory::core::errors::ContextResult;
use crate::memory::core::ids::InteractionId;
use crate::memory::core::interaction::ContextInteraction;
use crate::memory::summarization::compressor::{compress, estimate_tokens};
use crate::memory::summarization::importance::score;
use crate::memory::summarization::period::{
    PeriodSummary, SummarizationPeriod, end_of_period, start_of_period,
};
use crate::memory::summarization::topics::extract_topics;

/// Token-bounded digest of a conversation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationSummary {
    /// Rendered summary text.
    pub text: String,
    /// Up to five most frequent topics.
    pub key_topics: Vec<String>,
    /// Estimated tokens of `text`.
    pub token_count: usize,
    /// Number of interactions summarized.
    pub original_interaction_count: usize,
    /// Ids of the interactions rendered in `text`, in rendered order.
    pub interaction_ids: Vec<InteractionId>,
    /// `token_count` over the total input tokens (at least one).
    pub compression_ratio: f64,
}

/// Stateless summarizer configured with default budgets.
#[derive(Clone, Debug, Default)]
pub struct Summarizer {
    config: SummaryConfig,
}

impl Summarizer {
    /// Create a summarizer.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub fn new(config: SummaryConfig) -> ContextResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &SummaryConfig {
        &self.config
    }

    /// Summarize `interactions` within `max_length` tokens, or the configured default.
    #[must_use]
    pub fn summarize(
        &self,
        interactions: &[ContextInteraction],
        max_length: Option<usize>,
    ) -> ConversationSummary {
        if interactions.is_empty() {
            return ConversationSummary::default();
        }

        let budget = max_length.unwrap_or(self.config.max_summary_tokens);
        let key_topics = extract_topics(interactions);

        let verbatim = interactions.len() <= self.config.full_transcript_threshold;
        let (text, interaction_ids): (String, Vec<InteractionId>) = if verbatim {
            debug!(count = interactions.len(), "Rendering full transcript");
            let ids = interactions.iter().map(ContextInteraction::id).collect();
            (render_full(interactions), ids)
        } else {
            let selected = select_within_budget(interactions, budget);
            let ids = selected.iter().map(|interaction| interaction.id()).collect();
            (self.render_extractive(interactions.len(), &selected), ids)
        };

        let token_count = estimate_tokens(&text);
        let original_tokens: usize = interactions
            .iter()
            .map(ContextInteraction::token_count)
            .sum();
        #[allow(clippy::cast_precision_loss)]
        let compression_ratio = token_count as f64 / original_tokens.max(1) as f64;

        ConversationSummary {
            text,
            key_topics,
            token_count,
            original_interaction_count: interactions.len(),
            interaction_ids,
            compression_ratio,
        }
    }

    /// Summarize each calendar bucket separately, using the local time zone.
    #[must_use]
    pub fn summarize_by_period(
        &self,
        interactions: &[ContextInteraction],
        period: SummarizationPeriod,
    ) -> Vec<PeriodSummary> {
        self.summarize_by_period_in(interactions, period, &Local)
    }

    /// Summarize each calendar bucket separately, with boundaries taken in `tz`.
    ///
    /// Buckets are returned in ascending start order; every interaction lands
    /// in exactly one bucket.
    #[must_use]
    pub fn summarize_by_period_in<Tz: TimeZone>(
        &self,
        interactions: &[ContextInteraction],
        period: SummarizationPeriod,
        tz: &Tz,
    ) -> Vec<PeriodSummary> {
        let mut buckets: BTreeMap<DateTime<Utc>, Vec<ContextInteraction>> = BTreeMap::new();
        for interaction in interactions {
            let start = start_of_period(interaction.timestamp(), period, tz);
            buckets.entry(start).or_default().push(interaction.clone());
        }

        debug!(%period, buckets = buckets.len(), "Summarizing by period");

        buckets
            .into_iter()
            .map(|(start_date, members)| PeriodSummary {
                period,
                start_date,
                end_date: end_of_period(start_date, period, tz),
                interaction_ids: members.iter().map(ContextInteraction::id).collect(),
                summary: self.summarize(&members, None),
            })
            .collect()
    }

    fn render_extractive(&self, total: usize, selected: &[&ContextInteraction]) -> String {
        let blocks: Vec<String> = selected
            .iter()
            .enumerate()
            .map(|(idx, interaction)| {
                format!(
                    "[{}] Q: {}\nA: {}\n",
                    idx + 1,
                    compress(interaction.query(), self.config.query_token_budget),
                    compress(interaction.response(), self.config.response_token_budget),
                )
            })
            .collect();

        let mut text = format!("Conversation Summary ({total} interactions):\n\n");
        text.push_str(&blocks.join("\n"));

        let omitted = total - selected.len();
        if omitted > 0 {
            text.push_str(&format!(
                "\n\n[... {omitted} less important interactions omitted ...]"
            ));
        }

        text
    }
}

/// Greedily pack the highest scoring interactions into `budget` tokens.
///
/// Equal scores keep input order; the result is re-sorted chronologically.
fn select_within_budget(
    interactions: &[ContextInteraction],
    budget: usize,
) -> Vec<&ContextInteraction> {
    let mut ranked: Vec<(f64, &ContextInteraction)> = interactions
        .iter()
        .map(|interaction| (score(interaction, interactions), interaction))
        .collect();
    ranked.sort_by(|a, b| b.0.total_cmp(&a.0));

    let mut used = 0usize;
    let mut selected: Vec<&ContextInteraction> = Vec::new();
    for (_, interaction) in ranked {
        let next = used.saturating_add(interaction.token_count());
        if next <= budget {
            used = next;
            selected.push(interaction);
        }
    }
    selected.sort_by_key(|interaction| interaction.timestamp());

    debug!(
        total = interactions.len(),
        selected = selected.len(),
        budget,
        used,
        "Selected interactions for extractive summary"
    );

    selected
}

fn render_full(interactions: &[ContextInteraction]) -> String {
    interactions
        .iter()
        .enumerate()
        .map(|(idx, interaction)| {
            format!(
                "[{}] Q: {}\nA: {}\n",
                idx + 1,
                interaction.query(),
                interaction.response()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
