//! Serialized summarization engine.

use std::sync::Arc;

use tokio::sync::{Notify, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::memory::core::config::SummaryConfig;
use crate::memory::core::errors::{ContextError, ContextResult};
use crate::memory::core::interaction::ContextInteraction;
use crate::memory::summarization::period::{PeriodSummary, SummarizationPeriod};
use crate::memory::summarization::summarizer::{ConversationSummary, Summarizer};

enum SummaryRequest {
    Summarize {
        interactions: Vec<ContextInteraction>,
        max_length: Option<usize>,
        reply: oneshot::Sender<ConversationSummary>,
    },
    ByPeriod {
        interactions: Vec<ContextInteraction>,
        period: SummarizationPeriod,
        reply: oneshot::Sender<Vec<PeriodSummary>>,
    },
}

/// Cloneable client of a running [`SummarizationEngine`].
#[derive(Clone)]
pub struct SummarizationHandle {
    sender: mpsc::Sender<SummaryRequest>,
}

impl SummarizationHandle {
    /// Summarize `interactions` within `max_length` tokens, or the engine default.
    ///
    /// # Errors
    /// Returns `WorkerUnavailable` if the engine has shut down.
    pub async fn summarize(
        &self,
        interactions: Vec<ContextInteraction>,
        max_length: Option<usize>,
    ) -> ContextResult<ConversationSummary> {
        let (reply, response) = oneshot::channel();
        self.submit(SummaryRequest::Summarize {
            interactions,
            max_length,
            reply,
        })
        .await?;
        response.await.map_err(|_| ContextError::WorkerUnavailable)
    }

    /// Summarize `interactions` per calendar bucket.
    ///
    /// # Errors
    /// Returns `WorkerUnavailable` if the engine has shut down.
    pub async fn summarize_by_period(
        &self,
        interactions: Vec<ContextInteraction>,
        period: SummarizationPeriod,
    ) -> ContextResult<Vec<PeriodSummary>> {
        let (reply, response) = oneshot::channel();
        self.submit(SummaryRequest::ByPeriod {
            interactions,
            period,
            reply,
        })
        .await?;
        response.await.map_err(|_| ContextError::WorkerUnavailable)
    }

    async fn submit(&self, request: SummaryRequest) -> ContextResult<()> {
        self.sender
            .send(request)
            .await
            .map_err(|_| ContextError::WorkerUnavailable)
    }
}

/// Summarization engine backed by a single worker task.
///
/// Requests against one engine are processed one at a time in arrival order.
/// Separate engines own separate workers and do not coordinate.
pub struct SummarizationEngine {
    handle: SummarizationHandle,
    shutdown: Arc<Notify>,
    worker: JoinHandle<()>,
}

impl SummarizationEngine {
    /// Build a summarizer from `config` and spawn its worker.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub fn from_config(config: SummaryConfig) -> ContextResult<Self> {
        Ok(Self::spawn(Summarizer::new(config)?))
    }

    /// Spawn a worker owning `summarizer`.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn spawn(summarizer: Summarizer) -> Self {
        let (sender, receiver) = mpsc::channel(summarizer.config().queue_depth.max(1));
        let shutdown = Arc::new(Notify::new());
        let worker = tokio::spawn(run_worker(summarizer, receiver, Arc::clone(&shutdown)));

        Self {
            handle: SummarizationHandle { sender },
            shutdown,
            worker,
        }
    }

    /// Client handle that can be shared across tasks.
    #[must_use]
    pub fn handle(&self) -> SummarizationHandle {
        self.handle.clone()
    }

    /// Summarize `interactions` within `max_length` tokens, or the engine default.
    ///
    /// # Errors
    /// Returns `WorkerUnavailable` if the engine has shut down.
    pub async fn summarize(
        &self,
        interactions: Vec<ContextInteraction>,
        max_length: Option<usize>,
    ) -> ContextResult<ConversationSummary> {
        self.handle.summarize(interactions, max_length).await
    }

    /// Summarize `interactions` per calendar bucket.
    ///
    /// # Errors
    /// Returns `WorkerUnavailable` if the engine has shut down.
    pub async fn summarize_by_period(
        &self,
        interactions: Vec<ContextInteraction>,
        period: SummarizationPeriod,
    ) -> ContextResult<Vec<PeriodSummary>> {
        self.handle.summarize_by_period(interactions, period).await
    }

    /// Stop accepting requests, finish the queued ones and wait for the worker.
    ///
    /// # Errors
    /// Returns `WorkerUnavailable` if the worker task panicked or was aborted.
    pub async fn shutdown(self) -> ContextResult<()> {
        self.shutdown.notify_one();
        self.worker.await.map_err(|err| {
            warn!(?err, "Summarization worker did not exit cleanly");
            ContextError::WorkerUnavailable
        })
    }
}

async fn run_worker(
    summarizer: Summarizer,
    mut receiver: mpsc::Receiver<SummaryRequest>,
    shutdown: Arc<Notify>,
) {
    info!(
        queue_depth = summarizer.config().queue_depth,
        "Starting summarization worker"
    );

    loop {
        tokio::select! {
            request = receiver.recv() => match request {
                Some(request) => process(&summarizer, request),
                None => break,
            },
            () = shutdown.notified() => {
                receiver.close();
                while let Some(request) = receiver.recv().await {
                    process(&summarizer, request);
                }
                break;
            }
        }
    }

    info!("Summarization worker shutting down");
}

fn process(summarizer: &Summarizer, request: SummaryRequest) {
    match request {
        SummaryRequest::Summarize {
            interactions,
            max_length,
            reply,
        } => {
            let summary = summarizer.summarize(&interactions, max_length);
            if reply.send(summary).is_err() {
                debug!("Summary requester went away before the reply");
            }
        }
        SummaryRequest::ByPeriod {
            interactions,
            period,
            reply,
        } => {
            let summaries = summarizer.summarize_by_period(&interactions, period);
            if reply.send(summaries).is_err() {
                debug!("Period summary requester went away before the reply");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn history(count: i64) -> Vec<ContextInteraction> {
        let start = Utc::now() - Duration::hours(1);
        (0..count)
            .map(|i| {
                ContextInteraction::at(
                    format!("question {i}"),
                    format!("answer {i}"),
                    start + Duration::minutes(i),
                    3,
                )
            })
            .collect()
    }

    #[tokio::test]
    async fn test_matches_direct_summarizer() {
        let engine = SummarizationEngine::spawn(Summarizer::default());
        let interactions = history(6);

        let via_engine = engine.summarize(interactions.clone(), Some(9)).await.unwrap();
        let direct = Summarizer::default().summarize(&interactions, Some(9));
        assert_eq!(via_engine, direct);

        engine.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_empty_history_through_engine() {
        let engine = SummarizationEngine::spawn(Summarizer::default());
        let summary = engine.summarize(Vec::new(), None).await.unwrap();
        assert_eq!(summary, ConversationSummary::default());
        engine.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_by_period_through_engine() {
        let engine = SummarizationEngine::spawn(Summarizer::default());
        let interactions = history(5);

        let buckets = engine
            .summarize_by_period(interactions.clone(), SummarizationPeriod::Weekly)
            .await
            .unwrap();
        let total: usize = buckets
            .iter()
            .map(|p| p.summary.original_interaction_count)
            .sum();
        assert_eq!(total, interactions.len());
        engine.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_concurrent_callers_all_served() {
        let engine = SummarizationEngine::spawn(Summarizer::default());
        let mut tasks = Vec::new();
        for n in 1..=8 {
            let handle = engine.handle();
            tasks.push(tokio::spawn(async move {
                handle.summarize(history(n), None).await
            }));
        }

        for (idx, task) in tasks.into_iter().enumerate() {
            let summary = task.await.unwrap().unwrap();
            assert_eq!(summary.original_interaction_count, idx + 1);
        }
        engine.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_calls_fail_after_shutdown() {
        let engine = SummarizationEngine::spawn(Summarizer::default());
        let handle = engine.handle();
        engine.shutdown().await.unwrap();

        let result = handle.summarize(history(2), None).await;
        assert!(matches!(result, Err(ContextError::WorkerUnavailable)));
    }

    #[tokio::test]
    async fn test_from_config_rejects_invalid() {
        let config = SummaryConfig {
            response_token_budget: 0,
            ..SummaryConfig::default()
        };
        assert!(SummarizationEngine::from_config(config).is_err());
    }

    #[tokio::test]
    async fn test_engines_are_independent() {
        let first = SummarizationEngine::spawn(Summarizer::default());
        let second = SummarizationEngine::from_config(SummaryConfig {
            max_summary_tokens: 3,
            ..SummaryConfig::default()
        })
        .unwrap();

        let interactions = history(5);
        let wide = first.summarize(interactions.clone(), None).await.unwrap();
        let narrow = second.summarize(interactions, None).await.unwrap();

        assert!(!wide.text.contains("omitted"));
        assert!(narrow.text.contains("[... 4 less important interactions omitted ...]"));

        first.shutdown().await.unwrap();
        second.shutdown().await.unwrap();
    }
}
