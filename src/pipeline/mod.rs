//! Word-frequency pipeline
//!
//! Text flows through five stages:
//!
//! 1. [`normalizer`]: strip punctuation, lower-case, split into tokens
//! 2. [`mapper`]: `(token, 1)` per token, in parallel on the worker pool
//! 3. [`shuffler`]: group pairs by token once every map batch has finished
//! 4. [`reducer`]: sum each group, in parallel on the worker pool
//! 5. [`ranker`]: order by count and keep the top N
//!
//! The shuffle is the only synchronization point. A run either returns a
//! complete result or a single [`PipelineError`]; partial results are dropped.

pub mod cancellation;
pub mod mapper;
pub mod normalizer;
pub mod pool;
pub mod ranker;
pub mod reducer;
pub mod shuffler;
pub mod types;

pub use cancellation::CancellationHandle;
pub use mapper::{Mapper, WordCountMapper};
pub use normalizer::{normalize, PunctuationSet, TokenStream};
pub use pool::WorkerPool;
pub use ranker::rank;
pub use reducer::{Reducer, SumReducer};
pub use shuffler::shuffle;
pub use types::{CountPair, FrequencyMap, GroupedEntry, GroupedTable, RankedEntry, Token};

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Timing and volume figures for a finished run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PipelineStats {
    pub tokens: usize,
    pub distinct_tokens: usize,
    pub workers: usize,
    pub map_units: usize,
    pub reduce_units: usize,
    #[serde(with = "humantime_serde")]
    pub map_duration: Duration,
    #[serde(with = "humantime_serde")]
    pub shuffle_duration: Duration,
    #[serde(with = "humantime_serde")]
    pub reduce_duration: Duration,
}

/// Everything a successful run produces
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub ranked: Vec<RankedEntry>,
    pub frequencies: FrequencyMap,
    pub stats: PipelineStats,
}

/// A configured map/shuffle/reduce pipeline
///
/// The pipeline holds no per-run state; every call to [`run`](Self::run)
/// builds its own intermediate structures.
pub struct FrequencyPipeline {
    pool: WorkerPool,
    punctuation: PunctuationSet,
    timeout: Option<Duration>,
    mapper: Arc<dyn Mapper>,
    reducer: Arc<dyn Reducer>,
}

impl FrequencyPipeline {
    pub fn new(config: &PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            pool: config.worker_pool()?,
            punctuation: config.punctuation_set(),
            timeout: config.timeout,
            mapper: Arc::new(WordCountMapper),
            reducer: Arc::new(SumReducer),
        })
    }

    pub fn with_mapper(mut self, mapper: impl Mapper) -> Self {
        self.mapper = Arc::new(mapper);
        self
    }

    pub fn with_reducer(mut self, reducer: impl Reducer) -> Self {
        self.reducer = Arc::new(reducer);
        self
    }

    /// Run over `text` and keep the `top_n` most frequent tokens
    pub async fn run(&self, text: &str, top_n: usize) -> Result<PipelineOutput> {
        self.run_with_cancellation(text, top_n, &CancellationHandle::new())
            .await
    }

    /// Like [`run`](Self::run), stopping early when `cancel` fires or the
    /// configured timeout elapses
    pub async fn run_with_cancellation(
        &self,
        text: &str,
        top_n: usize,
        cancel: &CancellationHandle,
    ) -> Result<PipelineOutput> {
        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }

        // The caller's handle is never cancelled by the timeout
        let run_cancel = CancellationHandle::new();
        let execution = self.execute(text, top_n, &run_cancel);
        tokio::pin!(execution);

        let deadline = tokio::time::sleep(self.timeout.unwrap_or(Duration::MAX));
        tokio::pin!(deadline);

        let mut stop_reason: Option<PipelineError> = None;
        let outcome = loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled(), if stop_reason.is_none() => {
                    warn!("Cancellation requested; stopping pipeline");
                    stop_reason = Some(PipelineError::Cancelled);
                    run_cancel.cancel();
                }
                _ = &mut deadline, if stop_reason.is_none() && self.timeout.is_some() => {
                    let timeout = self.timeout.unwrap_or_default();
                    warn!("Pipeline exceeded timeout of {:?}; stopping", timeout);
                    stop_reason = Some(PipelineError::TimedOut { timeout });
                    run_cancel.cancel();
                }
                result = &mut execution => break result,
            }
        };

        match (outcome, stop_reason) {
            // Partial or complete, results of a stopped run are discarded
            (_, Some(reason)) => Err(reason),
            (outcome, None) => outcome,
        }
    }

    async fn execute(
        &self,
        text: &str,
        top_n: usize,
        cancel: &CancellationHandle,
    ) -> Result<PipelineOutput> {
        let tokens = normalize(text, &self.punctuation).to_tokens();
        let token_count = tokens.len();
        info!(
            "Starting pipeline: {} tokens, top {}, {} workers",
            token_count,
            top_n,
            self.pool.size()
        );

        let started = Instant::now();
        let map_units = self.pool.unit_count(token_count);
        let pairs = mapper::map_phase(tokens, Arc::clone(&self.mapper), &self.pool, cancel).await?;
        let map_duration = started.elapsed();

        let started = Instant::now();
        let grouped = shuffle(pairs);
        let shuffle_duration = started.elapsed();
        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }

        let started = Instant::now();
        let distinct_tokens = grouped.len();
        let reduce_units = self.pool.unit_count(distinct_tokens);
        let frequencies =
            reducer::reduce_phase(grouped, Arc::clone(&self.reducer), &self.pool, cancel).await?;
        let reduce_duration = started.elapsed();

        let ranked = rank(&frequencies, top_n);
        debug!(
            "Pipeline finished: {} distinct tokens, {} ranked",
            distinct_tokens,
            ranked.len()
        );

        Ok(PipelineOutput {
            ranked,
            frequencies,
            stats: PipelineStats {
                tokens: token_count,
                distinct_tokens,
                workers: self.pool.size(),
                map_units,
                reduce_units,
                map_duration,
                shuffle_duration,
                reduce_duration,
            },
        })
    }
}

/// Compute the `top_n` most frequent words of `text` with default settings
///
/// ```no_run
/// # async fn demo() -> wordfreq::error::Result<()> {
/// let ranked = wordfreq::compute_frequencies("a a a b b c", 2).await?;
/// assert_eq!(ranked[0].token, "a");
/// # Ok(())
/// # }
/// ```
pub async fn compute_frequencies(text: &str, top_n: usize) -> Result<Vec<RankedEntry>> {
    let pipeline = FrequencyPipeline::new(&PipelineConfig::default())?;
    Ok(pipeline.run(text, top_n).await?.ranked)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> PipelineConfig {
        PipelineConfig {
            workers: 3,
            batch_size: 2,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_scenario_sentence() {
        let pipeline = FrequencyPipeline::new(&small_config()).unwrap();
        let output = pipeline.run("The cat sat. The dog sat!", 2).await.unwrap();

        assert_eq!(
            output.ranked,
            vec![RankedEntry::new("sat", 2), RankedEntry::new("the", 2)]
        );
        assert_eq!(output.frequencies.len(), 4);
        assert_eq!(output.frequencies.get("cat"), Some(1));
        assert_eq!(output.frequencies.get("dog"), Some(1));
        assert_eq!(output.stats.tokens, 6);
        assert_eq!(output.stats.distinct_tokens, 4);
        assert_eq!(output.stats.map_units, 3);
        assert_eq!(output.stats.reduce_units, 2);
    }

    #[tokio::test]
    async fn test_scenario_empty_text() {
        let pipeline = FrequencyPipeline::new(&small_config()).unwrap();
        let output = pipeline.run("", 5).await.unwrap();
        assert!(output.frequencies.is_empty());
        assert!(output.ranked.is_empty());
    }

    #[tokio::test]
    async fn test_scenario_zero_requested() {
        let pipeline = FrequencyPipeline::new(&small_config()).unwrap();
        let output = pipeline.run("a b c a", 0).await.unwrap();
        assert!(output.ranked.is_empty());
        assert_eq!(output.frequencies.total(), 4);
    }

    #[tokio::test]
    async fn test_compute_frequencies() {
        let ranked = compute_frequencies("a a a b b c", 2).await.unwrap();
        assert_eq!(
            ranked,
            vec![RankedEntry::new("a", 3), RankedEntry::new("b", 2)]
        );
    }

    #[tokio::test]
    async fn test_invalid_config_rejected() {
        let config = PipelineConfig {
            workers: 0,
            ..Default::default()
        };
        assert!(matches!(
            FrequencyPipeline::new(&config),
            Err(PipelineError::InvalidConfiguration { .. })
        ));
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let pipeline = FrequencyPipeline::new(&small_config()).unwrap();
        let cancel = CancellationHandle::new();
        cancel.cancel();
        let err = pipeline
            .run_with_cancellation("one two three", 3, &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Cancelled));
    }

    #[tokio::test]
    async fn test_cancelled_run_without_tokens_never_succeeds() {
        let pipeline = FrequencyPipeline::new(&small_config()).unwrap();
        let cancel = CancellationHandle::new();
        cancel.cancel();

        for text in ["", "... !!!"] {
            for _ in 0..200 {
                let result = pipeline.run_with_cancellation(text, 3, &cancel).await;
                assert!(matches!(result, Err(PipelineError::Cancelled)));
            }
        }
    }

    #[tokio::test]
    async fn test_timeout_aborts_run() {
        struct Slow;
        impl Mapper for Slow {
            fn map(&self, token: &str) -> anyhow::Result<CountPair> {
                std::thread::sleep(Duration::from_millis(20));
                Ok(CountPair::unit(token))
            }
        }

        let config = PipelineConfig {
            workers: 1,
            batch_size: 1,
            timeout: Some(Duration::from_millis(50)),
            ..Default::default()
        };
        let pipeline = FrequencyPipeline::new(&config).unwrap().with_mapper(Slow);
        let text = "word ".repeat(200);
        let err = pipeline.run(&text, 3).await.unwrap_err();
        assert!(matches!(err, PipelineError::TimedOut { .. }));
    }
}
