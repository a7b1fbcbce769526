//! Map phase: one `(token, 1)` pair per token occurrence

use super::cancellation::CancellationHandle;
use super::pool::{WorkFn, WorkerPool};
use super::types::{CountPair, Token};
use crate::error::{Phase, Result};
use std::sync::Arc;
use tracing::info;

/// Per-token map function
///
/// Implementations must be pure: the same token always yields the same pair
/// and no state is shared between calls.
pub trait Mapper: Send + Sync + 'static {
    fn map(&self, token: &str) -> anyhow::Result<CountPair>;
}

/// Emits `(token, 1)` for every token
#[derive(Debug, Clone, Copy, Default)]
pub struct WordCountMapper;

impl Mapper for WordCountMapper {
    fn map(&self, token: &str) -> anyhow::Result<CountPair> {
        if token.is_empty() {
            anyhow::bail!("empty token");
        }
        Ok(CountPair::unit(token))
    }
}

/// Map every token across the pool; the result keeps token order
pub async fn map_phase(
    tokens: Vec<Token>,
    mapper: Arc<dyn Mapper>,
    pool: &WorkerPool,
    cancel: &CancellationHandle,
) -> Result<Vec<CountPair>> {
    let token_count = tokens.len();
    info!(
        "Map phase: {} tokens across {} workers",
        token_count,
        pool.size()
    );

    let work: WorkFn<Token, CountPair> = Arc::new(move |token: &Token| mapper.map(token));
    let pairs = pool.run(Phase::Map, tokens, work, cancel).await?;

    debug_assert_eq!(pairs.len(), token_count);
    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;

    fn tokens(words: &[&str]) -> Vec<Token> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_word_count_mapper() {
        let pair = WordCountMapper.map("cat").unwrap();
        assert_eq!(pair, CountPair::unit("cat"));
        assert!(WordCountMapper.map("").is_err());
    }

    #[tokio::test]
    async fn test_one_pair_per_token() {
        let pool = WorkerPool::new(4, 2).unwrap();
        let input = tokens(&["the", "cat", "sat", "the", "dog", "sat"]);
        let pairs = map_phase(
            input.clone(),
            Arc::new(WordCountMapper),
            &pool,
            &CancellationHandle::new(),
        )
        .await
        .unwrap();

        assert_eq!(pairs.len(), input.len());
        assert!(pairs.iter().all(|p| p.count == 1));
        let mapped: Vec<_> = pairs.into_iter().map(|p| p.token).collect();
        assert_eq!(mapped, input);
    }

    #[tokio::test]
    async fn test_failure_names_token_and_index() {
        struct RejectDog;
        impl Mapper for RejectDog {
            fn map(&self, token: &str) -> anyhow::Result<CountPair> {
                if token == "dog" {
                    anyhow::bail!("dogs are not allowed");
                }
                Ok(CountPair::unit(token))
            }
        }

        let pool = WorkerPool::new(2, 1).unwrap();
        let err = map_phase(
            tokens(&["the", "cat", "sat", "the", "dog", "sat"]),
            Arc::new(RejectDog),
            &pool,
            &CancellationHandle::new(),
        )
        .await
        .unwrap_err();

        match err {
            PipelineError::WorkerFailure {
                phase, index, key, ..
            } => {
                assert_eq!(phase, Phase::Map);
                assert_eq!(index, 4);
                assert_eq!(key, "dog");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_panicking_mapper_names_token_and_index() {
        struct PanicOnDog;
        impl Mapper for PanicOnDog {
            fn map(&self, token: &str) -> anyhow::Result<CountPair> {
                if token == "dog" {
                    panic!("bad dog");
                }
                Ok(CountPair::unit(token))
            }
        }

        let pool = WorkerPool::new(2, 1).unwrap();
        let err = map_phase(
            tokens(&["the", "cat", "sat", "the", "dog", "sat"]),
            Arc::new(PanicOnDog),
            &pool,
            &CancellationHandle::new(),
        )
        .await
        .unwrap_err();

        match err {
            PipelineError::WorkerFailure {
                phase,
                index,
                key,
                reason,
            } => {
                assert_eq!(phase, Phase::Map);
                assert_eq!(index, 4);
                assert_eq!(key, "dog");
                assert!(reason.contains("bad dog"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
