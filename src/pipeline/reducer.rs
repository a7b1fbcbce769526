//! Reduce phase: collapse each group into a single total

use super::cancellation::CancellationHandle;
use super::pool::{WorkFn, WorkItem, WorkerPool};
use super::types::{FrequencyMap, GroupedEntry, GroupedTable, Token};
use crate::error::{Phase, Result};
use std::sync::Arc;
use tracing::info;

/// Per-group reduce function
pub trait Reducer: Send + Sync + 'static {
    fn reduce(&self, token: &str, counts: &[u64]) -> anyhow::Result<u64>;
}

/// Sums the counts of a group; an empty group sums to 0
#[derive(Debug, Clone, Copy, Default)]
pub struct SumReducer;

impl Reducer for SumReducer {
    fn reduce(&self, _token: &str, counts: &[u64]) -> anyhow::Result<u64> {
        counts.iter().try_fold(0u64, |total, count| {
            total
                .checked_add(*count)
                .ok_or_else(|| anyhow::anyhow!("count overflow after {total}"))
        })
    }
}

impl WorkItem for GroupedEntry {
    fn label(&self) -> &str {
        &self.token
    }
}

/// Reduce every group across the pool
pub async fn reduce_phase(
    table: GroupedTable,
    reducer: Arc<dyn Reducer>,
    pool: &WorkerPool,
    cancel: &CancellationHandle,
) -> Result<FrequencyMap> {
    info!(
        "Reduce phase: {} groups across {} workers",
        table.len(),
        pool.size()
    );

    let work: WorkFn<GroupedEntry, (Token, u64)> = Arc::new(move |entry: &GroupedEntry| {
        let total = reducer.reduce(&entry.token, &entry.counts)?;
        Ok((entry.token.clone(), total))
    });
    let totals = pool.run(Phase::Reduce, table.into_entries(), work, cancel).await?;

    Ok(totals.into_iter().collect())
}
