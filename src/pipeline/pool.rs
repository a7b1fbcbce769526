//! Bounded worker pool for the map and reduce phases
//!
//! Items are split into batches; at most `size` batches run at once, each on
//! the blocking thread pool. The first failing or panicking item aborts the
//! whole phase and every in-flight batch is drained before the phase returns,
//! so no task outlives the call.

use super::cancellation::CancellationHandle;
use crate::error::{Phase, PipelineError, Result};
use futures::stream::{FuturesUnordered, StreamExt};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

/// Default number of items handled by a single pool task
pub const DEFAULT_BATCH_SIZE: usize = 1024;

/// Something a pool task can process and name in error reports
pub trait WorkItem: Send + 'static {
    /// Human-readable key identifying the item
    fn label(&self) -> &str;
}

impl WorkItem for String {
    fn label(&self) -> &str {
        self
    }
}

/// Per-item work function run on the pool
pub type WorkFn<I, O> = Arc<dyn Fn(&I) -> anyhow::Result<O> + Send + Sync>;

type BatchOutcome<O> = (usize, Result<Vec<O>>);

/// Fixed-size pool owned by a single pipeline run
#[derive(Debug, Clone)]
pub struct WorkerPool {
    size: usize,
    batch_size: usize,
}

impl WorkerPool {
    pub fn new(size: usize, batch_size: usize) -> Result<Self> {
        if size == 0 {
            return Err(PipelineError::invalid_config(
                "workers",
                "worker pool needs at least one worker",
            ));
        }
        if batch_size == 0 {
            return Err(PipelineError::invalid_config(
                "batch_size",
                "batch size must be at least 1",
            ));
        }
        Ok(Self { size, batch_size })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of pool tasks needed for `items` items
    pub fn unit_count(&self, items: usize) -> usize {
        items.div_ceil(self.batch_size)
    }

    /// Run `work` over every item and return the outputs in item order
    ///
    /// Fails fast: the first item error (or cancellation) stops scheduling,
    /// signals running batches to stop, waits for them, and reports that error.
    pub async fn run<I, O>(
        &self,
        phase: Phase,
        items: Vec<I>,
        work: WorkFn<I, O>,
        cancel: &CancellationHandle,
    ) -> Result<Vec<O>>
    where
        I: WorkItem,
        O: Send + 'static,
    {
        let total_items = items.len();
        let batches = split_batches(items, self.batch_size);
        let batch_count = batches.len();
        debug!(
            "Running {} phase: {} items in {} batches (workers: {})",
            phase, total_items, batch_count, self.size
        );

        // Tasks stop early once this is set
        let stop = CancellationHandle::new();
        let semaphore = Arc::new(Semaphore::new(self.size));
        let mut pending = batches.into_iter().enumerate().peekable();
        let mut in_flight: FuturesUnordered<JoinHandle<BatchOutcome<O>>> = FuturesUnordered::new();
        let mut completed: Vec<Option<Vec<O>>> = (0..batch_count).map(|_| None).collect();
        let mut failure: Option<PipelineError> = None;

        while pending.peek().is_some() || !in_flight.is_empty() {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    warn!("{} phase cancelled with {} batches in flight", phase, in_flight.len());
                    failure = Some(PipelineError::Cancelled);
                    break;
                }
                Some(joined) = in_flight.next(), if !in_flight.is_empty() => {
                    match joined {
                        Ok((batch_index, Ok(outputs))) => {
                            trace!("{} batch {} finished", phase, batch_index);
                            completed[batch_index] = Some(outputs);
                        }
                        Ok((_, Err(e))) => {
                            failure = Some(e);
                            break;
                        }
                        Err(join_error) => {
                            failure = Some(PipelineError::WorkerPanicked {
                                phase,
                                reason: join_error.to_string(),
                            });
                            break;
                        }
                    }
                }
                permit = semaphore.clone().acquire_owned(), if pending.peek().is_some() => {
                    let permit = match permit {
                        Ok(permit) => permit,
                        Err(e) => {
                            failure = Some(PipelineError::WorkerPanicked {
                                phase,
                                reason: e.to_string(),
                            });
                            break;
                        }
                    };
                    if let Some((batch_index, (offset, batch))) = pending.next() {
                        let work = Arc::clone(&work);
                        let stop = stop.clone();
                        let outer = cancel.clone();
                        in_flight.push(tokio::task::spawn_blocking(move || {
                            let outcome = process_batch(phase, offset, &batch, &work, &stop, &outer);
                            drop(permit);
                            (batch_index, outcome)
                        }));
                    }
                }
            }
        }

        if let Some(error) = failure {
            stop.cancel();
            drain(&mut in_flight).await;
            debug!("{} phase aborted: {}", phase, error);
            return Err(error);
        }

        Ok(completed.into_iter().flatten().flatten().collect())
    }
}

/// Host parallelism, falling back to a single worker
pub fn default_worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Split items into `(offset, batch)` chunks of at most `batch_size`
fn split_batches<I>(items: Vec<I>, batch_size: usize) -> Vec<(usize, Vec<I>)> {
    let mut batches = Vec::with_capacity(items.len().div_ceil(batch_size));
    let mut offset = 0;
    let mut current = Vec::with_capacity(batch_size.min(items.len()));

    for item in items {
        current.push(item);
        if current.len() == batch_size {
            let len = current.len();
            batches.push((offset, std::mem::take(&mut current)));
            offset += len;
        }
    }

    if !current.is_empty() {
        batches.push((offset, current));
    }

    batches
}

fn process_batch<I, O>(
    phase: Phase,
    offset: usize,
    batch: &[I],
    work: &WorkFn<I, O>,
    stop: &CancellationHandle,
    outer: &CancellationHandle,
) -> Result<Vec<O>>
where
    I: WorkItem,
{
    let mut outputs = Vec::with_capacity(batch.len());
    for (position, item) in batch.iter().enumerate() {
        if stop.is_cancelled() || outer.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }
        let output = match panic::catch_unwind(AssertUnwindSafe(|| work(item))) {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(PipelineError::worker(
                    phase,
                    offset + position,
                    item.label(),
                    format!("{e:#}"),
                ))
            }
            Err(payload) => {
                return Err(PipelineError::worker(
                    phase,
                    offset + position,
                    item.label(),
                    format!("panicked: {}", panic_message(payload.as_ref())),
                ))
            }
        };
        outputs.push(output);
    }
    Ok(outputs)
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic payload"
    }
}

async fn drain<O>(in_flight: &mut FuturesUnordered<JoinHandle<BatchOutcome<O>>>) {
    while let Some(joined) = in_flight.next().await {
        if let Err(e) = joined {
            trace!("Batch task ended abnormally during shutdown: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn words(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("w{i}")).collect()
    }

    #[test]
    fn test_new_rejects_zero_sizes() {
        assert!(matches!(
            WorkerPool::new(0, 10),
            Err(PipelineError::InvalidConfiguration { .. })
        ));
        assert!(matches!(
            WorkerPool::new(2, 0),
            Err(PipelineError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_split_batches() {
        let batches = split_batches((0..5).collect::<Vec<_>>(), 2);
        assert_eq!(
            batches,
            vec![(0, vec![0, 1]), (2, vec![2, 3]), (4, vec![4])]
        );
        assert!(split_batches(Vec::<u8>::new(), 3).is_empty());
        assert_eq!(split_batches(vec![1, 2, 3], 10), vec![(0, vec![1, 2, 3])]);
    }

    #[test]
    fn test_unit_count() {
        let pool = WorkerPool::new(4, 3).unwrap();
        assert_eq!(pool.unit_count(0), 0);
        assert_eq!(pool.unit_count(3), 1);
        assert_eq!(pool.unit_count(7), 3);
    }

    #[tokio::test]
    async fn test_outputs_keep_item_order() {
        let pool = WorkerPool::new(3, 2).unwrap();
        let work: WorkFn<String, String> = Arc::new(|s: &String| Ok(s.to_uppercase()));
        let out = pool
            .run(Phase::Map, words(9), work, &CancellationHandle::new())
            .await
            .unwrap();
        let expected: Vec<String> = words(9).iter().map(|w| w.to_uppercase()).collect();
        assert_eq!(out, expected);
    }

    #[tokio::test]
    async fn test_empty_input() {
        let pool = WorkerPool::new(2, 4).unwrap();
        let work: WorkFn<String, usize> = Arc::new(|s: &String| Ok(s.len()));
        let out = pool
            .run(Phase::Reduce, Vec::new(), work, &CancellationHandle::new())
            .await
            .unwrap();
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_failure_reports_index_and_key() {
        let pool = WorkerPool::new(2, 3).unwrap();
        let work: WorkFn<String, ()> = Arc::new(|s: &String| {
            if s == "w7" {
                anyhow::bail!("bad word");
            }
            Ok(())
        });
        let err = pool
            .run(Phase::Map, words(10), work, &CancellationHandle::new())
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
                assert_eq!(index, 7);
                assert_eq!(key, "w7");
                assert!(reason.contains("bad word"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_panicking_item_is_reported_like_a_failure() {
        let pool = WorkerPool::new(2, 2).unwrap();
        let work: WorkFn<String, ()> = Arc::new(|s: &String| {
            if s == "w5" {
                panic!("cannot handle {s}");
            }
            Ok(())
        });
        let err = pool
            .run(Phase::Reduce, words(8), work, &CancellationHandle::new())
            .await
            .unwrap_err();
        match err {
            PipelineError::WorkerFailure {
                phase,
                index,
                key,
                reason,
            } => {
                assert_eq!(phase, Phase::Reduce);
                assert_eq!(index, 5);
                assert_eq!(key, "w5");
                assert!(reason.contains("cannot handle w5"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let pool = WorkerPool::new(2, 1).unwrap();
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let (r, p) = (Arc::clone(&running), Arc::clone(&peak));
        let work: WorkFn<String, ()> = Arc::new(move |_s: &String| {
            let now = r.fetch_add(1, Ordering::SeqCst) + 1;
            p.fetch_max(now, Ordering::SeqCst);
            std::thread::sleep(std::time::Duration::from_millis(5));
            r.fetch_sub(1, Ordering::SeqCst);
            Ok(())
        });
        pool.run(Phase::Map, words(12), work, &CancellationHandle::new())
            .await
            .unwrap();
        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_pre_cancelled_run_returns_cancelled() {
        let pool = WorkerPool::new(2, 1).unwrap();
        let cancel = CancellationHandle::new();
        cancel.cancel();
        let work: WorkFn<String, ()> = Arc::new(|_s: &String| Ok(()));
        let err = pool
            .run(Phase::Reduce, words(4), work, &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Cancelled));
    }

    #[tokio::test]
    async fn test_cancel_mid_phase_stops_all_batches() {
        let pool = WorkerPool::new(2, 1).unwrap();
        let cancel = CancellationHandle::new();
        let processed = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&processed);
        let trigger = cancel.clone();
        let work: WorkFn<String, ()> = Arc::new(move |_s: &String| {
            if counter.fetch_add(1, Ordering::SeqCst) == 3 {
                trigger.cancel();
            }
            std::thread::sleep(std::time::Duration::from_millis(2));
            Ok(())
        });
        let err = pool
            .run(Phase::Map, words(200), work, &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Cancelled));
        assert!(processed.load(Ordering::SeqCst) < 200);
    }
}
