use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::course_stats::accumulator::CourseAccumulator;
use crate::course_stats::schedule::{CancelToken, TokioYield, Yielder};
use crate::course_stats::types::{CourseStatsReport, GradeRecord};
use crate::error::{ReportError, Result};

/// Records processed between two cooperative yield points.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

fn default_max_in_flight() -> usize {
    std::thread::available_parallelism().map_or(4, |n| n.get())
}

/// Computes per-course highest, lowest and average grades over a record list.
///
/// Records are folded in fixed-size chunks and the engine yields to the host
/// scheduler between chunks, so a long scan never monopolises the worker it
/// runs on. Chunking only affects scheduling; the report is the same for any
/// chunk size.
pub struct CourseStatsEngine<Y = TokioYield> {
    chunk_size: usize,
    yielder: Y,
    cancel: Option<CancelToken>,
    max_in_flight: usize,
}

impl CourseStatsEngine<TokioYield> {
    /// Engine with the default chunk size yielding to tokio.
    pub fn new() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            yielder: TokioYield,
            cancel: None,
            max_in_flight: default_max_in_flight(),
        }
    }
}

impl Default for CourseStatsEngine<TokioYield> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Y: Yielder> CourseStatsEngine<Y> {
    /// # Errors
    ///
    /// Returns [`ReportError::InvalidInput`] for a zero chunk size.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(ReportError::InvalidInput(
                "chunk size must be at least 1".to_string(),
            ));
        }
        self.chunk_size = chunk_size;
        Ok(self)
    }

    pub fn with_yielder<Z: Yielder>(self, yielder: Z) -> CourseStatsEngine<Z> {
        CourseStatsEngine {
            chunk_size: self.chunk_size,
            yielder,
            cancel: self.cancel,
            max_in_flight: self.max_in_flight,
        }
    }

    /// Caps the chunks [`compute_partitioned`](Self::compute_partitioned) keeps
    /// queued or unmerged at once. Values below 1 are raised to 1.
    pub fn with_max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = max_in_flight.max(1);
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    fn check_cancelled(&self, chunks_done: usize) -> Result<()> {
        match &self.cancel {
            Some(token) if token.is_cancelled() => Err(ReportError::Cancelled { chunks_done }),
            _ => Ok(()),
        }
    }

    /// Aggregates `records` chunk by chunk, yielding between chunks.
    ///
    /// Either the full report is returned or an error; no partial statistics
    /// escape a failed or cancelled call.
    #[tracing::instrument(skip_all, fields(records = records.len(), chunk_size = self.chunk_size))]
    pub async fn compute(&self, records: &[GradeRecord]) -> Result<CourseStatsReport> {
        let mut acc = CourseAccumulator::new();

        for (index, chunk) in records.chunks(self.chunk_size).enumerate() {
            if index > 0 {
                self.yielder.yield_now().await;
            }
            self.check_cancelled(index)?;

            acc.observe_all(chunk)?;
            debug!(
                chunk = index,
                processed = acc.records_seen(),
                courses = acc.course_count(),
                "Chunk folded"
            );
        }

        info!(
            records = acc.records_seen(),
            courses = acc.course_count(),
            "Course statistics computed"
        );
        Ok(acc.finish())
    }

    /// Map-reduce variant: chunks are folded on the blocking pool and the
    /// partials are merged in chunk order.
    ///
    /// At most `max_in_flight` chunks are queued or unmerged at any time. Each
    /// chunk re-checks the cancel token before folding, and dropping the task
    /// set aborts chunks that have not started, so an error or cancellation
    /// stops further work. Merging in input order keeps the first-seen
    /// tie-break and course order, so the report matches
    /// [`compute`](Self::compute).
    #[tracing::instrument(skip_all, fields(records = records.len(), chunk_size = self.chunk_size))]
    pub async fn compute_partitioned(
        &self,
        records: Arc<[GradeRecord]>,
    ) -> Result<CourseStatsReport> {
        let chunk_size = self.chunk_size;
        let chunk_count = records.len().div_ceil(chunk_size);
        let folded = Arc::new(AtomicUsize::new(0));

        let mut tasks = JoinSet::new();
        let mut pending: BTreeMap<usize, CourseAccumulator> = BTreeMap::new();
        let mut next_spawn = 0;
        let mut next_merge = 0;
        let mut acc = CourseAccumulator::new();

        while next_merge < chunk_count {
            self.check_cancelled(folded.load(Ordering::Acquire))?;

            while next_spawn < chunk_count && next_spawn - next_merge < self.max_in_flight {
                let index = next_spawn;
                let records = Arc::clone(&records);
                let cancel = self.cancel.clone();
                let folded = Arc::clone(&folded);
                tasks.spawn_blocking(move || {
                    if cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
                        return (index, Ok(None));
                    }
                    let start = index * chunk_size;
                    let end = (start + chunk_size).min(records.len());
                    let mut partial = CourseAccumulator::new();
                    let result = partial.observe_all(&records[start..end]).map(|_| Some(partial));
                    folded.fetch_add(1, Ordering::AcqRel);
                    (index, result)
                });
                next_spawn += 1;
            }

            let Some(joined) = tasks.join_next().await else {
                break;
            };
            let (index, result) = joined.map_err(|e| ReportError::TaskFailed(e.to_string()))?;
            match result? {
                Some(partial) => {
                    pending.insert(index, partial);
                }
                None => {
                    return Err(ReportError::Cancelled {
                        chunks_done: folded.load(Ordering::Acquire),
                    });
                }
            }

            while let Some(partial) = pending.remove(&next_merge) {
                acc.merge(partial);
                next_merge += 1;
            }
            debug!(merged = next_merge, in_flight = tasks.len(), "Partitions merged");
            self.yielder.yield_now().await;
        }

        info!(
            records = acc.records_seen(),
            courses = acc.course_count(),
            chunks = chunk_count,
            "Course statistics computed from partitions"
        );
        Ok(acc.finish())
    }
}
