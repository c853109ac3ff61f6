//! Bounded fan-out of detail fetches over a record set.

use crate::detail::DetailFetcher;
use crate::telemetry::{AggregationTimer, PipelineTelemetry};
use config::PipelineConfig;
use errors::{AggregateError, DetailFetchError};
use parking_lot::Mutex;
use recap_core::{AggregationResult, CoarseRecord, EnrichedRecord, RecordSource};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub const DEFAULT_CONCURRENCY_LIMIT: usize = 10;

type Outcome = Result<EnrichedRecord, DetailFetchError>;
type WorkQueue = Arc<Mutex<VecDeque<CoarseRecord>>>;

pub struct Aggregator {
    fetcher: DetailFetcher,
    concurrency_limit: usize,
    deadline: Option<Duration>
}

impl Aggregator {
    pub fn new(source: Arc<dyn RecordSource>) -> Self {
        Self {
            fetcher: DetailFetcher::new(source),
            concurrency_limit: DEFAULT_CONCURRENCY_LIMIT,
            deadline: None
        }
    }

    pub fn from_config(source: Arc<dyn RecordSource>, config: &PipelineConfig) -> Self {
        Self::new(source)
            .with_concurrency_limit(config.concurrency_limit)
            .with_deadline(config.deadline_seconds.map(Duration::from_secs))
    }

    #[must_use]
    pub fn with_concurrency_limit(mut self, limit: usize) -> Self {
        self.concurrency_limit = limit;
        self
    }

    #[must_use]
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn concurrency_limit(&self) -> usize {
        self.concurrency_limit
    }

    /// Runs every record to a terminal state. Individual failures only show
    /// up as `attempted - succeeded`; `enriched` is in completion order.
    ///
    /// Honors the configured deadline, if any.
    pub async fn aggregate(
        &self,
        records: Vec<CoarseRecord>
    ) -> Result<AggregationResult, AggregateError> {
        match self.deadline {
            Some(deadline) => self.aggregate_with_deadline(records, deadline).await,
            None => {
                self.aggregate_with_cancellation(records, CancellationToken::new())
                    .await
            }
        }
    }

    /// Stops handing out records once `deadline` elapses. Records still in
    /// flight are abandoned and count as failed.
    pub async fn aggregate_with_deadline(
        &self,
        records: Vec<CoarseRecord>,
        deadline: Duration
    ) -> Result<AggregationResult, AggregateError> {
        let cancel = CancellationToken::new();
        let timer = tokio::spawn({
            let cancel = cancel.clone();
            async move {
                tokio::time::sleep(deadline).await;
                cancel.cancel();
            }
        });

        let result = self.aggregate_with_cancellation(records, cancel).await;
        timer.abort();
        result
    }

    pub async fn aggregate_with_cancellation(
        &self,
        records: Vec<CoarseRecord>,
        cancel: CancellationToken
    ) -> Result<AggregationResult, AggregateError> {
        let records = distinct_by_id(records);
        let attempted = records.len();
        if attempted == 0 {
            return Ok(AggregationResult::empty());
        }
        if self.concurrency_limit == 0 {
            return Err(AggregateError::WorkerPool {
                reason: "concurrency limit must be at least 1".to_string()
            });
        }

        let workers = self.concurrency_limit.min(attempted);
        info!(attempted, workers, "Starting detail aggregation");
        PipelineTelemetry::record_attempted(attempted);
        let timer = AggregationTimer::start();

        let queue: WorkQueue = Arc::new(Mutex::new(VecDeque::from(records)));
        let (tx, mut rx) = mpsc::channel::<Outcome>(attempted);
        let mut pool = JoinSet::new();

        for _ in 0..workers {
            let fetcher = self.fetcher.clone();
            let queue = queue.clone();
            let tx = tx.clone();
            let cancel = cancel.clone();
            pool.spawn(async move { run_worker(fetcher, queue, tx, cancel).await });
        }
        drop(tx);

        let mut enriched = Vec::with_capacity(attempted);
        let mut failed = 0usize;
        while let Some(outcome) = rx.recv().await {
            match outcome {
                Ok(record) => enriched.push(record),
                Err(err) => {
                    failed += 1;
                    PipelineTelemetry::record_failed(&err.part.to_string());
                    debug!(
                        record_id = %err.record_id,
                        part = %err.part,
                        error = %err.source,
                        "Dropping record after failed detail fetch"
                    );
                }
            }
        }

        while let Some(joined) = pool.join_next().await {
            if let Err(e) = joined {
                warn!(error = %e, "Aggregation worker terminated abnormally");
            }
        }

        let succeeded = enriched.len();
        let unfinished = attempted - succeeded - failed;
        if unfinished > 0 {
            warn!(unfinished, "Aggregation stopped before every record finished");
        }
        timer.finish(succeeded);
        info!(attempted, succeeded, failed, "Detail aggregation finished");

        Ok(AggregationResult {
            enriched,
            attempted,
            succeeded
        })
    }
}

/// Keeps the first record for each id, preserving input order.
fn distinct_by_id(records: Vec<CoarseRecord>) -> Vec<CoarseRecord> {
    let total = records.len();
    let mut seen = HashSet::with_capacity(total);
    let distinct: Vec<CoarseRecord> = records
        .into_iter()
        .filter(|r| seen.insert(r.id.clone()))
        .collect();
    if distinct.len() < total {
        debug!(
            duplicates = total - distinct.len(),
            "Ignoring repeated record ids"
        );
    }
    distinct
}

fn next_record(queue: &WorkQueue) -> Option<CoarseRecord> {
    queue.lock().pop_front()
}

async fn run_worker(
    fetcher: DetailFetcher,
    queue: WorkQueue,
    tx: mpsc::Sender<Outcome>,
    cancel: CancellationToken
) {
    while !cancel.is_cancelled() {
        let Some(record) = next_record(&queue) else {
            break;
        };

        let outcome = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            outcome = fetcher.fetch_details(&record) => outcome,
        };

        if tx.send(outcome).await.is_err() {
            break;
        }
    }
}
