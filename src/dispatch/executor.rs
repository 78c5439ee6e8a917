use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{Mutex, OwnedMutexGuard, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::domain::{RequestTask, RunConfig};
use crate::error::{AppError, AppResult, RunError};
use crate::events::{EventSink, ProgressSnapshot};
use crate::http::{RequestSender, SendOutcome, build_client};
use crate::params::ParamMapper;

use super::csv_source::CsvSource;
use super::rate::RateGate;
use super::worker::{TaskRunner, Worker, spawn_fault_monitor};

/// The producer re-checks cancellation once per this many rows.
const CANCEL_CHECK_ROWS: usize = 10;
/// A progress snapshot goes out once per this many processed rows.
const PROGRESS_EVERY_ROWS: u64 = 100;
/// Line number of the first data row; line 1 is the header.
const FIRST_DATA_LINE: usize = 2;

/// Final tally of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunReport {
    pub total: u64,
    pub processed: u64,
    pub dispatched: u64,
    pub succeeded: u64,
    pub client_failed: u64,
    pub exhausted: u64,
    pub aborted: u64,
    pub mapping_failed: u64,
    pub worker_faults: u64,
    pub cancelled: bool,
}

impl RunReport {
    #[must_use]
    pub const fn errors(&self) -> u64 {
        self.client_failed
            .saturating_add(self.exhausted)
            .saturating_add(self.aborted)
            .saturating_add(self.mapping_failed)
            .saturating_add(self.worker_faults)
    }

    /// Snapshot for the final progress event. A completed run always reads
    /// as fully processed.
    #[must_use]
    pub const fn final_snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            processed: if self.cancelled {
                self.processed
            } else {
                self.total
            },
            total: self.total,
            success: self.succeeded,
            error: self.errors(),
        }
    }
}

#[derive(Debug, Default)]
pub struct RunCounters {
    processed: AtomicU64,
    dispatched: AtomicU64,
    succeeded: AtomicU64,
    client_failed: AtomicU64,
    exhausted: AtomicU64,
    aborted: AtomicU64,
    mapping_failed: AtomicU64,
    worker_faults: AtomicU64,
}

impl RunCounters {
    pub(crate) fn record_outcome(&self, outcome: SendOutcome) {
        let counter = match outcome {
            SendOutcome::Succeeded => &self.succeeded,
            SendOutcome::ClientFailed => &self.client_failed,
            SendOutcome::Exhausted => &self.exhausted,
            SendOutcome::Aborted => &self.aborted,
            SendOutcome::Cancelled => return,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_fault(&self) {
        self.worker_faults.fetch_add(1, Ordering::Relaxed);
    }

    fn record_dispatched(&self) -> u64 {
        self.dispatched.fetch_add(1, Ordering::Relaxed);
        self.processed.fetch_add(1, Ordering::Relaxed).saturating_add(1)
    }

    fn record_mapping_failure(&self) -> u64 {
        self.mapping_failed.fetch_add(1, Ordering::Relaxed);
        self.processed.fetch_add(1, Ordering::Relaxed).saturating_add(1)
    }

    #[must_use]
    pub fn report(&self, total: u64, cancelled: bool) -> RunReport {
        RunReport {
            total,
            processed: self.processed.load(Ordering::Relaxed),
            dispatched: self.dispatched.load(Ordering::Relaxed),
            succeeded: self.succeeded.load(Ordering::Relaxed),
            client_failed: self.client_failed.load(Ordering::Relaxed),
            exhausted: self.exhausted.load(Ordering::Relaxed),
            aborted: self.aborted.load(Ordering::Relaxed),
            mapping_failed: self.mapping_failed.load(Ordering::Relaxed),
            worker_faults: self.worker_faults.load(Ordering::Relaxed),
            cancelled,
        }
    }

    #[must_use]
    pub fn snapshot(&self, total: u64) -> ProgressSnapshot {
        let report = self.report(total, false);
        ProgressSnapshot {
            processed: report.processed,
            total,
            success: report.succeeded,
            error: report.errors(),
        }
    }
}

/// State scoped to one active run.
pub(crate) struct ExecutionRun {
    cancel: CancellationToken,
    counters: Arc<RunCounters>,
    config: Arc<RunConfig>,
    events: EventSink,
    total: u64,
}

impl ExecutionRun {
    /// Maps rows in file order and feeds the queue. Returns true when the
    /// run was cancelled before every row was handled.
    async fn produce(
        &self,
        header: &[String],
        rows: Vec<Vec<String>>,
        queue: mpsc::Sender<RequestTask>,
    ) -> bool {
        let mapper = ParamMapper::new(
            &self.config.mappings,
            self.config.param_mode,
            self.config.array_gaps,
            header,
        );
        for (idx, fields) in rows.into_iter().enumerate() {
            if idx.checked_rem(CANCEL_CHECK_ROWS) == Some(0) && self.cancel.is_cancelled() {
                self.events.log("Execution cancelled during processing");
                return true;
            }
            let row = idx.saturating_add(FIRST_DATA_LINE);

            let processed = match mapper.map_row(&fields) {
                Ok(mapped) => {
                    for failure in &mapped.failures {
                        self.events.log(format!(
                            "Row {} param '{}' conversion failed: {}",
                            row, failure.label, failure.source
                        ));
                    }
                    let task = RequestTask {
                        payload: mapped.payload,
                        row,
                    };
                    tokio::select! {
                        biased;
                        () = self.cancel.cancelled() => {
                            self.events.log("Execution cancelled before sending task");
                            return true;
                        }
                        sent = queue.send(task) => {
                            if sent.is_err() {
                                warn!("Task queue closed with rows left to send");
                                return self.cancel.is_cancelled();
                            }
                        }
                    }
                    self.counters.record_dispatched()
                }
                Err(err) => {
                    self.events
                        .log(format!("Row {} param generation failed: {}", row, err));
                    self.counters.record_mapping_failure()
                }
            };

            if processed.checked_rem(PROGRESS_EVERY_ROWS) == Some(0) || processed == self.total {
                self.events.progress(self.counters.snapshot(self.total));
            }
        }
        false
    }
}

/// Runs CSV files through the mapper, the rate gate and the worker pool.
///
/// At most one run is active per dispatcher; clones share the run lock.
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    run_lock: Arc<Mutex<()>>,
}

impl Dispatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.run_lock.try_lock().is_err()
    }

    /// Executes one run and blocks until every row is handled or `cancel`
    /// fires. Cancellation is not an error; it is reported on the
    /// returned `RunReport`.
    ///
    /// # Errors
    ///
    /// Returns an error when another run is active, the HTTP client cannot
    /// be built, or the CSV cannot be read.
    pub async fn run(
        &self,
        cancel: &CancellationToken,
        config: Arc<RunConfig>,
        source: CsvSource,
        events: EventSink,
    ) -> AppResult<RunReport> {
        let _guard = self.acquire()?;
        let client = build_client(&config)?;
        let sender = RequestSender::new(client, Arc::clone(&config), events.clone());
        execute(cancel, config, source, events, sender).await
    }

    /// Same as [`Dispatcher::run`] with a caller-supplied task runner.
    #[cfg(test)]
    pub(crate) async fn run_with<R: TaskRunner>(
        &self,
        cancel: &CancellationToken,
        config: Arc<RunConfig>,
        source: CsvSource,
        events: EventSink,
        runner: R,
    ) -> AppResult<RunReport> {
        let _guard = self.acquire()?;
        execute(cancel, config, source, events, runner).await
    }

    fn acquire(&self) -> AppResult<OwnedMutexGuard<()>> {
        Arc::clone(&self.run_lock)
            .try_lock_owned()
            .map_err(|_busy| AppError::run(RunError::AlreadyActive))
    }
}

async fn execute<R: TaskRunner>(
    cancel: &CancellationToken,
    config: Arc<RunConfig>,
    source: CsvSource,
    events: EventSink,
    runner: R,
) -> AppResult<RunReport> {
    let cancel = cancel.child_token();
    events.log(format!(
        "Starting execution - QPS: {}, Workers: {}, Retries: {}",
        config.qps, config.workers, config.max_retries
    ));

    let csv = source.read().await?;
    if let Some(err) = &csv.stopped_at {
        events.log(format!(
            "CSV read stopped after {} rows: {}",
            csv.rows.len(),
            err
        ));
    }
    let mut rows = csv.rows.into_iter();
    let header = rows.next().unwrap_or_default();
    let data: Vec<Vec<String>> = rows.collect();
    let total = u64::try_from(data.len()).unwrap_or(u64::MAX);
    let counters = Arc::new(RunCounters::default());

    if data.is_empty() {
        events.log("CSV file has no data rows");
        let report = counters.report(0, false);
        events.progress(report.final_snapshot());
        return Ok(report);
    }
    events.log(format!("Found {} data rows to process", total));
    info!(total, workers = config.workers.get(), qps = config.qps.get(), "run started");

    let (task_tx, task_rx) = mpsc::channel(config.queue_capacity());
    let queue = Arc::new(Mutex::new(task_rx));
    let gate = Arc::new(RateGate::start(config.qps));
    let runner = Arc::new(runner);
    let (fault_tx, fault_rx) = mpsc::channel(config.workers.get());
    let monitor = spawn_fault_monitor(fault_rx, events.clone());

    let mut handles = Vec::with_capacity(config.workers.get());
    for id in 0..config.workers.get() {
        let worker = Worker {
            id,
            queue: Arc::clone(&queue),
            gate: Arc::clone(&gate),
            runner: Arc::clone(&runner),
            counters: Arc::clone(&counters),
            faults: fault_tx.clone(),
            cancel: cancel.clone(),
        };
        handles.push(worker.spawn());
    }
    drop(fault_tx);
    drop(queue);

    let run = ExecutionRun {
        cancel: cancel.clone(),
        counters: Arc::clone(&counters),
        config,
        events: events.clone(),
        total,
    };
    let stopped_early = run.produce(&header, data, task_tx).await;

    for handle in handles {
        if let Err(err) = handle.await {
            warn!("Worker task ended abnormally: {}", err);
            counters.record_fault();
        }
    }
    if let Err(err) = monitor.await {
        warn!("Fault monitor ended abnormally: {}", err);
    }
    drop(gate);

    let report = counters.report(total, stopped_early || cancel.is_cancelled());
    events.progress(report.final_snapshot());
    if report.cancelled {
        events.log(format!(
            "Execution cancelled - processed: {}/{}, success: {}, errors: {}",
            report.processed,
            report.total,
            report.succeeded,
            report.errors()
        ));
    } else {
        events.log(format!(
            "Execution completed - success: {}, errors: {}",
            report.succeeded,
            report.errors()
        ));
    }
    info!(
        succeeded = report.succeeded,
        errors = report.errors(),
        cancelled = report.cancelled,
        "run finished"
    );
    Ok(report)
}
