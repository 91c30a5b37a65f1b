//! LogHandler - binds a writer to its queue, filter and flush policy

use std::future::Future;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, instrument, warn};

use contracts::{ContractError, LogFilter, LogQueue, LogRecord, LogWriter, LoggingConfig};

use crate::metrics::{HandlerMetrics, MetricsSnapshot};
use crate::pool::{PeriodicTask, WorkerPool};

pub(crate) type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// What caused a flush submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushTrigger {
    /// Queue grew past `max_unwritten_logs`
    Size,
    /// Periodic check found queued records
    Period,
}

impl FlushTrigger {
    fn as_str(self) -> &'static str {
        match self {
            Self::Size => "size",
            Self::Period => "period",
        }
    }
}

/// Handler-local flush state, `idle` when `in_flight` is `None`
#[derive(Debug, Default)]
struct FlushState {
    in_flight: Option<JoinHandle<()>>,
}

impl FlushState {
    fn is_flushing(&self) -> bool {
        // A task dropped by a shut-down runtime never clears the handle itself
        self.in_flight
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

/// Clears the in-flight handle when the flush task ends, even on panic
struct InFlightGuard {
    state: Arc<Mutex<FlushState>>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.state.lock().in_flight = None;
    }
}

/// Handler of one writer
///
/// At most one flush per handler is in flight; both triggers go through the
/// same state lock, so a record accepted while a flush runs is picked up by
/// that flush or by the next trigger.
pub struct LogHandler<W> {
    name: String,
    writer: Arc<tokio::sync::Mutex<W>>,
    filter: Option<Arc<dyn LogFilter>>,
    queue: Arc<LogQueue>,
    config: LoggingConfig,
    state: Arc<Mutex<FlushState>>,
    periodic: Mutex<Option<PeriodicTask>>,
    metrics: Arc<HandlerMetrics>,
}

impl<W: LogWriter + 'static> LogHandler<W> {
    /// Create a handler for `writer`
    pub fn new(writer: W, filter: Option<Arc<dyn LogFilter>>, config: LoggingConfig) -> Self {
        Self {
            name: writer.name().to_string(),
            writer: Arc::new(tokio::sync::Mutex::new(writer)),
            filter,
            queue: Arc::new(LogQueue::new()),
            config,
            state: Arc::new(Mutex::new(FlushState::default())),
            periodic: Mutex::new(None),
            metrics: Arc::new(HandlerMetrics::new()),
        }
    }

    /// Writer name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Flush policy
    pub fn config(&self) -> &LoggingConfig {
        &self.config
    }

    /// Records waiting for the writer
    pub fn queue(&self) -> &LogQueue {
        &self.queue
    }

    pub fn metrics(&self) -> &Arc<HandlerMetrics> {
        &self.metrics
    }

    /// Whether a flush task is submitted and not yet finished
    pub fn is_flushing(&self) -> bool {
        self.state.lock().is_flushing()
    }

    /// Filter and queue a record, submitting a flush once the queue is over
    /// `max_unwritten_logs` and no flush is in flight
    pub fn accept(&self, record: &LogRecord, pool: &WorkerPool) {
        if !self.passes_filter(record.log_type()) {
            return;
        }

        let mut state = self.state.lock();
        self.queue.enqueue(record.clone());
        self.metrics.inc_accepted_count();
        observability::record_log_accepted(&self.name);

        let queue_len = self.queue.len();
        self.metrics.set_queue_len(queue_len);

        if state.is_flushing() {
            return;
        }

        if queue_len > self.config.max_unwritten_logs {
            self.submit_flush(&mut state, pool, FlushTrigger::Size);
        }
    }

    /// Periodic check: submit a flush if records are queued and none is in flight
    pub fn check(&self, pool: &WorkerPool) {
        let mut state = self.state.lock();
        if state.is_flushing() {
            return;
        }

        if self.queue.is_empty() {
            return;
        }

        self.submit_flush(&mut state, pool, FlushTrigger::Period);
    }

    fn passes_filter(&self, log_type: &str) -> bool {
        let Some(filter) = &self.filter else {
            return true;
        };

        let verdict = catch_unwind(AssertUnwindSafe(|| filter.accept(log_type)))
            .unwrap_or_else(|_| Err(ContractError::filter(log_type, "filter panicked")));

        match verdict {
            Ok(true) => true,
            Ok(false) => {
                self.metrics.inc_filtered_count();
                observability::record_log_filtered(&self.name, false);
                false
            }
            Err(e) => {
                self.metrics.inc_filter_error_count();
                observability::record_log_filtered(&self.name, true);
                error!(writer = %self.name, log_type, error = %e, "Log filter failed, record dropped");
                false
            }
        }
    }

    /// Caller holds the state lock, so the task cannot clear the handle
    /// before it is stored
    fn submit_flush(&self, state: &mut FlushState, pool: &WorkerPool, trigger: FlushTrigger) {
        let name = self.name.clone();
        let writer = Arc::clone(&self.writer);
        let queue = Arc::clone(&self.queue);
        let metrics = Arc::clone(&self.metrics);
        let guard_state = Arc::clone(&self.state);

        debug!(writer = %name, trigger = trigger.as_str(), queued = queue.len(), "Submitting flush");

        let handle = pool.submit(async move {
            let _guard = InFlightGuard { state: guard_state };
            flush(&name, &writer, &queue, &metrics).await;
        });

        state.in_flight = Some(handle);
        self.metrics.inc_flush_submitted_count();
        observability::record_flush_submitted(&self.name, trigger.as_str());
    }

    fn replace_periodic(&self, task: Option<PeriodicTask>) -> Option<PeriodicTask> {
        std::mem::replace(&mut *self.periodic.lock(), task)
    }
}

/// Flush task body: drain the queue into the writer, report failures
#[instrument(name = "log_handler_flush", skip(writer, queue, metrics), fields(writer = %name))]
async fn flush<W: LogWriter>(
    name: &str,
    writer: &tokio::sync::Mutex<W>,
    queue: &LogQueue,
    metrics: &HandlerMetrics,
) {
    let started = Instant::now();
    let mut writer = writer.lock().await;

    let result = writer.drain(queue).await;
    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
    let remaining = queue.len();
    metrics.set_queue_len(remaining);
    observability::record_queue_depth(name, remaining);

    match result {
        Ok(()) => {
            metrics.inc_flush_completed_count();
            observability::record_flush_result(name, true, elapsed_ms);
            debug!(writer = %name, remaining, elapsed_ms, "Flush completed");
        }
        Err(e) => {
            metrics.inc_flush_failed_count();
            observability::record_flush_result(name, false, elapsed_ms);
            error!(writer = %name, remaining, error = %e, "Write operation failed");
        }
    }
}

fn record_close_failure(name: &str, metrics: &HandlerMetrics) {
    metrics.inc_close_failure_count();
    observability::record_writer_close_failure(name);
}

/// Type-erased handler as stored by the gateway
pub(crate) trait ManagedHandler: Send + Sync {
    fn name(&self) -> &str;
    fn config(&self) -> &LoggingConfig;
    fn accept(&self, record: &LogRecord, pool: &WorkerPool);
    fn check(&self, pool: &WorkerPool);
    fn is_flushing(&self) -> bool;
    fn queue_len(&self) -> usize;
    fn metrics(&self) -> MetricsSnapshot;
    fn set_periodic(&self, task: PeriodicTask);
    fn cancel_periodic(&self);
    fn open(&self) -> BoxFuture<'_, Result<(), ContractError>>;
    /// Close the writer; deferred to `pool` while a drain holds it
    fn close(&self, pool: &WorkerPool) -> BoxFuture<'_, Result<(), ContractError>>;
}

impl<W: LogWriter + 'static> ManagedHandler for LogHandler<W> {
    fn name(&self) -> &str {
        LogHandler::name(self)
    }

    fn config(&self) -> &LoggingConfig {
        LogHandler::config(self)
    }

    fn accept(&self, record: &LogRecord, pool: &WorkerPool) {
        LogHandler::accept(self, record, pool);
    }

    fn check(&self, pool: &WorkerPool) {
        LogHandler::check(self, pool);
    }

    fn is_flushing(&self) -> bool {
        LogHandler::is_flushing(self)
    }

    fn queue_len(&self) -> usize {
        self.queue.len()
    }

    fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    fn set_periodic(&self, task: PeriodicTask) {
        if let Some(previous) = self.replace_periodic(Some(task)) {
            warn!(writer = %self.name, "Replacing an existing periodic check");
            previous.cancel();
        }
    }

    fn cancel_periodic(&self) {
        if let Some(task) = self.replace_periodic(None) {
            task.cancel();
        }
    }

    fn open(&self) -> BoxFuture<'_, Result<(), ContractError>> {
        Box::pin(async move { self.writer.lock().await.open().await })
    }

    fn close(&self, pool: &WorkerPool) -> BoxFuture<'_, Result<(), ContractError>> {
        if let Ok(mut writer) = Arc::clone(&self.writer).try_lock_owned() {
            return Box::pin(async move {
                let result = writer.close().await;
                if result.is_err() {
                    record_close_failure(&self.name, &self.metrics);
                }
                result
            });
        }

        // A flush holds the writer: close once it lets go, without waiting here
        debug!(writer = %self.name, "Writer busy, deferring close");
        let name = self.name.clone();
        let writer = Arc::clone(&self.writer);
        let metrics = Arc::clone(&self.metrics);
        pool.submit(async move {
            if let Err(e) = writer.lock().await.close().await {
                record_close_failure(&name, &metrics);
                error!(writer = %name, error = %e, "Deferred close of log writer failed");
            }
        });
        Box::pin(async { Ok(()) })
    }
}
