//! LogGateway - handler lifecycle and fan-out of published records

use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use contracts::{
    BusMessage, GatewayBlueprint, LogFilter, LogRecord, LogWriter, LoggingConfig, WriterConfig,
    WriterType, DEFAULT_GATEWAY_ID,
};

use crate::error::GatewayError;
use crate::filter::TypeFilter;
use crate::handler::{LogHandler, ManagedHandler};
use crate::metrics::MetricsSnapshot;
use crate::pool::WorkerPool;
use crate::writers::{FileLogWriter, MemoryLogWriter, TracingLogWriter};

/// Lifecycle state of a gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayState {
    /// Writers may be registered
    Registering,
    /// Periodic checks scheduled, writers being opened
    Starting,
    /// Records are fanned out to handlers
    Started,
    /// Checks cancelled, writers closed
    Stopped,
}

struct Lifecycle {
    state: GatewayState,
    pool: Option<WorkerPool>,
}

/// The gateway that manages asynchronous writing of logs
pub struct LogGateway {
    id: String,
    handlers: RwLock<Vec<Arc<dyn ManagedHandler>>>,
    lifecycle: Mutex<Lifecycle>,
}

impl LogGateway {
    /// Create a gateway with the default id
    pub fn new() -> Self {
        Self::with_id(DEFAULT_GATEWAY_ID)
    }

    /// Create a gateway with a custom id
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            handlers: RwLock::new(Vec::new()),
            lifecycle: Mutex::new(Lifecycle {
                state: GatewayState::Registering,
                pool: None,
            }),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> GatewayState {
        self.lifecycle.lock().state
    }

    /// Names of the registered writers in registration order
    pub fn writer_names(&self) -> Vec<String> {
        self.handlers
            .read()
            .iter()
            .map(|h| h.name().to_string())
            .collect()
    }

    /// Register a writer with an optional filter
    ///
    /// # Errors
    /// - the gateway left the registration phase
    /// - a writer with the same name is already registered
    pub fn register_writer<W>(
        &self,
        writer: W,
        filter: Option<Arc<dyn LogFilter>>,
        config: LoggingConfig,
    ) -> Result<(), GatewayError>
    where
        W: LogWriter + 'static,
    {
        let lifecycle = self.lifecycle.lock();
        if lifecycle.state != GatewayState::Registering {
            return Err(GatewayError::AlreadyStarted {
                gateway: self.id.clone(),
            });
        }

        let mut handlers = self.handlers.write();
        if handlers.iter().any(|h| h.name() == writer.name()) {
            return Err(GatewayError::DuplicateWriter {
                name: writer.name().to_string(),
            });
        }

        debug!(
            gateway = %self.id,
            writer = writer.name(),
            max_unwritten_logs = config.max_unwritten_logs,
            write_period_secs = config.write_period_secs,
            filtered = filter.is_some(),
            "Writer registered"
        );
        handlers.push(Arc::new(LogHandler::new(writer, filter, config)));
        Ok(())
    }

    /// Register a writer without a filter
    pub fn register<W>(&self, writer: W, config: LoggingConfig) -> Result<(), GatewayError>
    where
        W: LogWriter + 'static,
    {
        self.register_writer(writer, None, config)
    }

    /// Start the gateway on the given worker pool
    ///
    /// Schedules the periodic checks, then opens every writer in
    /// registration order. If a writer fails to open, the checks are
    /// cancelled, writers opened so far are closed and the gateway ends up
    /// stopped.
    #[instrument(name = "log_gateway_start", skip(self, pool), fields(gateway = %self.id))]
    pub async fn start(&self, pool: WorkerPool) -> Result<(), GatewayError> {
        {
            let mut lifecycle = self.lifecycle.lock();
            if lifecycle.state != GatewayState::Registering {
                return Err(GatewayError::AlreadyStarted {
                    gateway: self.id.clone(),
                });
            }
            lifecycle.state = GatewayState::Starting;
            lifecycle.pool = Some(pool.clone());
        }

        let handlers = self.snapshot();
        for handler in &handlers {
            if let Some(period) = handler.config().write_period() {
                let check_handler = Arc::clone(handler);
                let check_pool = pool.clone();
                let task = pool.schedule_fixed_delay(Duration::ZERO, period, move || {
                    check_handler.check(&check_pool);
                });
                handler.set_periodic(task);
            }
        }

        if handlers.is_empty() {
            warn!(gateway = %self.id, "No log writers are registered to be used by the gateway");
        }

        for (idx, handler) in handlers.iter().enumerate() {
            if let Err(source) = handler.open().await {
                error!(
                    gateway = %self.id,
                    writer = handler.name(),
                    error = %source,
                    "Log writer cannot be opened"
                );
                self.abort_start(&handlers, idx, &pool).await;
                return Err(GatewayError::WriterOpen {
                    name: handler.name().to_string(),
                    source,
                });
            }
            debug!(gateway = %self.id, writer = handler.name(), "Writer opened");
        }

        self.lifecycle.lock().state = GatewayState::Started;
        info!(gateway = %self.id, writers = handlers.len(), "Log gateway started");
        Ok(())
    }

    async fn abort_start(
        &self,
        handlers: &[Arc<dyn ManagedHandler>],
        opened: usize,
        pool: &WorkerPool,
    ) {
        for handler in handlers {
            handler.cancel_periodic();
        }
        Self::close_handlers(&self.id, &handlers[..opened], pool).await;

        let mut lifecycle = self.lifecycle.lock();
        lifecycle.state = GatewayState::Stopped;
        lifecycle.pool = None;
    }

    /// Fan a record out to every handler in registration order
    pub fn dispatch(&self, record: LogRecord) -> Result<(), GatewayError> {
        let pool = self.running_pool()?;
        for handler in self.handlers.read().iter() {
            handler.accept(&record, &pool);
        }
        Ok(())
    }

    /// Map a bus message to a record and dispatch it
    ///
    /// The record type is the topic without the `<gateway id>/` prefix, or
    /// the whole topic when it has no such prefix.
    pub fn publish(&self, topic: &str, payload: impl Into<String>) -> Result<(), GatewayError> {
        let log_type = self.record_type(topic)?;
        self.dispatch(LogRecord::new(log_type, payload))
    }

    fn record_type<'a>(&self, topic: &'a str) -> Result<&'a str, GatewayError> {
        if topic.is_empty() {
            return Err(GatewayError::InvalidTopic {
                topic: topic.to_string(),
            });
        }

        Ok(topic
            .strip_prefix(self.id.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|subtopic| !subtopic.is_empty())
            .unwrap_or(topic))
    }

    /// Consume bus messages until the channel is closed
    #[instrument(name = "log_gateway_run", skip(self, input_rx), fields(gateway = %self.id))]
    pub async fn run(&self, mut input_rx: mpsc::Receiver<BusMessage>) {
        info!("Log gateway subscribed");

        let mut message_count: u64 = 0;
        while let Some(message) = input_rx.recv().await {
            message_count += 1;
            if let Err(e) = self.publish(&message.topic, message.payload) {
                warn!(topic = %message.topic, error = %e, "Message dropped");
            }

            if message_count % 1000 == 0 {
                debug!(messages = message_count, "Log gateway progress");
            }
        }

        info!(messages = message_count, "Log gateway input closed");
    }

    /// Spawn the subscription loop as a background task
    pub fn spawn(self: &Arc<Self>, input_rx: mpsc::Receiver<BusMessage>) -> JoinHandle<()> {
        let gateway = Arc::clone(self);
        tokio::spawn(async move {
            gateway.run(input_rx).await;
        })
    }

    /// Stop the gateway
    ///
    /// Cancels the periodic checks, closes every writer and releases the
    /// worker pool. Flushes already in flight are neither awaited nor
    /// cancelled: a writer still draining is closed on the pool once its
    /// flush ends. Records still queued are not written.
    #[instrument(name = "log_gateway_stop", skip(self), fields(gateway = %self.id))]
    pub async fn stop(&self) -> Result<(), GatewayError> {
        let pool = {
            let mut lifecycle = self.lifecycle.lock();
            let pool = match (lifecycle.state, lifecycle.pool.take()) {
                (GatewayState::Started, Some(pool)) => pool,
                (_, pool) => {
                    lifecycle.pool = pool;
                    return Err(GatewayError::NotRunning {
                        gateway: self.id.clone(),
                    });
                }
            };
            lifecycle.state = GatewayState::Stopped;
            pool
        };

        let handlers = self.snapshot();
        for handler in &handlers {
            handler.cancel_periodic();
        }

        Self::close_handlers(&self.id, &handlers, &pool).await;

        info!(gateway = %self.id, "Log gateway stopped");
        Ok(())
    }

    async fn close_handlers(
        gateway: &str,
        handlers: &[Arc<dyn ManagedHandler>],
        pool: &WorkerPool,
    ) {
        for handler in handlers {
            if let Err(e) = handler.close(pool).await {
                error!(
                    gateway,
                    writer = handler.name(),
                    error = %e,
                    "Closing of log writer failed"
                );
            }
        }
    }

    /// Metrics of every handler
    pub fn metrics(&self) -> Vec<(String, MetricsSnapshot)> {
        self.handlers
            .read()
            .iter()
            .map(|h| (h.name().to_string(), h.metrics()))
            .collect()
    }

    /// Queue length of the named writer's handler
    pub fn queue_len(&self, writer: &str) -> Option<usize> {
        self.find(writer).map(|h| h.queue_len())
    }

    /// Whether the named writer has a flush in flight
    pub fn is_flushing(&self, writer: &str) -> Option<bool> {
        self.find(writer).map(|h| h.is_flushing())
    }

    fn find(&self, writer: &str) -> Option<Arc<dyn ManagedHandler>> {
        self.handlers
            .read()
            .iter()
            .find(|h| h.name() == writer)
            .cloned()
    }

    fn snapshot(&self) -> Vec<Arc<dyn ManagedHandler>> {
        self.handlers.read().clone()
    }

    fn running_pool(&self) -> Result<WorkerPool, GatewayError> {
        let lifecycle = self.lifecycle.lock();
        match (&lifecycle.state, &lifecycle.pool) {
            (GatewayState::Started, Some(pool)) => Ok(pool.clone()),
            _ => Err(GatewayError::NotRunning {
                gateway: self.id.clone(),
            }),
        }
    }
}

impl Default for LogGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for LogGateway {
    /// Periodic checks hold their handler, so they would outlive a gateway
    /// dropped without `stop`
    fn drop(&mut self) {
        for handler in self.handlers.get_mut().iter() {
            handler.cancel_periodic();
        }
    }
}

/// Build a gateway and register the writers described by a blueprint
#[instrument(
    name = "log_gateway_build",
    skip(blueprint),
    fields(gateway = %blueprint.gateway_id, writer_count = blueprint.writers.len())
)]
pub fn build_gateway(blueprint: &GatewayBlueprint) -> Result<LogGateway, GatewayError> {
    let gateway = LogGateway::with_id(&blueprint.gateway_id);
    for config in &blueprint.writers {
        register_from_config(&gateway, config)?;
    }
    Ok(gateway)
}

fn register_from_config(gateway: &LogGateway, config: &WriterConfig) -> Result<(), GatewayError> {
    let filter = config
        .filter
        .as_ref()
        .map(|f| Arc::new(TypeFilter::from_config(f)) as Arc<dyn LogFilter>);

    match config.writer_type {
        WriterType::File => {
            let writer = FileLogWriter::from_params(&config.name, &config.params)
                .map_err(|e| GatewayError::writer_creation(&config.name, e.to_string()))?;
            gateway.register_writer(writer, filter, config.logging)
        }
        WriterType::Tracing => {
            gateway.register_writer(TracingLogWriter::new(&config.name), filter, config.logging)
        }
        WriterType::Memory => {
            gateway.register_writer(MemoryLogWriter::new(&config.name), filter, config.logging)
        }
    }
}
