//! TracingLogWriter - re-emits records as tracing events

use contracts::{ContractError, LogQueue, LogRecord, LogWriter};
use tracing::{info, instrument};

/// Writer that forwards records to the tracing subscriber
pub struct TracingLogWriter {
    name: String,
}

impl TracingLogWriter {
    /// Create a new TracingLogWriter with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn emit(&self, record: &LogRecord) {
        info!(
            writer = %self.name,
            log_type = record.log_type(),
            received_at = %record.received_at(),
            message = record.message(),
            "Log record"
        );
    }
}

impl LogWriter for TracingLogWriter {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(name = "tracing_writer_open", skip(self), fields(writer = %self.name))]
    async fn open(&mut self) -> Result<(), ContractError> {
        Ok(())
    }

    #[instrument(name = "tracing_writer_drain", skip(self, queue), fields(writer = %self.name))]
    async fn drain(&mut self, queue: &LogQueue) -> Result<(), ContractError> {
        while let Some(record) = queue.dequeue() {
            self.emit(&record);
        }
        Ok(())
    }

    #[instrument(name = "tracing_writer_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        info!(writer = %self.name, "TracingLogWriter closed");
        Ok(())
    }
}
