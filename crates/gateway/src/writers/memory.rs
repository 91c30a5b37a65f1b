//! MemoryLogWriter - keeps drained records in memory

use std::sync::Arc;

use contracts::{ContractError, LogQueue, LogRecord, LogWriter};
use parking_lot::Mutex;
use tracing::debug;

#[derive(Debug, Default)]
struct MemoryState {
    records: Vec<LogRecord>,
    /// Persist this many records in the next drain, then fail
    fail_after: Option<usize>,
    fail_open: bool,
    fail_close: bool,
    opened: bool,
    closed: bool,
}

/// Writer that captures records in a shared buffer
///
/// Clones share the buffer, so a clone kept by the caller observes what the
/// registered instance wrote.
#[derive(Debug, Clone)]
pub struct MemoryLogWriter {
    name: String,
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryLogWriter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Arc::new(Mutex::new(MemoryState::default())),
        }
    }

    /// Make `open` fail
    pub fn with_open_failure(self) -> Self {
        self.state.lock().fail_open = true;
        self
    }

    /// Make `close` fail
    pub fn with_close_failure(self) -> Self {
        self.state.lock().fail_close = true;
        self
    }

    /// Fail the next drain after `persisted` records were written
    pub fn fail_next_drain_after(&self, persisted: usize) {
        self.state.lock().fail_after = Some(persisted);
    }

    /// Captured records in write order
    pub fn records(&self) -> Vec<LogRecord> {
        self.state.lock().records.clone()
    }

    /// Captured messages in write order
    pub fn messages(&self) -> Vec<String> {
        self.state
            .lock()
            .records
            .iter()
            .map(|r| r.message().to_string())
            .collect()
    }

    pub fn is_opened(&self) -> bool {
        self.state.lock().opened
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }
}

impl LogWriter for MemoryLogWriter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn open(&mut self) -> Result<(), ContractError> {
        let mut state = self.state.lock();
        if state.fail_open {
            return Err(ContractError::writer_open(&self.name, "open failure requested"));
        }
        state.opened = true;
        Ok(())
    }

    async fn drain(&mut self, queue: &LogQueue) -> Result<(), ContractError> {
        let mut state = self.state.lock();
        let budget = state.fail_after.take();
        let mut written = 0usize;

        while let Some(record) = queue.dequeue() {
            if budget.is_some_and(|limit| written >= limit) {
                queue.push_back(record);
                return Err(ContractError::writer_write(
                    &self.name,
                    format!("failure requested after {written} records"),
                ));
            }
            state.records.push(record);
            written += 1;
        }

        debug!(writer = %self.name, written, "MemoryLogWriter drained");
        Ok(())
    }

    async fn close(&mut self) -> Result<(), ContractError> {
        let mut state = self.state.lock();
        state.closed = true;
        if state.fail_close {
            return Err(ContractError::writer_close(&self.name, "close failure requested"));
        }
        Ok(())
    }
}
