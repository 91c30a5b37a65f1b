//! LogQueue - thread-safe FIFO of unwritten records with push-back

use std::collections::VecDeque;

use parking_lot::Mutex;

use crate::LogRecord;

/// Thread-safe queue of log records
///
/// Every call is atomic with respect to the internal lock. Sequences of
/// calls are not, so `len()` / `is_empty()` are snapshots only.
#[derive(Debug, Default)]
pub struct LogQueue {
    records: Mutex<VecDeque<LogRecord>>,
}

impl LogQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record at the tail
    pub fn enqueue(&self, record: LogRecord) {
        self.records.lock().push_back(record);
    }

    /// Remove and return the head, or `None` if the queue is empty
    pub fn dequeue(&self) -> Option<LogRecord> {
        self.records.lock().pop_front()
    }

    /// Put a record back at the head
    ///
    /// Writers call this for a record they took but failed to persist, so it
    /// is the first one retried on the next flush.
    pub fn push_back(&self, record: LogRecord) {
        self.records.lock().push_front(record);
    }

    /// Number of queued records
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Whether the queue holds no records
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}
