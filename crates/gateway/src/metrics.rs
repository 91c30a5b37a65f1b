//! Handler metrics for observability

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Metrics for a single handler
#[derive(Debug, Default)]
pub struct HandlerMetrics {
    /// Queue length at the last update
    queue_len: AtomicUsize,
    /// Records queued after filtering
    accepted_count: AtomicU64,
    /// Records rejected by the filter
    filtered_count: AtomicU64,
    /// Filter evaluations that failed
    filter_error_count: AtomicU64,
    /// Flush tasks submitted to the pool
    flush_submitted_count: AtomicU64,
    /// Flush tasks whose drain succeeded
    flush_completed_count: AtomicU64,
    /// Flush tasks whose drain failed
    flush_failed_count: AtomicU64,
    /// Failed writer close calls
    close_failure_count: AtomicU64,
}

impl HandlerMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_len(&self) -> usize {
        self.queue_len.load(Ordering::Relaxed)
    }

    pub fn set_queue_len(&self, len: usize) {
        self.queue_len.store(len, Ordering::Relaxed);
    }

    pub fn accepted_count(&self) -> u64 {
        self.accepted_count.load(Ordering::Relaxed)
    }

    pub fn inc_accepted_count(&self) {
        self.accepted_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn filtered_count(&self) -> u64 {
        self.filtered_count.load(Ordering::Relaxed)
    }

    pub fn inc_filtered_count(&self) {
        self.filtered_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn filter_error_count(&self) -> u64 {
        self.filter_error_count.load(Ordering::Relaxed)
    }

    pub fn inc_filter_error_count(&self) {
        self.filter_error_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn flush_submitted_count(&self) -> u64 {
        self.flush_submitted_count.load(Ordering::Relaxed)
    }

    pub fn inc_flush_submitted_count(&self) {
        self.flush_submitted_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn flush_completed_count(&self) -> u64 {
        self.flush_completed_count.load(Ordering::Relaxed)
    }

    pub fn inc_flush_completed_count(&self) {
        self.flush_completed_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn flush_failed_count(&self) -> u64 {
        self.flush_failed_count.load(Ordering::Relaxed)
    }

    pub fn inc_flush_failed_count(&self) {
        self.flush_failed_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn close_failure_count(&self) -> u64 {
        self.close_failure_count.load(Ordering::Relaxed)
    }

    pub fn inc_close_failure_count(&self) {
        self.close_failure_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            queue_len: self.queue_len(),
            accepted_count: self.accepted_count(),
            filtered_count: self.filtered_count(),
            filter_error_count: self.filter_error_count(),
            flush_submitted_count: self.flush_submitted_count(),
            flush_completed_count: self.flush_completed_count(),
            flush_failed_count: self.flush_failed_count(),
            close_failure_count: self.close_failure_count(),
        }
    }
}

/// Snapshot of handler metrics (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub queue_len: usize,
    pub accepted_count: u64,
    pub filtered_count: u64,
    pub filter_error_count: u64,
    pub flush_submitted_count: u64,
    pub flush_completed_count: u64,
    pub flush_failed_count: u64,
    pub close_failure_count: u64,
}
