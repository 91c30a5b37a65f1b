//! LogWriter trait - gateway output interface
//!
//! Defines the contract every log destination implements.

use crate::{ContractError, LogQueue};

/// Log output trait
///
/// The gateway calls `open` once at start, `drain` from worker tasks
/// whenever a flush is triggered, and `close` once at stop. `drain` and
/// `close` never run concurrently on the same writer.
#[trait_variant::make(LogWriter: Send)]
pub trait LocalLogWriter {
    /// Writer name (identity within a gateway, used for logging/metrics)
    fn name(&self) -> &str;

    /// Prepare the destination
    ///
    /// # Errors
    /// A failure aborts gateway startup.
    async fn open(&mut self) -> Result<(), ContractError>;

    /// Dequeue and persist records until the queue is empty
    ///
    /// A record is discarded only after it was persisted. If persisting fails,
    /// the in-flight record must be pushed back with [`LogQueue::push_back`]
    /// before returning the error; records still queued stay for the next
    /// flush.
    async fn drain(&mut self, queue: &LogQueue) -> Result<(), ContractError>;

    /// Release the destination
    async fn close(&mut self) -> Result<(), ContractError>;
}
