//! # Gateway
//!
//! Asynchronous log batching.
//!
//! Responsibilities:
//! - Receive records published on the bus
//! - Fan-out to every registered writer, filtered per writer
//! - Queue records per writer and flush them on size or on a timer
//! - Contain filter and writer failures inside their handler

pub mod error;
pub mod filter;
pub mod gateway;
pub mod handler;
pub mod metrics;
pub mod pool;
pub mod writers;

pub use contracts::{LogFilter, LogQueue, LogRecord, LogWriter, LoggingConfig};
pub use error::GatewayError;
pub use filter::TypeFilter;
pub use gateway::{build_gateway, GatewayState, LogGateway};
pub use handler::{FlushTrigger, LogHandler};
pub use metrics::{HandlerMetrics, MetricsSnapshot};
pub use pool::{PeriodicTask, WorkerPool};
pub use writers::{FileLogWriter, FileLogWriterConfig, MemoryLogWriter, TracingLogWriter};
