//! # Contracts
//!
//! Interface contracts shared by the gateway crates: the log record, the
//! record queue, and the filter/writer traits every destination implements.
//! Business crates depend on this crate only, never the other way round.
//!
//! ## Time Model
//! - Records are stamped in UTC when constructed (`received_at`)

mod blueprint;
mod bus;
mod config;
mod error;
mod filter;
mod queue;
mod record;
mod writer;

pub use blueprint::*;
pub use bus::BusMessage;
pub use config::LoggingConfig;
pub use error::*;
pub use filter::LogFilter;
pub use queue::LogQueue;
pub use record::LogRecord;
pub use writer::*;
