//! Writer implementations
//!
//! Contains FileLogWriter, TracingLogWriter, and MemoryLogWriter.

mod file;
mod memory;
mod trace;

pub use self::file::{FileLogWriter, FileLogWriterConfig};
pub use self::memory::MemoryLogWriter;
pub use self::trace::TracingLogWriter;
