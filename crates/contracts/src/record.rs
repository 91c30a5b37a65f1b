//! LogRecord - one unit of loggable data

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Immutable log record
///
/// The timestamp is taken when the record is constructed, not when it is
/// queued or written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    log_type: String,
    message: String,
    received_at: DateTime<Utc>,
}

impl LogRecord {
    /// Create a record stamped with the current time
    pub fn new(log_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_timestamp(log_type, message, Utc::now())
    }

    /// Create a record with an explicit timestamp
    pub fn with_timestamp(
        log_type: impl Into<String>,
        message: impl Into<String>,
        received_at: DateTime<Utc>,
    ) -> Self {
        Self {
            log_type: log_type.into(),
            message: message.into(),
            received_at,
        }
    }

    /// Type (category) of the record
    pub fn log_type(&self) -> &str {
        &self.log_type
    }

    /// Message of the record
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Time when the record was received by the gateway
    pub fn received_at(&self) -> DateTime<Utc> {
        self.received_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_timestamp_set_at_construction() {
        let before = Utc::now();
        let record = LogRecord::new("info", "hello");
        let after = Utc::now();

        assert_eq!(record.log_type(), "info");
        assert_eq!(record.message(), "hello");
        assert!(record.received_at() >= before && record.received_at() <= after);
    }
}
