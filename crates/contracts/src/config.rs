//! Per-writer flush policy

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Logging configuration of one registered writer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Queue length above which a flush is submitted immediately
    #[serde(default)]
    pub max_unwritten_logs: usize,

    /// Period of the flush check in seconds (<= 0 disables it)
    #[serde(default = "default_write_period_secs")]
    pub write_period_secs: i64,
}

fn default_write_period_secs() -> i64 {
    60
}

impl LoggingConfig {
    pub fn new(max_unwritten_logs: usize, write_period_secs: i64) -> Self {
        Self {
            max_unwritten_logs,
            write_period_secs,
        }
    }

    /// Period of the flush check, `None` when periodic checks are disabled
    pub fn write_period(&self) -> Option<Duration> {
        u64::try_from(self.write_period_secs)
            .ok()
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            max_unwritten_logs: 0,
            write_period_secs: default_write_period_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_period() {
        assert_eq!(
            LoggingConfig::new(0, 5).write_period(),
            Some(Duration::from_secs(5))
        );
        assert_eq!(LoggingConfig::new(0, 0).write_period(), None);
        assert_eq!(LoggingConfig::new(0, -3).write_period(), None);
    }

    #[test]
    fn test_defaults() {
        let config: LoggingConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, LoggingConfig::default());
        assert_eq!(config.max_unwritten_logs, 0);
        assert_eq!(config.write_period_secs, 60);
    }
}
