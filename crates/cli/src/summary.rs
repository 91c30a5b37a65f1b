//! Run statistics printed when the gateway stops.

use std::time::Duration;

use gateway::{LogGateway, MetricsSnapshot};

/// Statistics from a gateway run
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Gateway id
    pub gateway_id: String,

    /// Messages published from the input
    pub published: u64,

    /// Total duration of the run
    pub duration: Duration,

    /// Per-writer handler metrics, in registration order
    pub writers: Vec<(String, MetricsSnapshot)>,
}

impl RunSummary {
    pub fn collect(gateway: &LogGateway, published: u64, duration: Duration) -> Self {
        Self {
            gateway_id: gateway.id().to_string(),
            published,
            duration,
            writers: gateway.metrics(),
        }
    }

    /// Messages per second
    pub fn rate(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.published as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Records still queued when the gateway stopped
    pub fn unwritten(&self) -> usize {
        self.writers.iter().map(|(_, m)| m.queue_len).sum()
    }

    pub fn print_summary(&self) {
        println!("\n=== Log Gateway Statistics ({}) ===\n", self.gateway_id);

        println!("Overview");
        println!("   |- Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   |- Messages published: {}", self.published);
        println!("   |- Rate: {:.2}/s", self.rate());
        println!("   `- Unwritten at stop: {}", self.unwritten());

        for (name, metrics) in &self.writers {
            println!("\nWriter '{}'", name);
            println!("   |- Accepted: {}", metrics.accepted_count);
            println!(
                "   |- Filtered: {} ({} filter errors)",
                metrics.filtered_count, metrics.filter_error_count
            );
            println!(
                "   |- Flushes: {} submitted, {} completed, {} failed",
                metrics.flush_submitted_count,
                metrics.flush_completed_count,
                metrics.flush_failed_count
            );
            println!("   |- Queue length: {}", metrics.queue_len);
            println!("   `- Close failures: {}", metrics.close_failure_count);
        }

        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_and_unwritten() {
        let summary = RunSummary {
            gateway_id: "log".to_string(),
            published: 50,
            duration: Duration::from_secs(2),
            writers: vec![
                (
                    "a".to_string(),
                    MetricsSnapshot {
                        queue_len: 3,
                        ..Default::default()
                    },
                ),
                (
                    "b".to_string(),
                    MetricsSnapshot {
                        queue_len: 1,
                        ..Default::default()
                    },
                ),
            ],
        };

        assert_eq!(summary.rate(), 25.0);
        assert_eq!(summary.unwritten(), 4);
        assert_eq!(RunSummary::default().rate(), 0.0);
    }
}
