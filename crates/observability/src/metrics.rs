//! Log gateway 指标记录
//!
//! Prometheus counters/gauges/histograms for the handler flush cycle.
//! Without an installed recorder every call is a no-op.

use metrics::{counter, gauge, histogram};

/// 记录进入队列的日志
pub fn record_log_accepted(writer: &str) {
    counter!(
        "log_gateway_records_accepted_total",
        "writer" => writer.to_string()
    )
    .increment(1);
}

/// 记录被过滤器丢弃的日志
///
/// `error` marks drops caused by a failing filter rather than a rejection.
pub fn record_log_filtered(writer: &str, error: bool) {
    let reason = if error { "filter_error" } else { "rejected" };
    counter!(
        "log_gateway_records_filtered_total",
        "writer" => writer.to_string(),
        "reason" => reason
    )
    .increment(1);
}

/// 记录 flush 提交
pub fn record_flush_submitted(writer: &str, trigger: &'static str) {
    counter!(
        "log_gateway_flush_submitted_total",
        "writer" => writer.to_string(),
        "trigger" => trigger
    )
    .increment(1);
}

/// 记录 flush 结果与耗时
pub fn record_flush_result(writer: &str, success: bool, duration_ms: f64) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "log_gateway_flush_total",
        "writer" => writer.to_string(),
        "status" => status
    )
    .increment(1);
    histogram!(
        "log_gateway_flush_duration_ms",
        "writer" => writer.to_string()
    )
    .record(duration_ms);
}

/// 记录队列深度
pub fn record_queue_depth(writer: &str, depth: usize) {
    gauge!(
        "log_gateway_queue_depth",
        "writer" => writer.to_string()
    )
    .set(depth as f64);
}

/// 记录 writer 关闭失败
pub fn record_writer_close_failure(writer: &str) {
    counter!(
        "log_gateway_writer_close_failures_total",
        "writer" => writer.to_string()
    )
    .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_log_accepted("w");
        record_log_filtered("w", true);
        record_flush_submitted("w", "size");
        record_flush_result("w", false, 1.5);
        record_queue_depth("w", 3);
        record_writer_close_failure("w");
    }
}
