//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约快照测试
//! - 配置 -> 网关 -> writer 的端到端测试
//! - 批量写入与失败恢复场景

#[cfg(test)]
mod contract_tests {
    use contracts::{LogQueue, LogRecord};

    #[test]
    fn test_default_blueprint() {
        let blueprint = contracts::GatewayBlueprint::default();
        assert_eq!(blueprint.gateway_id, contracts::DEFAULT_GATEWAY_ID);
        assert!(blueprint.writers.is_empty());
    }

    #[test]
    fn test_push_back_is_dequeued_first() {
        let queue = LogQueue::new();
        queue.enqueue(LogRecord::new("info", "later"));
        queue.push_back(LogRecord::new("info", "retry"));

        assert_eq!(queue.dequeue().unwrap().message(), "retry");
        assert_eq!(queue.dequeue().unwrap().message(), "later");
        assert!(queue.dequeue().is_none());
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;

    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{BusMessage, LogFilter, LogRecord, LoggingConfig};
    use gateway::{build_gateway, LogGateway, LogHandler, MemoryLogWriter, TypeFilter, WorkerPool};
    use tokio::sync::mpsc;
    use tokio::time::{sleep, timeout};

    async fn wait_until<F: Fn() -> bool>(condition: F) {
        timeout(Duration::from_secs(2), async {
            while !condition() {
                sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("condition not reached in time");
    }

    /// Threshold flush: with max_unwritten_logs = 2 the third record
    /// triggers the only flush and the writer sees all three in order.
    #[tokio::test]
    async fn test_e2e_threshold_batch() {
        let pool = WorkerPool::current().unwrap();
        let writer = MemoryLogWriter::new("batch");
        let accept_all: Arc<dyn LogFilter> = Arc::new(|_: &str| true);
        let handler = LogHandler::new(
            writer.clone(),
            Some(accept_all),
            LoggingConfig::new(2, 0),
        );

        handler.accept(&LogRecord::new("info", "A"), &pool);
        handler.accept(&LogRecord::new("info", "B"), &pool);
        assert_eq!(handler.queue().len(), 2);
        assert!(!handler.is_flushing());
        assert_eq!(handler.metrics().flush_submitted_count(), 0);

        handler.accept(&LogRecord::new("info", "C"), &pool);
        assert_eq!(handler.metrics().flush_submitted_count(), 1);

        wait_until(|| writer.messages().len() == 3 && !handler.is_flushing()).await;
        assert_eq!(writer.messages(), vec!["A", "B", "C"]);
        assert!(handler.queue().is_empty());
        assert!(!handler.is_flushing());
    }

    /// Failed drain: the record is pushed back and written by the next check
    #[tokio::test]
    async fn test_e2e_failed_drain_recovers() {
        let pool = WorkerPool::current().unwrap();
        let writer = MemoryLogWriter::new("flaky");
        writer.fail_next_drain_after(0);
        let handler = LogHandler::new(writer.clone(), None, LoggingConfig::new(0, 0));

        handler.accept(&LogRecord::new("error", "kept"), &pool);
        wait_until(|| handler.metrics().flush_failed_count() == 1 && !handler.is_flushing())
            .await;
        assert_eq!(handler.queue().len(), 1);
        assert!(writer.messages().is_empty());

        handler.check(&pool);
        wait_until(|| writer.messages().len() == 1).await;
        assert_eq!(writer.messages(), vec!["kept"]);
        assert!(handler.queue().is_empty());
    }

    /// Filtering across writers: debug records only reach the unfiltered one
    #[tokio::test]
    async fn test_e2e_filter_per_writer() {
        let everything = MemoryLogWriter::new("everything");
        let no_debug = MemoryLogWriter::new("no_debug");

        let gateway = LogGateway::with_id("plant");
        gateway
            .register(everything.clone(), LoggingConfig::new(0, 0))
            .unwrap();
        gateway
            .register_writer(
                no_debug.clone(),
                Some(Arc::new(TypeFilter::excluding(["debug"])) as Arc<dyn LogFilter>),
                LoggingConfig::new(0, 0),
            )
            .unwrap();
        gateway.start(WorkerPool::current().unwrap()).await.unwrap();

        gateway.publish("plant/debug", "noise").unwrap();
        gateway.publish("plant/info", "signal").unwrap();

        wait_until(|| everything.messages().len() == 2 && no_debug.messages().len() == 1).await;
        assert_eq!(everything.messages(), vec!["noise", "signal"]);
        assert_eq!(no_debug.messages(), vec!["signal"]);

        gateway.stop().await.unwrap();
        let metrics: HashMap<_, _> = gateway.metrics().into_iter().collect();
        assert_eq!(metrics["no_debug"].filtered_count, 1);
        assert_eq!(metrics["everything"].accepted_count, 2);
    }

    /// Config file -> gateway -> file writer, fed over the bus
    #[tokio::test]
    async fn test_e2e_config_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("plant.log");
        let config = format!(
            r#"
gateway_id = "plant"

[[writers]]
name = "archive"
writer_type = "file"
max_unwritten_logs = 1
write_period_secs = 0
[writers.filter]
exclude = ["debug"]
[writers.params]
path = "{}"
"#,
            path.display().to_string().replace('\\', "\\\\")
        );

        let blueprint = ConfigLoader::load_from_str(&config, ConfigFormat::Toml).unwrap();
        let gateway = Arc::new(build_gateway(&blueprint).unwrap());
        gateway.start(WorkerPool::current().unwrap()).await.unwrap();

        let (tx, rx) = mpsc::channel(16);
        let subscription = gateway.spawn(rx);
        for (log_type, message) in [("info", "one"), ("debug", "skip"), ("warn", "two")] {
            tx.send(BusMessage::new(format!("plant/{log_type}"), message))
                .await
                .unwrap();
        }
        drop(tx);
        subscription.await.unwrap();

        let read_lines = || {
            std::fs::read_to_string(&path)
                .map(|content| content.lines().map(str::to_string).collect::<Vec<_>>())
                .unwrap_or_default()
        };
        wait_until(|| read_lines().len() == 2 && gateway.is_flushing("archive") == Some(false))
            .await;
        gateway.stop().await.unwrap();

        let lines = read_lines();
        assert!(lines[0].ends_with("\tinfo\tone"), "line: {}", lines[0]);
        assert!(lines[1].ends_with("\twarn\ttwo"), "line: {}", lines[1]);
        assert_eq!(gateway.queue_len("archive"), Some(0));
    }
}
