//! `run` command implementation.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use contracts::BusMessage;
use gateway::{build_gateway, WorkerPool};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::cli::RunArgs;
use crate::summary::RunSummary;

/// Execute the `run` command
pub async fn run_gateway(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    info!(
        gateway = %blueprint.gateway_id,
        writers = blueprint.writers.len(),
        "Configuration loaded"
    );

    let gateway = Arc::new(build_gateway(&blueprint).context("Failed to build gateway")?);
    let pool = WorkerPool::current().context("No tokio runtime for the worker pool")?;
    gateway
        .start(pool)
        .await
        .context("Failed to start gateway")?;

    let start_time = Instant::now();
    let (tx, rx) = mpsc::channel(args.buffer_size.max(1));
    let subscription = gateway.spawn(rx);

    let shutdown_signal = setup_shutdown_signal();
    let stdin = BufReader::new(tokio::io::stdin());

    let mut published = 0u64;
    tokio::select! {
        result = forward_lines(stdin, gateway.id(), &tx, &mut published) => {
            result.context("Failed to read stdin")?;
            info!(published, "Input exhausted, stopping gateway");
        }
        _ = shutdown_signal => {
            warn!(published, "Received shutdown signal, stopping gateway...");
        }
    }

    // Closing the channel ends the subscription once it has drained
    drop(tx);
    if let Err(e) = subscription.await {
        warn!(error = %e, "Gateway subscription task failed");
    }

    gateway.stop().await.context("Failed to stop gateway")?;

    RunSummary::collect(&gateway, published, start_time.elapsed()).print_summary();

    info!("Log Gateway finished");
    Ok(())
}

/// Forward `<type> <message>` lines to the bus until EOF
///
/// `sent` counts the messages handed to the bus.
async fn forward_lines<R>(
    reader: R,
    gateway_id: &str,
    tx: &mpsc::Sender<BusMessage>,
    sent: &mut u64,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        let Some(message) = parse_line(gateway_id, &line) else {
            continue;
        };

        if tx.send(message).await.is_err() {
            warn!("Gateway subscription closed, ignoring remaining input");
            break;
        }
        *sent += 1;
    }

    debug!(sent = *sent, "Stdin forwarding finished");
    Ok(())
}

/// Map an input line to a bus message on `<gateway id>/<type>`
///
/// Blank lines are skipped; a line without a space is a record type with
/// an empty message.
fn parse_line(gateway_id: &str, line: &str) -> Option<BusMessage> {
    let line = line.trim_end_matches('\r');
    if line.trim().is_empty() {
        return None;
    }

    let (log_type, message) = line.split_once(' ').unwrap_or((line, ""));
    Some(BusMessage::new(format!("{gateway_id}/{log_type}"), message))
}

/// Setup Ctrl+C and SIGTERM signal handlers
async fn setup_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line() {
        let message = parse_line("log", "error disk full").unwrap();
        assert_eq!(message.topic, "log/error");
        assert_eq!(message.payload, "disk full");

        let message = parse_line("log", "heartbeat").unwrap();
        assert_eq!(message.topic, "log/heartbeat");
        assert_eq!(message.payload, "");

        assert!(parse_line("log", "   ").is_none());
    }

    #[tokio::test]
    async fn test_forward_lines_until_eof() {
        let input: &[u8] = b"info started\n\nwarn low memory\r\n";
        let (tx, mut rx) = mpsc::channel(8);

        let mut sent = 0;
        forward_lines(input, "plant", &tx, &mut sent).await.unwrap();
        assert_eq!(sent, 2);

        drop(tx);
        let mut topics = Vec::new();
        while let Some(message) = rx.recv().await {
            topics.push((message.topic, message.payload));
        }
        assert_eq!(
            topics,
            vec![
                ("plant/info".to_string(), "started".to_string()),
                ("plant/warn".to_string(), "low memory".to_string()),
            ]
        );
    }
}
