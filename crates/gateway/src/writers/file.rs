//! FileLogWriter - appends records to a text file
//!
//! One line per record: `timestamp\ttype\tmessage`. Tabs and line breaks
//! inside the type or the message are replaced by a single space so every
//! record stays on one line.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use chrono::SecondsFormat;
use contracts::{ContractError, LogQueue, LogRecord, LogWriter};
use tracing::{debug, error, instrument};

/// Configuration for FileLogWriter
#[derive(Debug, Clone)]
pub struct FileLogWriterConfig {
    /// Output file, opened in append mode
    pub path: PathBuf,
}

impl FileLogWriterConfig {
    /// Create config from params map
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, ContractError> {
        let path = params
            .get("path")
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .ok_or_else(|| ContractError::config_validation("params.path", "missing 'path'"))?;

        Ok(Self { path })
    }
}

/// Writer that appends records to a file
pub struct FileLogWriter {
    name: String,
    config: FileLogWriterConfig,
}

impl FileLogWriter {
    /// Create a new FileLogWriter
    pub fn new(name: impl Into<String>, config: FileLogWriterConfig) -> Self {
        Self {
            name: name.into(),
            config,
        }
    }

    /// Create from params map (for factory)
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> Result<Self, ContractError> {
        let config = FileLogWriterConfig::from_params(params)?;
        Ok(Self::new(name, config))
    }

    fn open_for_append(&self) -> io::Result<File> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.config.path)
    }

    /// Write queued records to `out`, then flush it
    ///
    /// A record whose write fails goes back to the head of the queue. If the
    /// final flush fails, the last record goes back.
    fn write_records<O: Write>(&self, out: &mut O, queue: &LogQueue) -> Result<usize, ContractError> {
        let mut written = 0;
        let mut last = None;
        while let Some(record) = queue.dequeue() {
            if let Err(e) = out.write_all(format_line(&record).as_bytes()) {
                queue.push_back(record);
                return Err(self.write_failed(written, e));
            }
            written += 1;
            last = Some(record);
        }

        if let Err(e) = out.flush() {
            if let Some(record) = last {
                queue.push_back(record);
                written -= 1;
            }
            return Err(self.write_failed(written, e));
        }
        Ok(written)
    }

    fn write_failed(&self, written: usize, e: io::Error) -> ContractError {
        error!(writer = %self.name, written, error = %e, "Write failed");
        ContractError::writer_write(
            &self.name,
            format!("writing to {} failed: {e}", self.config.path.display()),
        )
    }
}

/// Format one record as a log line (including the trailing newline)
pub(crate) fn format_line(record: &LogRecord) -> String {
    format!(
        "{}\t{}\t{}\n",
        record
            .received_at()
            .to_rfc3339_opts(SecondsFormat::Millis, true),
        sanitize(record.log_type()),
        sanitize(record.message())
    )
}

fn sanitize(value: &str) -> Cow<'_, str> {
    if value.contains(['\t', '\n', '\r']) {
        Cow::Owned(value.replace(['\t', '\n', '\r'], " "))
    } else {
        Cow::Borrowed(value)
    }
}

impl LogWriter for FileLogWriter {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "file_writer_open",
        skip(self),
        fields(writer = %self.name, path = %self.config.path.display())
    )]
    async fn open(&mut self) -> Result<(), ContractError> {
        if let Some(parent) = self.config.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|e| ContractError::writer_open(&self.name, e.to_string()))?;
            }
        }

        self.open_for_append()
            .map_err(|e| ContractError::writer_open(&self.name, e.to_string()))?;

        debug!(writer = %self.name, "FileLogWriter opened");
        Ok(())
    }

    #[instrument(name = "file_writer_drain", skip(self, queue), fields(writer = %self.name))]
    async fn drain(&mut self, queue: &LogQueue) -> Result<(), ContractError> {
        let file = self.open_for_append().map_err(|e| {
            ContractError::writer_write(
                &self.name,
                format!("opening {} failed: {e}", self.config.path.display()),
            )
        })?;

        let mut out = BufWriter::new(file);
        let written = self.write_records(&mut out, queue)?;
        debug!(writer = %self.name, written, "FileLogWriter drained");
        Ok(())
    }

    #[instrument(name = "file_writer_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        debug!(writer = %self.name, "FileLogWriter closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tempfile::tempdir;

    #[test]
    fn test_format_line_sanitizes_fields() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        let record = LogRecord::with_timestamp("sys\ttem", "line1\nline2\tend", ts);

        assert_eq!(
            format_line(&record),
            "2024-05-01T12:30:00.000Z\tsys tem\tline1 line2 end\n"
        );
    }

    #[test]
    fn test_from_params_requires_path() {
        assert!(FileLogWriterConfig::from_params(&HashMap::new()).is_err());

        let mut params = HashMap::new();
        params.insert("path".to_string(), "out/log.txt".to_string());
        let config = FileLogWriterConfig::from_params(&params).unwrap();
        assert_eq!(config.path, PathBuf::from("out/log.txt"));
    }

    #[tokio::test]
    async fn test_file_writer_appends() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("log.txt");
        let mut writer = FileLogWriter::new(
            "test_file",
            FileLogWriterConfig { path: path.clone() },
        );
        writer.open().await.unwrap();

        let queue = LogQueue::new();
        queue.enqueue(LogRecord::new("info", "first"));
        writer.drain(&queue).await.unwrap();
        queue.enqueue(LogRecord::new("warn", "second"));
        writer.drain(&queue).await.unwrap();
        writer.close().await.unwrap();

        assert!(queue.is_empty());
        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("\tinfo\tfirst"));
        assert!(lines[1].ends_with("\twarn\tsecond"));
    }

    /// Accepts `capacity` bytes, then fails every write or flush
    struct LimitedSink {
        data: Vec<u8>,
        capacity: usize,
        fail_flush: bool,
    }

    impl Write for LimitedSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let room = self.capacity.saturating_sub(self.data.len());
            if room == 0 {
                return Err(io::Error::other("disk full"));
            }
            let n = room.min(buf.len());
            self.data.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            if self.fail_flush {
                return Err(io::Error::other("flush failed"));
            }
            Ok(())
        }
    }

    fn queue_of(messages: &[&str]) -> LogQueue {
        let queue = LogQueue::new();
        for msg in messages {
            queue.enqueue(LogRecord::new("info", *msg));
        }
        queue
    }

    fn test_writer() -> FileLogWriter {
        FileLogWriter::new(
            "partial",
            FileLogWriterConfig {
                path: PathBuf::from("unused.log"),
            },
        )
    }

    #[test]
    fn test_write_failure_midway_pushes_back_current_record() {
        let queue = queue_of(&["a", "b", "c", "d"]);
        let line_len = format_line(&LogRecord::new("info", "a")).len();
        let mut sink = LimitedSink {
            data: Vec::new(),
            capacity: line_len * 2,
            fail_flush: false,
        };

        let result = test_writer().write_records(&mut sink, &queue);

        assert!(matches!(result, Err(ContractError::WriterWrite { .. })));
        assert_eq!(String::from_utf8(sink.data).unwrap().lines().count(), 2);
        let remaining: Vec<_> = std::iter::from_fn(|| queue.dequeue())
            .map(|r| r.message().to_string())
            .collect();
        assert_eq!(remaining, vec!["c", "d"]);
    }

    #[test]
    fn test_flush_failure_pushes_back_last_record() {
        let queue = queue_of(&["a", "b"]);
        let mut out = BufWriter::new(LimitedSink {
            data: Vec::new(),
            capacity: usize::MAX,
            fail_flush: true,
        });

        assert!(test_writer().write_records(&mut out, &queue).is_err());
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.dequeue().unwrap().message(), "b");
    }

    #[tokio::test]
    async fn test_drain_failure_keeps_records_queued() {
        let dir = tempdir().unwrap();
        // A directory cannot be opened for append
        let mut writer = FileLogWriter::new(
            "broken",
            FileLogWriterConfig {
                path: dir.path().to_path_buf(),
            },
        );

        let queue = LogQueue::new();
        queue.enqueue(LogRecord::new("info", "kept"));

        assert!(writer.drain(&queue).await.is_err());
        assert_eq!(queue.len(), 1);
        assert!(writer.open().await.is_err());
    }
}
