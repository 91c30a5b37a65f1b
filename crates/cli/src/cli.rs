//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Log Gateway - asynchronous, batched log writing
#[derive(Parser, Debug)]
#[command(
    name = "log-gateway",
    author,
    version,
    about = "Asynchronous log gateway",
    long_about = "Collects log records published on a topic bus, queues them per writer \n\
                  and flushes them in batches to files or to the tracing output.\n\n\
                  The `run` command reads `<type> <message>` lines from stdin."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "LOG_GATEWAY_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "LOG_GATEWAY_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Default level for the tracing filter (RUST_LOG takes precedence)
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            return "warn";
        }
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the gateway, publishing stdin lines as log records
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "gateway.toml",
        env = "LOG_GATEWAY_CONFIG"
    )]
    pub config: PathBuf,

    /// Prometheus metrics port (disabled when absent)
    #[arg(long, env = "LOG_GATEWAY_METRICS_PORT")]
    pub metrics_port: Option<u16>,

    /// Channel buffer size between stdin and the gateway
    #[arg(long, default_value = "1024", env = "LOG_GATEWAY_BUFFER_SIZE")]
    pub buffer_size: usize,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "gateway.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run() {
        let cli = Cli::try_parse_from([
            "log-gateway",
            "-vv",
            "run",
            "--config",
            "gw.toml",
            "--metrics-port",
            "9100",
        ])
        .unwrap();

        assert_eq!(cli.log_level(), "trace");
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.config, PathBuf::from("gw.toml"));
                assert_eq!(args.metrics_port, Some(9100));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["log-gateway", "-q", "-v", "validate"]).is_err());

        let cli = Cli::try_parse_from(["log-gateway", "-q", "validate", "--json"]).unwrap();
        assert_eq!(cli.log_level(), "warn");
    }
}
