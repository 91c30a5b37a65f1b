//! Gateway error types

use thiserror::Error;

/// Gateway-specific errors
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Registration or start attempted after the gateway was started
    #[error("gateway '{gateway}' is already started")]
    AlreadyStarted { gateway: String },

    /// Dispatch or stop attempted while the gateway is not running
    #[error("gateway '{gateway}' is not running")]
    NotRunning { gateway: String },

    /// Writer name registered twice
    #[error("writer '{name}' is already registered")]
    DuplicateWriter { name: String },

    /// Topic cannot be mapped to a record
    #[error("invalid topic '{topic}'")]
    InvalidTopic { topic: String },

    /// Writer failed to open during start
    #[error("failed to open writer '{name}': {source}")]
    WriterOpen {
        name: String,
        #[source]
        source: contracts::ContractError,
    },

    /// Writer could not be built from configuration
    #[error("failed to create writer '{name}': {message}")]
    WriterCreation { name: String, message: String },

    /// No tokio runtime to act as worker pool
    #[error("no tokio runtime available for the worker pool")]
    NoRuntime,

    /// Contract error
    #[error("contract error: {0}")]
    Contract(#[from] contracts::ContractError),
}

impl GatewayError {
    /// Create a writer creation error
    pub fn writer_creation(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::WriterCreation {
            name: name.into(),
            message: message.into(),
        }
    }
}
