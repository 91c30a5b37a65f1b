//! Layered error definitions
//!
//! Categorized by source: config / writer / filter

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Writer Errors =====
    /// Writer open error
    #[error("writer '{writer}' open error: {message}")]
    WriterOpen { writer: String, message: String },

    /// Writer persist error
    #[error("writer '{writer}' write error: {message}")]
    WriterWrite { writer: String, message: String },

    /// Writer close error
    #[error("writer '{writer}' close error: {message}")]
    WriterClose { writer: String, message: String },

    // ===== Filter Errors =====
    /// Filter evaluation error
    #[error("filter error for type '{log_type}': {message}")]
    Filter { log_type: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create writer open error
    pub fn writer_open(writer: impl Into<String>, message: impl Into<String>) -> Self {
        Self::WriterOpen {
            writer: writer.into(),
            message: message.into(),
        }
    }

    /// Create writer write error
    pub fn writer_write(writer: impl Into<String>, message: impl Into<String>) -> Self {
        Self::WriterWrite {
            writer: writer.into(),
            message: message.into(),
        }
    }

    /// Create writer close error
    pub fn writer_close(writer: impl Into<String>, message: impl Into<String>) -> Self {
        Self::WriterClose {
            writer: writer.into(),
            message: message.into(),
        }
    }

    /// Create filter error
    pub fn filter(log_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Filter {
            log_type: log_type.into(),
            message: message.into(),
        }
    }
}
