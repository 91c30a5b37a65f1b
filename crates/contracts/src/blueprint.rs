//! GatewayBlueprint - Config Loader output
//!
//! Describes the gateway id and every writer with its filter and flush policy.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::LoggingConfig;

/// Default gateway id, also the topic prefix stripped from published topics
pub const DEFAULT_GATEWAY_ID: &str = "log";

/// Complete gateway configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayBlueprint {
    /// Gateway id
    #[serde(default = "default_gateway_id")]
    pub gateway_id: String,

    /// Writers in registration order
    #[serde(default)]
    pub writers: Vec<WriterConfig>,
}

fn default_gateway_id() -> String {
    DEFAULT_GATEWAY_ID.to_string()
}

impl Default for GatewayBlueprint {
    fn default() -> Self {
        Self {
            gateway_id: default_gateway_id(),
            writers: Vec::new(),
        }
    }
}

/// One writer and its handler settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriterConfig {
    /// Writer name, unique within the gateway
    pub name: String,

    /// Writer type
    pub writer_type: WriterType,

    /// Flush policy
    #[serde(flatten)]
    pub logging: LoggingConfig,

    /// Type filter (absent = accept everything)
    #[serde(default)]
    pub filter: Option<FilterConfig>,

    /// Type-specific parameters
    #[serde(default)]
    pub params: HashMap<String, String>,
}

/// Writer type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriterType {
    /// Append-only text file
    File,
    /// Re-emit records as tracing events
    Tracing,
    /// Keep records in memory
    Memory,
}

/// Include/exclude lists over record types
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Accepted types; empty accepts all types
    #[serde(default)]
    pub include: Vec<String>,

    /// Rejected types; wins over `include`
    #[serde(default)]
    pub exclude: Vec<String>,
}
