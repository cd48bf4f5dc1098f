// Configuration types module
// Defines the engine configuration data structures

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Main configuration structure
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct EngineConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub delivery: DeliveryConfig,
    /// Extension (without dot) to Content-Type, consulted before the built-in table
    #[serde(default)]
    pub content_types: HashMap<String, String>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Write one line per delivery decision
    #[serde(default)]
    pub decision_log: bool,
    /// Decision log format (common, json, or custom pattern)
    #[serde(default = "default_decision_log_format")]
    pub decision_log_format: String,
    /// Info/decision log file path (optional, stdout if not set)
    #[serde(default)]
    pub log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_log_level() -> String {
    "info".to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_decision_log_format() -> String {
    "common".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            decision_log: false,
            decision_log_format: default_decision_log_format(),
            log_file: None,
            error_log_file: None,
        }
    }
}

/// Delivery configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct DeliveryConfig {
    /// Content-Type for resources with no type of their own
    #[serde(default = "default_content_type")]
    pub default_content_type: String,
    /// Content-Type for text content with no type of its own
    #[serde(default = "default_text_content_type")]
    pub text_content_type: String,
    /// Honor Range requests unless a resource says otherwise
    #[serde(default = "default_enable_range_processing")]
    pub enable_range_processing: bool,
    /// Chunk size for streaming body copies
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
}

#[allow(clippy::missing_const_for_fn)]
fn default_content_type() -> String {
    "text/plain".to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_text_content_type() -> String {
    "text/plain; charset=utf-8".to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_enable_range_processing() -> bool {
    true
}

#[allow(clippy::missing_const_for_fn)]
fn default_buffer_size() -> usize {
    65536
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            default_content_type: default_content_type(),
            text_content_type: default_text_content_type(),
            enable_range_processing: default_enable_range_processing(),
            buffer_size: default_buffer_size(),
        }
    }
}
