//! Decision log format module
//!
//! Supports multiple log formats:
//! - `common` (Common Log Format style line)
//! - `json` (JSON structured logging)
//! - Custom patterns with variables

use chrono::Local;
use serde::Serialize;

/// One delivery decision, as written to the decision log
#[derive(Debug, Clone, Serialize)]
pub struct DecisionLogEntry {
    /// Decision timestamp
    pub time: chrono::DateTime<Local>,
    /// HTTP method (GET, HEAD, etc.)
    pub method: String,
    /// Request path, if the caller supplied one
    pub path: String,
    /// Response status code
    pub status: u16,
    /// Content-Type sent with the response
    pub content_type: Option<String>,
    /// Byte window served, both ends inclusive
    pub range: Option<(u64, u64)>,
    /// Response body size in bytes
    pub body_bytes: usize,
    /// Combined precondition state
    pub precondition: &'static str,
}

impl DecisionLogEntry {
    /// Create a new entry with current timestamp
    pub fn new(method: String, path: String) -> Self {
        Self {
            time: Local::now(),
            method,
            path,
            status: 200,
            content_type: None,
            range: None,
            body_bytes: 0,
            precondition: "unspecified",
        }
    }

    /// Format the log entry according to the specified format
    pub fn format(&self, format: &str) -> String {
        match format {
            "common" => self.format_common(),
            "json" => self.format_json(),
            custom => self.format_custom(custom),
        }
    }

    fn range_str(&self) -> String {
        self.range
            .map_or_else(|| "-".to_string(), |(from, to)| format!("{from}-{to}"))
    }

    /// `[$time_local] "$request_method $path" $status $body_bytes_sent $range`
    fn format_common(&self) -> String {
        format!(
            "[{}] \"{} {}\" {} {} {}",
            self.time.format("%d/%b/%Y:%H:%M:%S %z"),
            self.method,
            self.path,
            self.status,
            self.body_bytes,
            self.range_str(),
        )
    }

    fn format_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| format!(r#"{{"error":"{e}"}}"#))
    }

    /// Custom format with variable substitution
    ///
    /// Supported variables:
    /// - `$time_local` - Local time in Common Log Format
    /// - `$time_iso8601` - ISO 8601 timestamp
    /// - `$request_method` - HTTP method
    /// - `$path` - Request path
    /// - `$status` - Response status code
    /// - `$body_bytes_sent` - Response body size
    /// - `$content_type` - Response Content-Type
    /// - `$range` - Served byte window (`from-to`)
    /// - `$precondition` - Precondition state
    fn format_custom(&self, pattern: &str) -> String {
        let mut result = pattern.to_string();

        result = result.replace(
            "$time_local",
            &self.time.format("%d/%b/%Y:%H:%M:%S %z").to_string(),
        );
        result = result.replace("$time_iso8601", &self.time.to_rfc3339());
        result = result.replace("$request_method", &self.method);
        result = result.replace("$path", &self.path);
        result = result.replace("$status", &self.status.to_string());
        result = result.replace("$body_bytes_sent", &self.body_bytes.to_string());
        result = result.replace("$content_type", self.content_type.as_deref().unwrap_or("-"));
        result = result.replace("$range", &self.range_str());
        result = result.replace("$precondition", self.precondition);

        result
    }
}
