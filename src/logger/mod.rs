//! Logger module
//!
//! Provides logging utilities for the delivery engine including:
//! - Decision logging with multiple formats
//! - Error, warning and debug logging
//! - File-based logging support
//!
//! Lines written before `init` go to stdout/stderr; debug lines are dropped
//! until a writer with level `debug` is installed.

mod format;
pub mod writer;

pub use format::DecisionLogEntry;

use crate::config::{EngineConfig, LoggingConfig};

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &LoggingConfig) -> std::io::Result<()> {
    writer::init(
        &config.level,
        config.log_file.as_deref(),
        config.error_log_file.as_deref(),
    )
}

/// Write to info log
fn write_info(message: &str) {
    match writer::get() {
        Some(writer) => writer.write_info(message),
        None => println!("{message}"),
    }
}

/// Write to error log
fn write_error(message: &str) {
    match writer::get() {
        Some(writer) => writer.write_error(message),
        None => eprintln!("{message}"),
    }
}

fn debug_enabled() -> bool {
    writer::get().is_some_and(writer::LogWriter::is_debug)
}

pub fn log_engine_config(config: &EngineConfig) {
    if !debug_enabled() {
        return;
    }
    write_info("[CONFIG] Delivery engine configuration:");
    write_info(&format!(
        "  - Default content type: {}",
        config.delivery.default_content_type
    ));
    write_info(&format!(
        "  - Text content type: {}",
        config.delivery.text_content_type
    ));
    write_info(&format!(
        "  - Range processing: {}",
        config.delivery.enable_range_processing
    ));
    write_info(&format!("  - Buffer size: {} bytes", config.delivery.buffer_size));
    write_info(&format!(
        "  - Content type overrides: {}",
        config.content_types.len()
    ));
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(&format!("[WARN] {message}"));
}

pub fn log_debug(message: &str) {
    if debug_enabled() {
        write_info(&format!("[DEBUG] {message}"));
    }
}

/// Log formatted decision entry
pub fn log_decision(entry: &DecisionLogEntry, format: &str) {
    write_info(&entry.format(format));
}
