// Configuration module entry point
// Loads engine configuration from a file, the environment and defaults

mod types;

// Re-export public types
pub use types::{DeliveryConfig, EngineConfig, LoggingConfig};

impl EngineConfig {
    /// Load configuration from specified file path (without extension)
    ///
    /// A missing file is not an error. `DELIVERY_`-prefixed environment
    /// variables override file values, with `__` separating nested keys
    /// (`DELIVERY_DELIVERY__BUFFER_SIZE=4096`).
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("DELIVERY")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_default("logging.level", "info")?
            .set_default("logging.decision_log", false)?
            .set_default("logging.decision_log_format", "common")?
            .set_default("delivery.default_content_type", "text/plain")?
            .set_default("delivery.text_content_type", "text/plain; charset=utf-8")?
            .set_default("delivery.enable_range_processing", true)?
            .set_default("delivery.buffer_size", 65536)?
            .build()?;

        settings.try_deserialize()
    }

    /// Parse configuration from a TOML document; omitted keys take defaults
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Whether debug-level lines should be written
    pub fn is_debug(&self) -> bool {
        self.logging.level.eq_ignore_ascii_case("debug")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.delivery.default_content_type, "text/plain");
        assert_eq!(config.delivery.text_content_type, "text/plain; charset=utf-8");
        assert!(config.delivery.enable_range_processing);
        assert_eq!(config.delivery.buffer_size, 65536);
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.decision_log);
        assert_eq!(config.logging.decision_log_format, "common");
        assert!(config.content_types.is_empty());
        assert!(!config.is_debug());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let config = EngineConfig::load_from("does/not/exist/delivery").unwrap();
        assert_eq!(config.delivery, DeliveryConfig::default());
        assert_eq!(config.logging.decision_log_format, "common");
    }

    #[test]
    fn test_from_toml_partial() {
        let config = EngineConfig::from_toml_str(
            r#"
            [logging]
            level = "debug"
            decision_log = true
            decision_log_format = "json"

            [delivery]
            enable_range_processing = false
            buffer_size = 4096

            [content_types]
            log = "text/plain; charset=utf-8"
            "#,
        )
        .unwrap();

        assert!(config.is_debug());
        assert!(config.logging.decision_log);
        assert_eq!(config.logging.decision_log_format, "json");
        assert!(!config.delivery.enable_range_processing);
        assert_eq!(config.delivery.buffer_size, 4096);
        // Untouched keys keep their defaults
        assert_eq!(config.delivery.default_content_type, "text/plain");
        assert_eq!(
            config.content_types.get("log").map(String::as_str),
            Some("text/plain; charset=utf-8")
        );
    }

    #[test]
    fn test_from_toml_rejects_bad_types() {
        assert!(EngineConfig::from_toml_str("[delivery]\nbuffer_size = \"big\"").is_err());
    }
}
