/*!
Configuration management for the binary log parser.
*/

use anyhow::{Context, Result};
use neuromask_shared::protocol::DEFAULT_FLOAT_PRECISION;
use neuromask_shared::MissingFields;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub parser: ParserConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: AppConfig = toml::from_str(&content)
            .with_context(|| "Failed to parse config file as TOML")?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize config to TOML")?;

        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }
}

/// Parser specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Input .bin file, or a directory scanned for them
    pub input_directory: String,

    /// Output directory for .json files
    pub output_directory: String,

    /// Decimal places kept on sensor values
    pub float_precision: u32,

    /// How sensor fields absent from a record are written
    pub missing_fields: MissingFields,

    /// Extension of input files (matched case-insensitively)
    pub input_extension: String,

    /// Extension given to output files
    pub output_extension: String,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            input_directory: "./input".to_string(),
            output_directory: "./output".to_string(),
            float_precision: DEFAULT_FLOAT_PRECISION,
            missing_fields: MissingFields::Omit,
            input_extension: "bin".to_string(),
            output_extension: "json".to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Maximum level: error, warn, info, debug or trace
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_roundtrip() {
        let mut original_config = AppConfig::new();
        original_config.parser.float_precision = 6;
        original_config.parser.missing_fields = MissingFields::Null;

        let temp_file = NamedTempFile::new().unwrap();
        let temp_path = temp_file.path();

        // Save and load
        original_config.save_to_file(temp_path).unwrap();
        let loaded_config = AppConfig::load_from_file(temp_path).unwrap();

        // Compare (using debug format since we don't have PartialEq)
        assert_eq!(format!("{:?}", original_config), format!("{:?}", loaded_config));
    }

    #[test]
    fn test_default_values() {
        let config = AppConfig::new();

        assert_eq!(config.parser.input_directory, "./input");
        assert_eq!(config.parser.output_directory, "./output");
        assert_eq!(config.parser.float_precision, 3);
        assert_eq!(config.parser.missing_fields, MissingFields::Omit);
        assert_eq!(config.parser.input_extension, "bin");
        assert_eq!(config.parser.output_extension, "json");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [parser]
            float_precision = 6
            missing_fields = "null"
            "#,
        )
        .unwrap();

        assert_eq!(config.parser.float_precision, 6);
        assert_eq!(config.parser.missing_fields, MissingFields::Null);
        assert_eq!(config.parser.input_directory, "./input");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(AppConfig::load_from_file("/nonexistent/binparser.toml").is_err());
    }
}
