//! Configuration management for nsrl-extract
//!
//! This module handles loading and validating configuration from:
//! - A configuration file (TOML format)
//! - Command-line arguments (applied by the `cli` module)
//!
//! Configuration precedence (highest to lowest):
//! 1. Command-line arguments
//! 2. Configuration file
//! 3. Default values

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Default table and field
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Export pipeline configuration
    #[serde(default)]
    pub export: ExportConfig,

    /// Display configuration
    #[serde(default)]
    pub display: DisplayConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Table and field used when none is given
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DefaultsConfig {
    /// Table to read
    #[serde(default = "default_table")]
    pub table: String,

    /// Field to read
    #[serde(default = "default_field")]
    pub field: String,
}

/// Export pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportConfig {
    /// Values pulled from the database per batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Output buffer capacity in bytes
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,

    /// Text written for NULL values
    #[serde(default)]
    pub null_text: String,
}

/// Display and output configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DisplayConfig {
    /// Show a progress bar while exporting
    #[serde(default = "default_progress")]
    pub progress: bool,

    /// Count the rows first so the bar shows a total (one extra table scan)
    #[serde(default)]
    pub count_rows: bool,

    /// Enable colored messages in interactive mode
    #[serde(default = "default_color_output")]
    pub color_output: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    /// Enable timestamps in logs
    #[serde(default)]
    pub timestamps: bool,
}

/// Log level options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

// Default value functions
fn default_table() -> String {
    "FILE".to_string()
}

fn default_field() -> String {
    "md5".to_string()
}

fn default_batch_size() -> usize {
    1000
}

fn default_buffer_size() -> usize {
    64 * 1024
}

fn default_progress() -> bool {
    true
}

fn default_color_output() -> bool {
    true
}

fn default_log_level() -> LogLevel {
    LogLevel::Warn
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            table: default_table(),
            field: default_field(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            buffer_size: default_buffer_size(),
            null_text: String::new(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            progress: default_progress(),
            count_rows: false,
            color_output: default_color_output(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            timestamps: false,
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the default configuration file path
    ///
    /// # Returns
    /// * `PathBuf` - `~/.nsrl-extract/config.toml`
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".nsrl-extract")
            .join("config.toml")
    }

    /// Load configuration from a file
    ///
    /// With `None`, the default path is used and a missing file yields the
    /// default configuration. An explicitly given path must exist.
    ///
    /// # Arguments
    /// * `path` - Optional path to the configuration file (TOML format)
    ///
    /// # Returns
    /// * `Result<Config>` - Loaded configuration or error
    pub fn load_from_file(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (Self::default_config_path(), false),
        };

        if !path.exists() {
            if explicit {
                return Err(ConfigError::FileNotFound(path.display().to_string()).into());
            }
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Validate the configuration
    ///
    /// # Returns
    /// * `Result<()>` - Ok if valid, error otherwise
    pub fn validate(&self) -> Result<()> {
        if self.export.batch_size == 0 {
            return Err(invalid("export.batch_size", "0"));
        }
        if self.export.buffer_size == 0 {
            return Err(invalid("export.buffer_size", "0"));
        }
        if self.defaults.table.is_empty() {
            return Err(invalid("defaults.table", ""));
        }
        if self.defaults.field.is_empty() {
            return Err(invalid("defaults.field", ""));
        }
        Ok(())
    }

    /// Render the configuration as TOML with a leading comment
    pub fn to_toml_with_comments(&self) -> Result<String> {
        let body = toml::to_string_pretty(self)?;
        Ok(format!(
            "# nsrl-extract configuration\n# Location: {}\n\n{}",
            Self::default_config_path().display(),
            body
        ))
    }
}

fn invalid(field: &str, value: &str) -> crate::error::ExtractorError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
    }
    .into()
}

impl LogLevel {
    /// Convert to tracing::Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}
