//! Configuration file support for the Perkons CLI.
//!
//! Supports both YAML and TOML configuration files.
//!
//! # Example YAML configuration:
//! ```yaml
//! # Perkons configuration file
//!
//! # Submission settings
//! submit:
//!   host: "http://www.my-pipeline-ui.com:80"
//!   run_name: "paddle ocr detection demo"
//!   service_account: "pipeline-runner"
//!
//! # Artifact settings
//! compile:
//!   output: ppocr_detection_demo.yaml
//!
//! # Logging settings
//! logging:
//!   level: info
//!   timestamps: true
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    IoError(PathBuf, String),

    #[error("Failed to parse config: {0}")]
    ParseError(String),
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Submission configuration
    pub submit: SubmitConfig,

    /// Artifact output configuration
    pub compile: CompileConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Submission configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SubmitConfig {
    /// Pipeline service endpoint
    pub host: Option<String>,

    /// Name runs are created under
    pub run_name: Option<String>,

    /// Service account runs execute as
    pub service_account: Option<String>,
}

/// Artifact output configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CompileConfig {
    /// Path the workflow artifact is written to
    pub output: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Include timestamps
    pub timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            timestamps: true,
        }
    }
}

impl LoggingConfig {
    /// Map the configured level to a tracing level. Unknown values fall
    /// back to INFO.
    pub fn tracing_level(&self) -> tracing::Level {
        match self.level.to_lowercase().as_str() {
            "trace" => tracing::Level::TRACE,
            "debug" => tracing::Level::DEBUG,
            "warn" => tracing::Level::WARN,
            "error" => tracing::Level::ERROR,
            _ => tracing::Level::INFO,
        }
    }
}

impl Config {
    /// Load configuration from a file (YAML or TOML, auto-detected by extension)
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(path.to_path_buf(), e.to_string()))?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "yaml" | "yml" => Self::from_yaml(&content),
            "toml" => Self::from_toml(&content),
            _ => {
                // Try YAML first, then TOML
                Self::from_yaml(&content).or_else(|_| Self::from_toml(&content))
            }
        }
    }

    /// Parse configuration from YAML string
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Parse configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Merge another config into this one (other values take precedence if set)
    pub fn merge(&mut self, other: Config) {
        // Merge submit config
        if other.submit.host.is_some() {
            self.submit.host = other.submit.host;
        }
        if other.submit.run_name.is_some() {
            self.submit.run_name = other.submit.run_name;
        }
        if other.submit.service_account.is_some() {
            self.submit.service_account = other.submit.service_account;
        }

        // Merge compile config
        if other.compile.output.is_some() {
            self.compile.output = other.compile.output;
        }

        // Merge logging config
        if other.logging.level != LoggingConfig::default().level {
            self.logging.level = other.logging.level;
        }
        if other.logging.timestamps != LoggingConfig::default().timestamps {
            self.logging.timestamps = other.logging.timestamps;
        }
    }

    /// Create an example configuration
    pub fn example() -> Self {
        Self {
            submit: SubmitConfig {
                host: Some("http://www.my-pipeline-ui.com:80".to_string()),
                run_name: Some("paddle ocr detection demo".to_string()),
                service_account: Some("pipeline-runner".to_string()),
            },
            compile: CompileConfig {
                output: Some(PathBuf::from("ppocr_detection_demo.yaml")),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                timestamps: true,
            },
        }
    }

    /// Generate example YAML configuration
    pub fn example_yaml() -> String {
        serde_yaml::to_string(&Self::example()).unwrap_or_default()
    }

    /// Generate example TOML configuration
    pub fn example_toml() -> String {
        toml::to_string_pretty(&Self::example()).unwrap_or_default()
    }
}
