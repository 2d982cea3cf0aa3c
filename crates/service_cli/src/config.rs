//! CLI configuration.
//!
//! Loaded from an optional TOML file (`stockfit.toml` by default). A missing
//! file gives the defaults; command-line flags override file values.

use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;
use stock_models::derivatives::DerivativeConfig;
use stock_models::models::ModelSelector;

use crate::{CliError, Result};

/// Log levels accepted in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl FromStr for LogLevel {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(CliError::Config(format!(
                "invalid log level {:?}, expected one of: trace, debug, info, warn, error",
                s
            ))),
        }
    }
}

impl LogLevel {
    /// Tracing filter directive for this level.
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

/// How command results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl FromStr for OutputFormat {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            other => Err(CliError::InvalidArgument(format!(
                "Unknown format: {}. Supported: json, table",
                other
            ))),
        }
    }
}

/// Settings read from `stockfit.toml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    /// Log level when `RUST_LOG` is unset and `--verbose` is off
    pub log_level: LogLevel,
    /// Model code used when neither `--model` nor the bundle names one
    pub default_model: Option<String>,
    /// Relative finite-difference step for gradient checks
    pub finite_difference_step: f64,
    /// Default output format
    pub output_format: OutputFormat,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            default_model: None,
            finite_difference_step: DerivativeConfig::default().step,
            output_format: OutputFormat::Table,
        }
    }
}

impl CliConfig {
    /// Parse a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    /// Parse TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: CliConfig = toml::from_str(content)
            .map_err(|e| CliError::Config(format!("failed to parse TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if it exists, otherwise return the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Check value ranges and that `default_model` names a supported model.
    pub fn validate(&self) -> Result<()> {
        if !(self.finite_difference_step.is_finite() && self.finite_difference_step > 0.0) {
            return Err(CliError::Config(format!(
                "finite_difference_step must be positive, got {}",
                self.finite_difference_step
            )));
        }
        if let Some(model) = &self.default_model {
            ModelSelector::strict(model)
                .map_err(|_| CliError::Config(format!("default_model {:?} is not a supported model", model)))?;
        }
        Ok(())
    }

    /// Derivative settings implied by this config.
    pub fn derivative_config(&self) -> DerivativeConfig {
        DerivativeConfig::default().with_step(self.finite_difference_step)
    }
}
