//! Configuration types and loading.
//!
//! The config file lives at `~/.finlens/config.json`. Every section is
//! optional; a missing file yields the defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Get the configuration directory.
pub fn config_dir() -> PathBuf {
    directories::UserDirs::new().map_or_else(
        || PathBuf::from(".finlens"),
        |dirs| dirs.home_dir().join(".finlens"),
    )
}

/// Get the configuration file path.
pub fn config_path() -> PathBuf {
    config_dir().join("config.json")
}

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Logging configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Pipeline parameters
    #[serde(default)]
    pub analysis: AnalysisSettings,
}

impl Config {
    /// Load configuration from the default path.
    pub fn load() -> Result<Self> {
        let path = config_path();
        if !path.exists() {
            tracing::info!("Config file not found, using defaults");
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// Load configuration with environment variable overrides.
    pub fn load_with_env() -> Result<Self> {
        let mut config = Self::load()?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(level) = std::env::var("FINLENS_LOG_LEVEL") {
            self.observability.log_level = level;
        }
        if let Ok(format) = std::env::var("FINLENS_LOG_FORMAT") {
            self.observability.log_format = format;
        }
        if let Ok(rate) = std::env::var("FINLENS_TAX_RATE") {
            match rate.parse() {
                Ok(r) => self.analysis.default_tax_rate = Some(r),
                Err(_) => tracing::warn!(value = %rate, "Ignoring unparsable FINLENS_TAX_RATE"),
            }
        }
        if let Ok(wacc) = std::env::var("FINLENS_WACC") {
            match wacc.parse() {
                Ok(w) => self.analysis.default_wacc = Some(w),
                Err(_) => tracing::warn!(value = %wacc, "Ignoring unparsable FINLENS_WACC"),
            }
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level", alias = "level")]
    pub log_level: String,

    /// Log format (json, pretty)
    #[serde(default = "default_log_format", alias = "format")]
    pub log_format: String,

    /// Additional module targets to quiet down to `warn`.
    #[serde(default)]
    pub excluded_targets: Vec<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
            excluded_targets: Vec::new(),
        }
    }
}

/// Pipeline parameters as read from the config file.
///
/// Every field is optional; the analysis crate fills the gaps with its
/// documented defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisSettings {
    /// Tax rate used for NOPAT when no effective rate can be derived (0-1)
    #[serde(default)]
    pub default_tax_rate: Option<f64>,

    /// Cost of capital used for the bundled EVA figure (0-1)
    #[serde(default)]
    pub default_wacc: Option<f64>,

    /// Share of current assets used as a receivables proxy (0-1)
    #[serde(default)]
    pub receivables_proxy_share: Option<f64>,

    /// Share of current assets used as a payables proxy (0-1)
    #[serde(default)]
    pub payables_proxy_share: Option<f64>,

    /// M-Score reported when the prior year is unusable
    #[serde(default)]
    pub m_score_placeholder: Option<f64>,
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "pretty".into()
}
