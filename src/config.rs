//! Production configuration system
//!
//! Provides centralized configuration management with:
//! - Environment variable support
//! - Config file loading (optional)
//! - Runtime defaults
//! - Validation and type safety

use crate::upgrades::NOTABLE_UPGRADE_VERSIONS;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging configuration
    pub logging: LoggingConfig,

    /// Output configuration
    pub output: OutputConfig,

    /// Methodology-changing upgrades
    pub upgrades: UpgradesConfig,

    /// Paths configuration
    pub paths: PathsConfig,

    /// File the configuration was read from, if any
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub output: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub json_pretty: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpgradesConfig {
    /// Version prefixes in release order, e.g. `1.9`, `1.10`
    pub notable_versions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub log_directory: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "WARN".to_string(),
            format: "pretty".to_string(),
            output: "console".to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { json_pretty: true }
    }
}

impl Default for UpgradesConfig {
    fn default() -> Self {
        Self {
            notable_versions: NOTABLE_UPGRADE_VERSIONS.iter().map(|v| v.to_string()).collect(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            log_directory: PathBuf::from("logs"),
        }
    }
}

const LOG_LEVELS: [&str; 5] = ["TRACE", "DEBUG", "INFO", "WARN", "ERROR"];
const LOG_FORMATS: [&str; 2] = ["pretty", "json"];
const LOG_OUTPUTS: [&str; 3] = ["console", "file", "both"];

impl Config {
    /// Load configuration from environment, file, and defaults
    pub fn load() -> Result<Self> {
        let mut config = Config::default();

        // Try to load from config file if it exists
        let config_paths = [
            PathBuf::from("client-count.toml"),
            PathBuf::from(".client-count.toml"),
            dirs::config_dir()
                .map(|d| d.join("client-count").join("config.toml"))
                .unwrap_or_default(),
        ];

        // Logging is not initialized yet; callers report `source` once it is
        if let Some(path) = config_paths.iter().find(|path| path.is_file()) {
            config = Self::load_from_file(path)?;
        }

        // Override with environment variables
        config.apply_env_overrides()?;

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.source = Some(path.to_path_buf());

        Ok(config)
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        // Logging overrides
        if let Ok(val) = env::var("LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = env::var("LOG_FORMAT") {
            self.logging.format = val;
        }
        if let Ok(val) = env::var("LOG_OUTPUT") {
            self.logging.output = val;
        }

        // Output overrides
        if let Ok(val) = env::var("CLIENT_COUNT_JSON_PRETTY") {
            self.output.json_pretty = val.parse()
                .context("Invalid CLIENT_COUNT_JSON_PRETTY")?;
        }

        // Upgrade list override, comma-separated
        if let Ok(val) = env::var("CLIENT_COUNT_NOTABLE_VERSIONS") {
            self.upgrades.notable_versions = val
                .split(',')
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .collect();
        }

        // Path overrides
        if let Ok(val) = env::var("CLIENT_COUNT_LOG_DIR") {
            self.paths.log_directory = PathBuf::from(val);
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if !LOG_LEVELS.contains(&self.logging.level.to_ascii_uppercase().as_str()) {
            return Err(anyhow::anyhow!(
                "Log level must be one of {:?}, got {}",
                LOG_LEVELS,
                self.logging.level
            ));
        }

        if !LOG_FORMATS.contains(&self.logging.format.as_str()) {
            return Err(anyhow::anyhow!("Unknown log format: {}", self.logging.format));
        }

        if !LOG_OUTPUTS.contains(&self.logging.output.as_str()) {
            return Err(anyhow::anyhow!("Unknown log output: {}", self.logging.output));
        }

        if self.upgrades.notable_versions.is_empty() {
            warn!("No notable upgrade versions configured, upgrade warnings are disabled");
        }

        for version in &self.upgrades.notable_versions {
            let well_formed = !version.is_empty()
                && version
                    .split('.')
                    .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()));
            if !well_formed {
                return Err(anyhow::anyhow!("Invalid notable version prefix: {}", version));
            }
        }

        // File logging needs its directory
        if self.logging.output != "console" && !self.paths.log_directory.exists() {
            fs::create_dir_all(&self.paths.log_directory)
                .context("Failed to create log directory")?;
        }

        Ok(())
    }

    /// Save current configuration to file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .context("Failed to serialize configuration")?;

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        info!(path = %path.display(), "Configuration saved to file");

        Ok(())
    }
}
