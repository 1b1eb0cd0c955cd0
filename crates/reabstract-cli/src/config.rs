//! Configuration loading from TOML files

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use reabstract_openalex::OutputFormat;
use reabstract_openalex::config::DEFAULT_CHUNK_SIZE;
use reabstract_openalex::record::{DEFAULT_ID_FIELD, DEFAULT_PAYLOAD_FIELD};

/// Global configuration for reabstract
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub batch: BatchConfig,
    pub workers: WorkersConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub payload_field: String,
    /// Empty string disables the id column
    pub id_field: String,
    pub format: OutputFormat,
    pub chunk_size: usize,
    pub fail_fast: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            payload_field: DEFAULT_PAYLOAD_FIELD.to_string(),
            id_field: DEFAULT_ID_FIELD.to_string(),
            format: OutputFormat::Text,
            chunk_size: DEFAULT_CHUNK_SIZE,
            fail_fast: false,
        }
    }
}

impl BatchConfig {
    pub fn id_field(&self) -> Option<String> {
        Some(self.id_field.clone()).filter(|f| !f.is_empty())
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct WorkersConfig {
    pub default: usize,
    pub max: usize,
}

impl Default for WorkersConfig {
    fn default() -> Self {
        let cpus = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);
        Self {
            default: cpus.min(8),
            max: 16,
        }
    }
}

impl WorkersConfig {
    /// CLI override (or default), clamped to `1..=max`
    pub fn resolve(&self, requested: Option<usize>) -> usize {
        let n = requested.unwrap_or(self.default);
        if n > self.max {
            log::warn!("{n} workers requested, capping at {}", self.max);
        }
        n.clamp(1, self.max.max(1))
    }
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Search order:
    /// 1. ./reabstract.toml (current directory)
    /// 2. ~/.config/reabstract/config.toml
    ///
    /// If no config file found, returns default config.
    pub fn load() -> Result<Self> {
        let local_config = PathBuf::from("reabstract.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = directories::ProjectDirs::from("", "", "reabstract") {
            let user_config = config_dir.config_dir().join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        log::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }
}
