//! Configuration management for uavdex.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "uavdex";

/// Backing file for the aircraft collection.
const AIRCRAFT_FILE_NAME: &str = "uav_models.json";

/// Backing file for the subsystem collection.
const SUBSYSTEMS_FILE_NAME: &str = "subsystems.json";

/// Backing file for the custom-parameter definitions.
const PARAMS_FILE_NAME: &str = "custom_params.json";

/// Directory holding case documents.
const CASES_DIR_NAME: &str = "cases";

/// Directory holding uploaded images.
const ASSETS_DIR_NAME: &str = "assets";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `UAVDEX_`)
/// 2. TOML config file at `~/.config/uavdex/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Data location configuration.
    pub data: DataConfig,
    /// AI-extraction configuration.
    pub extract: ExtractConfig,
    /// Statistics configuration.
    pub stats: StatsConfig,
}

/// Data location configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Root directory for collections, cases, and assets.
    /// Defaults to `~/.local/share/uavdex`.
    pub data_dir: Option<PathBuf>,
}

/// AI-extraction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Base URL of the OpenAI-compatible completion service.
    pub base_url: String,
    /// Model name sent with each request.
    pub model: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

/// Statistics configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    /// Number of samples for fitted curves.
    pub curve_samples: usize,
    /// Number of trees for the ensemble regressor.
    pub forest_trees: u16,
    /// Seed for the ensemble regressor, for reproducible fits.
    pub forest_seed: u64,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.deepseek.com".to_string(),
            model: "deepseek-chat".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            curve_samples: 100,
            forest_trees: 100,
            forest_seed: 42,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Configuration is loaded in this order (later sources override earlier):
    /// 1. Default values
    /// 2. TOML config file (if exists)
    /// 3. Environment variables (prefixed with `UAVDEX_`)
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("UAVDEX_").split("_"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.stats.curve_samples < 2 {
            return Err(Error::ConfigValidation {
                message: format!(
                    "curve_samples must be at least 2, got {}",
                    self.stats.curve_samples
                ),
            });
        }

        if self.stats.forest_trees == 0 {
            return Err(Error::ConfigValidation {
                message: "forest_trees must be greater than 0".to_string(),
            });
        }

        if self.extract.timeout_secs == 0 {
            return Err(Error::ConfigValidation {
                message: "timeout_secs must be greater than 0".to_string(),
            });
        }

        if self.extract.base_url.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "base_url must not be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Get the data directory, resolving defaults if not set.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.data
            .data_dir
            .clone()
            .unwrap_or_else(Self::default_data_dir)
    }

    /// Path of the aircraft collection's backing file.
    #[must_use]
    pub fn aircraft_path(&self) -> PathBuf {
        self.data_dir().join(AIRCRAFT_FILE_NAME)
    }

    /// Path of the subsystem collection's backing file.
    #[must_use]
    pub fn subsystems_path(&self) -> PathBuf {
        self.data_dir().join(SUBSYSTEMS_FILE_NAME)
    }

    /// Path of the custom-parameter definitions file.
    #[must_use]
    pub fn params_path(&self) -> PathBuf {
        self.data_dir().join(PARAMS_FILE_NAME)
    }

    /// Directory holding case documents.
    #[must_use]
    pub fn cases_dir(&self) -> PathBuf {
        self.data_dir().join(CASES_DIR_NAME)
    }

    /// Directory holding uploaded images.
    #[must_use]
    pub fn assets_dir(&self) -> PathBuf {
        self.data_dir().join(ASSETS_DIR_NAME)
    }

    /// Get the extraction timeout as a Duration.
    #[must_use]
    pub fn extract_timeout(&self) -> Duration {
        Duration::from_secs(self.extract.timeout_secs)
    }
}
