//! Configuration file support for Pills.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/pills/config.toml`.

use crate::recommender::DEFAULT_PAGE_SIZE;
use crate::{Error, Result, StressLevel};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub recommendations: RecommendationConfig,

    #[serde(default)]
    pub ingestion: IngestionConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Recommendation tuning
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RecommendationConfig {
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Level assumed for users with no stress history
    #[serde(
        default = "default_stress_level",
        with = "crate::wire::level_by_name"
    )]
    pub default_stress_level: StressLevel,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            default_stress_level: default_stress_level(),
        }
    }
}

/// Health data ingestion settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IngestionConfig {
    /// Device type recorded when a device does not report one
    #[serde(default = "default_device_type")]
    pub default_device_type: String,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            default_device_type: default_device_type(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        std::env::var_os("HOME")
            .map(|home| PathBuf::from(home).join(".local/share"))
            .unwrap_or_else(|| PathBuf::from("."))
    });
    base.join("pills")
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_stress_level() -> StressLevel {
    StressLevel::Medium
}

fn default_device_type() -> String {
    "unknown".into()
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Reject values the core cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.recommendations.page_size == 0 {
            return Err(Error::Config(
                "recommendations.page_size must be at least 1".into(),
            ));
        }
        if self.ingestion.default_device_type.trim().is_empty() {
            return Err(Error::Config(
                "ingestion.default_device_type must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            std::env::var_os("HOME")
                .map(|home| PathBuf::from(home).join(".config"))
                .unwrap_or_else(|| PathBuf::from("."))
        });
        base.join("pills").join("config.toml")
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}
