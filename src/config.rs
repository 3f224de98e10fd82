//! Configuration management for the app chart tools
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (appchart.toml)
//! - Environment variables (APPCHART__*)
//!
//! ## Example config file (appchart.toml):
//! ```toml
//! [store]
//! path = "./charts"
//! default_chart = "standard"
//!
//! [validation]
//! unknown_settings = "reject"
//!
//! [output]
//! format = "table"
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::overrides::UnknownSettingPolicy;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppChartConfig {
    /// Where app chart resources live
    #[serde(default)]
    pub store: StoreConfig,

    /// Validation settings
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,
}

/// Chart store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory of app chart resource files
    #[serde(default = "default_store_path")]
    pub path: PathBuf,

    /// Chart used by applications that do not name one
    #[serde(default)]
    pub default_chart: Option<String>,
}

/// Validation configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Handling of overrides the chart does not declare
    #[serde(default)]
    pub unknown_settings: UnknownSettingPolicy,
}

/// Output configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

fn default_store_path() -> PathBuf {
    PathBuf::from("charts")
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
            default_chart: None,
        }
    }
}

impl AppChartConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, adding a specific file on top of the defaults
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = ["appchart.toml", ".appchart.toml", "config/appchart.toml"];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(config_dir) = Self::user_config_path() {
            if config_dir.exists() {
                builder = builder.add_source(File::from(config_dir).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // APPCHART__STORE__PATH, APPCHART__VALIDATION__UNKNOWN_SETTINGS, ...
        builder = builder.add_source(
            Environment::with_prefix("APPCHART")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Per-user config file in the XDG config directory
    pub fn user_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("dev", "appchart", "appchart")
            .map(|dirs| dirs.config_dir().join("appchart.toml"))
    }

    /// File that edits are written to: the explicit file when given, else
    /// the per-user file. Both are read after the working directory files.
    pub fn writable_path(config_path: Option<&str>) -> Option<PathBuf> {
        match config_path {
            Some(path) => Some(PathBuf::from(path)),
            None => Self::user_config_path(),
        }
    }

    /// Load a single config file, without the other locations or the
    /// environment. A missing file reads as the defaults.
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        Config::builder()
            .add_source(File::from(path))
            .build()?
            .try_deserialize()
    }

    /// Save configuration to a file, creating its directory
    pub fn save(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)
    }

    /// Chart directory, resolved against the working directory
    pub fn store_path(&self) -> PathBuf {
        if self.store.path.is_absolute() {
            self.store.path.clone()
        } else {
            std::env::current_dir()
                .unwrap_or_default()
                .join(&self.store.path)
        }
    }

    /// Default chart, treating an empty name as unset
    pub fn default_chart(&self) -> Option<&str> {
        self.store.default_chart.as_deref().filter(|name| !name.is_empty())
    }
}
