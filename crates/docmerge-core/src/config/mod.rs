//! Configuration management for docmerge.
//!
//! Configuration is loaded from the platform config directory
//! (`config.toml`) with defaults for every field.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use crate::types::DocumentKind;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for docmerge.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Input discovery
    pub discovery: DiscoveryConfig,

    /// Output settings
    pub output: OutputConfig,

    /// Embedded image recognition
    pub ocr: OcrConfig,

    /// External converter commands
    pub converters: ConvertersConfig,

    /// Tool time limits
    pub limits: LimitsConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// - macOS: ~/Library/Application Support/com.docmerge.docmerge/config.toml
    /// - Linux: ~/.config/docmerge/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\docmerge\config\config.toml
    ///
    /// Falls back to ~/.docmerge/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "docmerge", "docmerge")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".docmerge").join("config.toml")
            })
    }

    /// Resolved work directory (with ~ expansion).
    pub fn work_dir(&self) -> PathBuf {
        expand(&self.general.work_dir)
    }

    /// Resolved cache file path (with ~ expansion).
    pub fn cache_file(&self) -> PathBuf {
        expand(&self.general.cache_file)
    }

    /// Resolved image dump directory, if enabled.
    pub fn image_output_dir(&self) -> Option<PathBuf> {
        if self.general.image_output_dir.as_os_str().is_empty() {
            None
        } else {
            Some(expand(&self.general.image_output_dir))
        }
    }

    /// Resolved discovery root (with ~ expansion).
    pub fn root(&self) -> PathBuf {
        expand(&self.discovery.root)
    }

    /// Target kind for converted files.
    pub fn output_kind(&self) -> Result<DocumentKind, ConfigError> {
        self.output.kind.parse().map_err(ConfigError::ValidationError)
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

fn expand(path: &Path) -> PathBuf {
    let path_str = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(&path_str).into_owned())
}
