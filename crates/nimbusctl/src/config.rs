//! Configuration management for nimbusctl
//!
//! Profiles are stored in TOML under the platform config directory. An
//! explicitly passed `--config-file` isolates the run from environment
//! variables; otherwise `NIMBUS_ENDPOINT`, `NIMBUS_SUBSCRIPTION_ID` and
//! `NIMBUS_TOKEN` override or fully replace profile values.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during configuration operations
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config from {path}: {source}")]
    LoadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to save config to {path}: {source}")]
    SaveError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Profile '{name}' not found")]
    ProfileNotFound { name: String },

    #[error("No profile configured and no default set")]
    NoDefaultProfile,

    #[error("Failed to determine config directory")]
    ConfigDirError,
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// One named connection profile
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Profile {
    /// Management API root, e.g. https://management.nimbus.cloud/v1
    pub endpoint: String,
    pub subscription_id: String,
    /// Bearer token for the management API
    pub token: String,
}

/// Main configuration structure
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct Config {
    /// Profile used when none is named on the command line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_profile: Option<String>,
    /// Map of profile name -> profile configuration
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Config {
    /// Default on-disk location of the configuration file.
    pub fn default_path() -> Result<PathBuf> {
        let dirs =
            ProjectDirs::from("cloud", "nimbus", "nimbusctl").ok_or(ConfigError::ConfigDirError)?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Load from the default location; a missing file is an empty config.
    pub fn load() -> Result<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            return Ok(Config::default());
        }
        Self::load_from_path(&path)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::LoadError {
            path: path.display().to_string(),
            source,
        })?;
        Ok(toml::from_str(&raw)?)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to_path(&Self::default_path()?)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let raw = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::SaveError {
                path: path.display().to_string(),
                source,
            })?;
        }
        fs::write(path, raw).map_err(|source| ConfigError::SaveError {
            path: path.display().to_string(),
            source,
        })
    }

    /// Resolve a profile by explicit name or the configured default.
    pub fn resolve_profile<'a>(&'a self, name: Option<&'a str>) -> Result<(&'a str, &'a Profile)> {
        let name = match name {
            Some(name) => name,
            None => self
                .default_profile
                .as_deref()
                .ok_or(ConfigError::NoDefaultProfile)?,
        };
        let profile = self
            .profiles
            .get(name)
            .ok_or_else(|| ConfigError::ProfileNotFound {
                name: name.to_string(),
            })?;
        Ok((name, profile))
    }

    pub fn set_profile(&mut self, name: &str, profile: Profile) {
        // First profile becomes the default automatically.
        if self.profiles.is_empty() && self.default_profile.is_none() {
            self.default_profile = Some(name.to_string());
        }
        self.profiles.insert(name.to_string(), profile);
    }

    pub fn remove_profile(&mut self, name: &str) -> Result<()> {
        if self.profiles.remove(name).is_none() {
            return Err(ConfigError::ProfileNotFound {
                name: name.to_string(),
            });
        }
        if self.default_profile.as_deref() == Some(name) {
            self.default_profile = None;
        }
        Ok(())
    }
}
