#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for obae
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - Configuration file (~/.config/obae/config.toml)
//! - Environment variables
//! - CLI flags (applied by the application)

mod sections;

pub use sections::{
    BrowserConfig, GeneralConfig, IdentifierConfig, MirrorsConfig, NetworkConfig, OfficialConfig,
};

use obae_errors::{ConfigError, Error};
use obae_types::MirrorSource;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub mirrors: MirrorsConfig,

    #[serde(default)]
    pub official: OfficialConfig,

    #[serde(default)]
    pub browser: BrowserConfig,

    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default)]
    pub identifier: IdentifierConfig,
}

impl Config {
    /// Get the default config file path
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, Error> {
        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::NotFound {
            path: "config directory".to_string(),
        })?;
        Ok(config_dir.join("obae").join("config.toml"))
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, contains invalid TOML, or
    /// names an unknown mirror in its template overrides.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|_| ConfigError::NotFound {
                path: path.display().to_string(),
            })?;

        Self::from_toml(&contents)
    }

    /// Parse configuration from a TOML string
    ///
    /// # Errors
    ///
    /// Returns an error on invalid TOML or invalid values.
    pub fn from_toml(contents: &str) -> Result<Self, Error> {
        let config: Self = toml::from_str(contents).map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with fallback to defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read
    /// or contains invalid TOML syntax.
    pub async fn load() -> Result<Self, Error> {
        let config_path = Self::default_path()?;

        if config_path.exists() {
            Self::load_from_file(&config_path).await
        } else {
            tracing::debug!(path = %config_path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration from an optional path or use default
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(config_path).await,
            None => Self::load().await,
        }
    }

    /// Check cross-field constraints serde cannot express
    ///
    /// # Errors
    ///
    /// Returns an error for unknown mirror template keys, templates without
    /// the `{id}` placeholder, or zero timeouts.
    pub fn validate(&self) -> Result<(), Error> {
        for (name, template) in &self.mirrors.templates {
            name.parse::<MirrorSource>()?;
            if !template.contains(obae_types::mirror::ID_PLACEHOLDER) {
                return Err(ConfigError::InvalidValue {
                    field: format!("mirrors.templates.{name}"),
                    value: template.clone(),
                }
                .into());
            }
        }

        if self.mirrors.per_mirror_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "mirrors.per_mirror_timeout_secs".to_string(),
                value: "0".to_string(),
            }
            .into());
        }

        if self.official.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "official.timeout_secs".to_string(),
                value: "0".to_string(),
            }
            .into());
        }

        Ok(())
    }

    /// Merge with environment variables
    ///
    /// `OBAE_SESSION_COOKIE` is deliberately not read here; credentials are
    /// supplied per call and never stored in configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values
    /// that cannot be parsed into the expected types.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        self.merge_vars(|key| std::env::var(key).ok())
    }

    /// Merge overrides from an arbitrary variable lookup
    ///
    /// # Errors
    ///
    /// Same as [`Config::merge_env`].
    pub fn merge_vars<F>(&mut self, lookup: F) -> Result<(), Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        // OBAE_WORKING_DIR
        if let Some(dir) = lookup("OBAE_WORKING_DIR") {
            self.general.working_dir = Some(PathBuf::from(dir));
        }

        // OBAE_MIRRORS
        if let Some(mirrors) = lookup("OBAE_MIRRORS") {
            self.mirrors.order = mirrors
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::parse::<MirrorSource>)
                .collect::<Result<_, _>>()?;
        }

        // OBAE_MIRROR_TIMEOUT
        if let Some(timeout) = lookup("OBAE_MIRROR_TIMEOUT") {
            let secs: u64 = timeout.parse().map_err(|_| ConfigError::InvalidValue {
                field: "OBAE_MIRROR_TIMEOUT".to_string(),
                value: timeout.clone(),
            })?;
            if secs == 0 {
                return Err(ConfigError::InvalidValue {
                    field: "OBAE_MIRROR_TIMEOUT".to_string(),
                    value: timeout,
                }
                .into());
            }
            self.mirrors.per_mirror_timeout_secs = secs;
        }

        // OBAE_CHROMIUM
        if let Some(path) = lookup("OBAE_CHROMIUM") {
            self.browser.executable = Some(PathBuf::from(path));
        }

        Ok(())
    }
}
