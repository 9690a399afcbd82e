//! Configuration management for the Launchdeck SDK.
//!
//! Loads configuration from ${LAUNCHDECK_HOME}/config.toml with sensible
//! defaults. Secrets and base URLs can always be overridden through the
//! environment; resolution order is env > config file > default.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default config template with comments, embedded at compile time.
const DEFAULT_CONFIG_TEMPLATE: &str = include_str!("default_config.toml");

pub mod paths {
    //! Path resolution for Launchdeck configuration.
    //!
    //! LAUNCHDECK_HOME resolution order:
    //! 1. LAUNCHDECK_HOME environment variable (if set)
    //! 2. ~/.config/launchdeck (default)

    use std::path::PathBuf;

    /// Returns the Launchdeck home directory.
    pub fn launchdeck_home() -> PathBuf {
        if let Ok(home) = std::env::var("LAUNCHDECK_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir()
            .map(|h| h.join(".config").join("launchdeck"))
            .expect("Could not determine home directory")
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        launchdeck_home().join("config.toml")
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Marketplace backend base URL
    pub api_base_url: String,

    /// Identity provider base URL override (for proxies or test rigs)
    pub identity_base_url: Option<String>,

    /// Identity provider project API key
    pub identity_api_key: Option<String>,

    /// Image host base URL override
    pub image_host_base_url: Option<String>,

    /// Image host API key
    pub image_host_api_key: Option<String>,

    /// Payment provider base URL override
    pub payments_base_url: Option<String>,

    /// Payment provider publishable key
    pub payments_publishable_key: Option<String>,
}

impl Config {
    const DEFAULT_API_BASE_URL: &str = "https://api.launchdeck.app";

    /// Loads configuration from the default config path.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Backend base URL with env override (`LAUNCHDECK_API_URL`).
    pub fn effective_api_base_url(&self) -> Result<String> {
        match env_override("LAUNCHDECK_API_URL") {
            Some(url) => {
                validate_url(&url)?;
                Ok(url)
            }
            None => {
                validate_url(&self.api_base_url)?;
                Ok(self.api_base_url.clone())
            }
        }
    }

    /// Identity provider base URL, if overridden anywhere
    /// (`LAUNCHDECK_IDENTITY_URL` > config). `None` means provider default.
    pub fn effective_identity_base_url(&self) -> Result<Option<String>> {
        resolve_optional_url("LAUNCHDECK_IDENTITY_URL", self.identity_base_url.as_deref())
    }

    /// Identity provider API key (`LAUNCHDECK_IDENTITY_API_KEY` > config).
    pub fn effective_identity_api_key(&self) -> Result<String> {
        env_override("LAUNCHDECK_IDENTITY_API_KEY")
            .or_else(|| non_empty(self.identity_api_key.as_deref()))
            .context(
                "No identity API key configured. Set LAUNCHDECK_IDENTITY_API_KEY or \
                 identity_api_key in config.toml.",
            )
    }

    /// Image host base URL override, if any.
    pub fn effective_image_host_base_url(&self) -> Result<Option<String>> {
        resolve_optional_url(
            "LAUNCHDECK_IMAGE_HOST_URL",
            self.image_host_base_url.as_deref(),
        )
    }

    /// Image host API key (`LAUNCHDECK_IMAGE_HOST_KEY` > config).
    pub fn effective_image_host_api_key(&self) -> Result<String> {
        env_override("LAUNCHDECK_IMAGE_HOST_KEY")
            .or_else(|| non_empty(self.image_host_api_key.as_deref()))
            .context(
                "No image host API key configured. Set LAUNCHDECK_IMAGE_HOST_KEY or \
                 image_host_api_key in config.toml.",
            )
    }

    /// Payment provider base URL override, if any.
    pub fn effective_payments_base_url(&self) -> Result<Option<String>> {
        resolve_optional_url("LAUNCHDECK_PAYMENTS_URL", self.payments_base_url.as_deref())
    }

    /// Payment provider publishable key (`LAUNCHDECK_PAYMENTS_KEY` > config).
    pub fn effective_payments_publishable_key(&self) -> Result<String> {
        env_override("LAUNCHDECK_PAYMENTS_KEY")
            .or_else(|| non_empty(self.payments_publishable_key.as_deref()))
            .context(
                "No payments publishable key configured. Set LAUNCHDECK_PAYMENTS_KEY or \
                 payments_publishable_key in config.toml.",
            )
    }

    /// Creates a default config file at the given path.
    /// Returns an error if the file already exists.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, DEFAULT_CONFIG_TEMPLATE)
    }

    /// Writes config content to a file, creating parent directories as needed.
    /// Uses atomic write (temp file + rename) to prevent corruption.
    fn write_config(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: Self::DEFAULT_API_BASE_URL.to_string(),
            identity_base_url: None,
            identity_api_key: None,
            image_host_base_url: None,
            image_host_api_key: None,
            payments_base_url: None,
            payments_publishable_key: None,
        }
    }
}

/// Reads an env var, treating empty/whitespace values as unset.
fn env_override(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn resolve_optional_url(env_name: &str, config_value: Option<&str>) -> Result<Option<String>> {
    let resolved = env_override(env_name).or_else(|| non_empty(config_value));
    if let Some(url) = &resolved {
        validate_url(url)?;
    }
    Ok(resolved)
}

/// Validates that a URL is well-formed.
fn validate_url(url: &str) -> Result<()> {
    url::Url::parse(url).with_context(|| format!("Invalid base URL: {url}"))?;
    Ok(())
}
