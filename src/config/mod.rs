//! Configuration management for gac
//!
//! The YAML file (`~/.google-admin.yaml` by default) supplies the domain,
//! credential locations, cache settings and group-audit OU rules. Command-line
//! flags and `GAC_*` environment variables override it; see [`Settings`].

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};

mod duration;
mod settings;

pub use duration::{format_duration, parse_duration};
pub use settings::{AuditSettings, CacheSettings, Settings};

/// Config file name under the home directory
const CONFIG_FILE_NAME: &str = ".google-admin.yaml";

/// Default OU holding accounts of people who left
pub const DEFAULT_FORMER_EMPLOYEES_OU: &str = "/Former employees";

/// Application configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Primary Google Workspace domain (e.g. example.com)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,

    /// Path to the OAuth2 client secret JSON
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,

    /// Path to the saved OAuth2 token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_file: Option<String>,

    /// Preferred output format
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Response cache settings
    #[serde(default)]
    pub cache: CacheConfig,

    /// Group audit settings
    #[serde(default)]
    pub audit: AuditConfig,
}

/// `cache:` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CacheConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    /// Go-style duration string, e.g. `15m` or `1h30m`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<String>,
}

/// `audit:` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AuditConfig {
    /// OUs whose members count as staff; members elsewhere are external
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub staff_ous: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub former_employees_ou: Option<String>,
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHome)?;
        Ok(home.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from an explicit path, or from the default path.
    ///
    /// A missing explicit file is an error; a missing default file yields
    /// the default configuration.
    pub fn load_at(path: Option<&Path>) -> Result<(Self, PathBuf)> {
        match path {
            Some(path) => Ok((Self::load_from(path)?, path.to_path_buf())),
            None => {
                let path = Self::default_path()?;
                if path.exists() {
                    Ok((Self::load_from(&path)?, path))
                } else {
                    log::debug!("No config file at {}, using defaults", path.display());
                    Ok((Self::default(), path))
                }
            }
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()).into());
        }

        let contents = std::fs::read_to_string(path)?;
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml::from_str(&contents).map_err(ConfigError::from)?;
        log::debug!("Using config file: {}", path.display());

        Ok(config)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents =
            serde_yaml::to_string(self).map_err(|e| ConfigError::SaveError(e.to_string()))?;

        std::fs::write(path, contents)?;

        // Set file permissions to 600 on Unix systems
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(path)?.permissions();
            perms.set_mode(0o600);
            std::fs::set_permissions(path, perms)?;
        }

        Ok(())
    }

    /// Starter configuration written by `config init`
    pub fn starter(domain: Option<String>) -> Self {
        Self {
            domain,
            client_secret: Some("~/.credentials/client_secret.json".to_string()),
            cache_file: Some("~/.credentials/gac.json".to_string()),
            format: Some("plain".to_string()),
            cache: CacheConfig {
                enabled: Some(true),
                ttl: Some("15m".to_string()),
                directory: None,
            },
            audit: AuditConfig {
                staff_ous: vec!["/".to_string()],
                former_employees_ou: Some(DEFAULT_FORMER_EMPLOYEES_OU.to_string()),
            },
        }
    }
}

/// Expand a leading `~` to the home directory.
pub fn expand_home(path: &str) -> Result<PathBuf> {
    if path == "~" {
        return Ok(dirs::home_dir().ok_or(ConfigError::NoHome)?);
    }
    match path.strip_prefix("~/") {
        Some(rest) => Ok(dirs::home_dir().ok_or(ConfigError::NoHome)?.join(rest)),
        None => Ok(PathBuf::from(path)),
    }
}
