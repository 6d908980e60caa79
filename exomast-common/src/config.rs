//! Service settings resolution and TOML configuration
//!
//! Settings are resolved per field with the following priority:
//! 1. Explicit override (command-line argument or builder value)
//! 2. Environment variable
//! 3. TOML config file (`~/.config/exomast/config.toml` on Linux)
//! 4. Compiled default (fallback)
//!
//! A missing or unreadable TOML file never aborts resolution.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Public exoMAST API root
pub const DEFAULT_API_URL: &str = "https://exo.mast.stsci.edu/api";
/// API version tag embedded in every request URL
pub const DEFAULT_API_VERSION: &str = "0.1";
/// Cache directory name under the user's home directory
pub const DEFAULT_CACHE_DIR_NAME: &str = ".exomast_api";

pub const ENV_API_URL: &str = "EXOMAST_API_URL";
pub const ENV_API_VERSION: &str = "EXOMAST_API_VERSION";
pub const ENV_CACHE_DIR: &str = "EXOMAST_CACHE_DIR";
pub const ENV_TIMEOUT_SECS: &str = "EXOMAST_TIMEOUT_SECS";

/// Logging section of the TOML file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter level ("trace", "debug", "info", "warn", "error")
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// On-disk configuration file
///
/// Every field is optional so that older or hand-written files still parse.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,
    /// Whole-request deadline in seconds; absent means no deadline
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Compiled fallback values
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledDefaults {
    pub api_url: String,
    pub api_version: String,
    pub cache_dir: PathBuf,
    pub log_level: String,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        let cache_dir = dirs::home_dir()
            .map(|home| home.join(DEFAULT_CACHE_DIR_NAME))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_DIR_NAME));

        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            cache_dir,
            log_level: default_log_level(),
        }
    }
}

/// Fully resolved settings used to build a client
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceSettings {
    pub api_url: String,
    pub api_version: String,
    pub cache_dir: PathBuf,
    pub timeout: Option<Duration>,
    pub log_level: String,
}

impl ServiceSettings {
    /// Versioned API root, e.g. `https://exo.mast.stsci.edu/api/v0.1`
    pub fn api_base(&self) -> String {
        format!("{}/v{}", self.api_url.trim_end_matches('/'), self.api_version)
    }
}

impl Default for ServiceSettings {
    fn default() -> Self {
        let defaults = CompiledDefaults::for_current_platform();
        Self {
            api_url: defaults.api_url,
            api_version: defaults.api_version,
            cache_dir: defaults.cache_dir,
            timeout: None,
            log_level: defaults.log_level,
        }
    }
}

/// Highest-priority values, typically from command-line arguments
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub api_url: Option<String>,
    pub api_version: Option<String>,
    pub cache_dir: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
    pub log_level: Option<String>,
}

/// Resolves [`ServiceSettings`] from overrides, environment, TOML and defaults
pub struct SettingsResolver {
    config_path: Option<PathBuf>,
}

impl SettingsResolver {
    /// Resolver reading the per-user config file
    pub fn new() -> Self {
        Self {
            config_path: default_config_path(),
        }
    }

    /// Resolver reading an explicit config file instead of the per-user one
    pub fn with_config_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: Some(path.into()),
        }
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    pub fn resolve(&self, overrides: &SettingsOverrides) -> Result<ServiceSettings> {
        let toml_config = self.load_toml_gracefully();
        let defaults = CompiledDefaults::for_current_platform();

        let api_url = overrides
            .api_url
            .clone()
            .or_else(|| env_value(ENV_API_URL))
            .or_else(|| toml_config.api_url.clone())
            .unwrap_or(defaults.api_url);

        let api_version = overrides
            .api_version
            .clone()
            .or_else(|| env_value(ENV_API_VERSION))
            .or_else(|| toml_config.api_version.clone())
            .unwrap_or(defaults.api_version);

        let cache_dir = overrides
            .cache_dir
            .clone()
            .or_else(|| env_value(ENV_CACHE_DIR).map(PathBuf::from))
            .or_else(|| toml_config.cache_dir.clone())
            .unwrap_or(defaults.cache_dir);

        let timeout_secs = match overrides.timeout_secs {
            Some(secs) => Some(secs),
            None => match env_value(ENV_TIMEOUT_SECS) {
                Some(raw) => Some(raw.parse::<u64>().map_err(|_| {
                    Error::InvalidInput(format!("{} must be whole seconds, got {:?}", ENV_TIMEOUT_SECS, raw))
                })?),
                None => toml_config.timeout_secs,
            },
        };

        let log_level = overrides
            .log_level
            .clone()
            .unwrap_or(toml_config.logging.level);

        validate_api_url(&api_url)?;
        validate_api_version(&api_version)?;

        let settings = ServiceSettings {
            api_url,
            api_version,
            cache_dir,
            timeout: timeout_secs.map(Duration::from_secs),
            log_level,
        };

        debug!(api_base = %settings.api_base(), cache_dir = %settings.cache_dir.display(), "Resolved service settings");

        Ok(settings)
    }

    fn load_toml_gracefully(&self) -> TomlConfig {
        let Some(path) = &self.config_path else {
            return TomlConfig::default();
        };

        match load_toml_config(path) {
            Ok(Some(config)) => config,
            Ok(None) => TomlConfig::default(),
            Err(e) => {
                warn!("Ignoring config file {}: {}", path.display(), e);
                TomlConfig::default()
            }
        }
    }
}

impl Default for SettingsResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-user config file location (`<config_dir>/exomast/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("exomast").join("config.toml"))
}

/// Read a TOML config file; `Ok(None)` when the file does not exist
pub fn load_toml_config(path: &Path) -> Result<Option<TomlConfig>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)?;
    let config = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))?;

    Ok(Some(config))
}

/// Write a TOML config file atomically (temp file + rename)
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize TOML failed: {}", e)))?;

    let temp_path = path.with_extension("toml.tmp");
    std::fs::write(&temp_path, content)?;
    std::fs::rename(&temp_path, path)?;

    Ok(())
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn validate_api_url(url: &str) -> Result<()> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!("API URL must be http(s), got {:?}", url)))
    }
}

fn validate_api_version(version: &str) -> Result<()> {
    let well_formed = !version.is_empty()
        && version.chars().all(|c| c.is_ascii_digit() || c == '.')
        && version.parse::<f64>().is_ok();

    if well_formed {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!("API version must look like \"0.1\", got {:?}", version)))
    }
}
