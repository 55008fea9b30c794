//! Configuration loading for snapsift services
//!
//! Each service reads an optional TOML file from the platform config
//! directory (`~/.config/snapsift/<service>.toml` on Linux). Environment
//! variables take priority over TOML values; resolution of individual keys
//! lives in the service crates.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// TOML configuration shared by snapsift services
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    /// API key for the vision scoring capability
    pub gemini_api_key: Option<String>,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port override; each service has a compiled default
    pub port: Option<u16>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: None }
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Default configuration file path for a service
///
/// `None` when the platform config directory cannot be determined.
pub fn config_file_path(service_name: &str) -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("snapsift").join(format!("{}.toml", service_name)))
}

/// Load TOML configuration from a path
///
/// A missing file is not an error: services run with defaults plus
/// environment variables.
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "No TOML config file, using defaults");
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed: {}", e)))?;
    toml::from_str(&content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
}

/// Write TOML configuration to a path, creating parent directories
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize TOML failed: {}", e)))?;
    std::fs::write(path, content)?;
    Ok(())
}
