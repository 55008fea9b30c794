//! Configuration resolution for snapsift-cu
//!
//! Two-tier key resolution with ENV → TOML priority. The environment wins
//! so that deployments can override an on-disk config without editing it.

use snapsift_common::config::TomlConfig;
use snapsift_common::{Error, Result};
use tracing::{info, warn};

/// Environment variable holding the vision API key
pub const GEMINI_API_KEY_ENV: &str = "SNAPSIFT_GEMINI_API_KEY";

/// Environment variable overriding the listen port
pub const PORT_ENV: &str = "SNAPSIFT_CU_PORT";

/// Compiled default listen port
pub const DEFAULT_PORT: u16 = 5731;

/// Resolve the vision API key from ENV → TOML
pub fn resolve_gemini_api_key(toml_config: &TomlConfig) -> Result<String> {
    let env_key = std::env::var(GEMINI_API_KEY_ENV).ok();
    let toml_key = toml_config.gemini_api_key.as_ref();

    let mut sources = Vec::new();
    if env_key.as_deref().is_some_and(is_valid_key) {
        sources.push("environment");
    }
    if toml_key.map(String::as_str).is_some_and(is_valid_key) {
        sources.push("TOML");
    }

    // Warn on multiple sources (potential misconfiguration)
    if sources.len() > 1 {
        warn!(
            "Vision API key found in multiple sources: {}. Using environment (highest priority).",
            sources.join(", ")
        );
    }

    if let Some(key) = env_key {
        if is_valid_key(&key) {
            info!("Vision API key loaded from environment variable");
            return Ok(key);
        }
    }

    if let Some(key) = toml_key {
        if is_valid_key(key) {
            info!("Vision API key loaded from TOML config");
            return Ok(key.clone());
        }
    }

    Err(Error::Config(format!(
        "Vision API key not configured. Please configure using one of:\n\
         1. Environment: {}=your-key-here\n\
         2. TOML config: ~/.config/snapsift/snapsift-cu.toml (gemini_api_key = \"your-key\")",
        GEMINI_API_KEY_ENV
    )))
}

/// Resolve the listen port from ENV → TOML → compiled default
pub fn resolve_port(toml_config: &TomlConfig) -> u16 {
    if let Ok(value) = std::env::var(PORT_ENV) {
        if let Ok(port) = value.parse() {
            return port;
        }
        warn!(value = %value, "Ignoring unparsable {} value", PORT_ENV);
    }

    toml_config.server.port.unwrap_or(DEFAULT_PORT)
}

/// Validate an API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}
