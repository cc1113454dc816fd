//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::HostConfig;
use std::path::Path;

/// Name of the host configuration file.
pub const CONFIG_FILE: &str = "iface.toml";

/// Loads and validates `<dir>/iface.toml`.
pub fn load_config(dir: &Path) -> Result<HostConfig, ConfigError> {
    let content = std::fs::read_to_string(dir.join(CONFIG_FILE))?;
    load_config_from_str(&content)
}

/// Parses and validates an `iface.toml` configuration from a string.
pub fn load_config_from_str(content: &str) -> Result<HostConfig, ConfigError> {
    let config: HostConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &HostConfig) -> Result<(), ConfigError> {
    if config.toolchain.version.trim().is_empty() {
        return Err(ConfigError::MissingField("toolchain.version".to_string()));
    }
    if config.paths.cache_dir.as_os_str().is_empty() {
        return Err(ConfigError::MissingField("paths.cache_dir".to_string()));
    }
    Ok(())
}
