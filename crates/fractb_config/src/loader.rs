//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::resolve::{pin_map, sweep_spec};
use crate::types::HarnessConfig;
use std::path::Path;

/// File name looked up by [`load_config`].
pub const CONFIG_FILE_NAME: &str = "fractb.toml";

/// Loads and validates a `fractb.toml` configuration from a directory.
///
/// Reads `<dir>/fractb.toml`, parses it, and validates every sweep.
pub fn load_config(dir: &Path) -> Result<HarnessConfig, ConfigError> {
    load_config_from_path(&dir.join(CONFIG_FILE_NAME))
}

/// Loads and validates a configuration file at an explicit path.
pub fn load_config_from_path(path: &Path) -> Result<HarnessConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Parses and validates a `fractb.toml` configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<HarnessConfig, ConfigError> {
    let config: HarnessConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates harness settings and every sweep definition.
fn validate_config(config: &HarnessConfig) -> Result<(), ConfigError> {
    if config.harness.max_cycles == 0 {
        return Err(ConfigError::ValidationError(
            "harness.max_cycles must be positive".to_string(),
        ));
    }
    if config.harness.jobs == 0 {
        return Err(ConfigError::ValidationError(
            "harness.jobs must be positive".to_string(),
        ));
    }
    if config.sweeps.is_empty() {
        return Err(ConfigError::MissingField("sweeps".to_string()));
    }
    for (name, def) in &config.sweeps {
        let spec = sweep_spec(name, def)?;
        pin_map(&spec.family, &config.pins)?;
    }
    Ok(())
}
