//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::QplaceConfig;
use std::path::Path;

/// Conventional configuration file name looked up next to a design.
pub const CONFIG_FILE_NAME: &str = "qplace.toml";

/// Loads and validates a configuration file.
pub fn load_config(path: &Path) -> Result<QplaceConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Parses and validates a configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<QplaceConfig, ConfigError> {
    let config: QplaceConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates that configuration values are in range.
pub(crate) fn validate_config(config: &QplaceConfig) -> Result<(), ConfigError> {
    if config.placer.grid < 1 {
        return Err(ConfigError::ValidationError(
            "placer.grid must be at least 1".to_string(),
        ));
    }
    if config.solver.max_iterations == 0 {
        return Err(ConfigError::ValidationError(
            "solver.max_iterations must be at least 1".to_string(),
        ));
    }
    let tol = config.solver.tolerance;
    if !tol.is_finite() || tol <= 0.0 {
        return Err(ConfigError::ValidationError(format!(
            "solver.tolerance must be a positive number, got {tol}"
        )));
    }
    if let Some(region) = &config.region {
        if !region.is_valid() {
            return Err(ConfigError::ValidationError(format!(
                "region {region} has no area"
            )));
        }
    }
    Ok(())
}
