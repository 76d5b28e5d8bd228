//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::AppConfig;
use crate::config::settings::OperationSettings;
use crate::config::validation::{resolve_settings, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// A parsed config together with the settings resolved from it.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: AppConfig,
    pub settings: OperationSettings,
}

/// Load and validate configuration from a TOML file.
///
/// A missing file is not an error when `required` is false: the built-in
/// defaults are used instead.
pub fn load_config(path: &Path, required: bool) -> Result<LoadedConfig, ConfigError> {
    let config = match fs::read_to_string(path) {
        Ok(content) => parse_config(&content)?,
        Err(e) if !required && e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "Config file not found, using defaults");
            AppConfig::default()
        }
        Err(e) => return Err(ConfigError::Io(e)),
    };

    let settings = resolve_settings(&config).map_err(ConfigError::Validation)?;

    Ok(LoadedConfig { config, settings })
}

/// Parse TOML text without semantic validation.
pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    toml::from_str(content).map_err(ConfigError::Parse)
}
