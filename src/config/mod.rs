mod types;

pub use types::{Config, RegistryConfig, ServerConfig, StorageConfig};

use crate::error::{Result, SchemataError};
use std::fs;
use std::path::Path;

/// Prefix of environment variables that override file settings,
/// e.g. `SCHEMATA_STORAGE__URL` or `SCHEMATA_SERVER__PORT`
pub const ENV_PREFIX: &str = "SCHEMATA";

/// Load configuration from a TOML file, with environment overrides
pub fn load_config(path: &str) -> Result<Config> {
    load_with_env_prefix(path, ENV_PREFIX)
}

fn load_with_env_prefix(path: &str, env_prefix: &str) -> Result<Config> {
    if !Path::new(path).is_file() {
        return Err(SchemataError::Config(format!(
            "Failed to read config file '{}': file not found",
            path
        )));
    }

    let settings = config::Config::builder()
        .add_source(config::File::new(path, config::FileFormat::Toml))
        .add_source(
            config::Environment::with_prefix(env_prefix)
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    let config: Config = settings.try_deserialize()?;
    config.validate().map_err(SchemataError::Config)?;

    Ok(config)
}

/// Save configuration to a TOML file
pub fn save_config(config: &Config, path: &str) -> Result<()> {
    config.validate().map_err(SchemataError::Config)?;

    let toml_string = toml::to_string_pretty(config)?;
    fs::write(path, toml_string)
        .map_err(|e| SchemataError::Config(format!("Failed to write config file '{}': {}", path, e)))?;

    Ok(())
}
