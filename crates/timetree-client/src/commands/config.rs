//! Configuration commands.

use std::path::Path;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Dump the current configuration to stdout, password masked.
pub fn dump(config_path: &Path, config: &ClientConfig) -> ClientResult<()> {
    let toml_str = toml::to_string_pretty(&config.redacted())
        .map_err(|e| ClientError::Config(format!("failed to serialize config: {}", e)))?;
    println!("# config.toml ({})", config_path.display());
    println!("{}", toml_str);

    Ok(())
}

/// Validate the configuration.
pub fn validate(config: &ClientConfig) -> ClientResult<()> {
    let settings = config.timetree().map_err(ClientError::Config)?;

    settings
        .to_provider_config()
        .map_err(|e| ClientError::Config(format!("invalid [timetree] settings: {}", e)))?;
    settings
        .resolve_credentials()
        .map_err(|e| ClientError::Config(format!("invalid TimeTree credentials: {}", e)))?;
    println!("TimeTree credentials are valid.");

    let entry = settings.connection().map_err(ClientError::Config)?;
    println!("{} (every {})", entry.title, entry.update_interval);

    if config.display.days == 0 {
        return Err(ClientError::Config(
            "display.days must be at least 1".to_string(),
        ));
    }

    println!("Configuration is valid.");
    Ok(())
}

/// Show the configuration file path.
pub fn path(config_path: &Path) -> ClientResult<()> {
    println!("config: {}", config_path.display());
    Ok(())
}
