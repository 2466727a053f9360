//! Configuration commands.

use crate::config::AppConfig;
use crate::error::AppResult;

/// Dump the effective configuration to stdout.
pub fn dump(config: &AppConfig) -> AppResult<()> {
    println!("# config.toml ({})", AppConfig::default_path().display());
    println!("{}", config.to_toml()?);
    Ok(())
}

/// Validate the configuration.
pub fn validate(config: &AppConfig) -> AppResult<()> {
    config.validate()?;
    println!(
        "Configuration is valid: {} feed(s), zone {}, cache {}.",
        config.feeds.len(),
        config.zone,
        config.cache.cache_name()
    );
    Ok(())
}

/// Show the configuration file path.
pub fn path() -> AppResult<()> {
    println!("config: {}", AppConfig::default_path().display());
    Ok(())
}
