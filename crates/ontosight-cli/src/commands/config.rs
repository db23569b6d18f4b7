//! Config command implementation.
//!
//! Manages CLI configuration.

use anyhow::Result;

use crate::config::Config;

/// Show current configuration.
pub fn show(config: &Config) -> Result<()> {
    println!("OntoSight CLI Configuration");
    println!("{:-<40}", "");
    println!("Host:         {}", config.host);
    println!("Port:         {}", config.port);
    println!("Page Size:    {}", config.page_size);
    println!("Sample Hops:  {}", config.sample_hops);

    if let Some(config_path) = Config::config_file_path() {
        println!("\nConfig file: {}", config_path.display());
    }

    Ok(())
}

/// Set a configuration value and persist it.
///
/// Starts from the file contents so environment overrides are not saved.
pub fn set(key: &str, value: &str) -> Result<()> {
    let mut config = Config::from_file()?;
    config.set(key, value)?;
    config.save()?;
    println!("Set {} to: {}", key, value);
    Ok(())
}

/// Get a configuration value.
pub fn get(config: &Config, key: &str) -> Result<()> {
    println!("{}", config.get(key)?);
    Ok(())
}

/// Reset configuration to defaults.
pub fn reset() -> Result<()> {
    let config = Config::default();
    config.save()?;
    println!("Configuration reset to defaults");
    Ok(())
}
