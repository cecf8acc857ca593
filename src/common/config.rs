//! # Configuration Utilities
//!
//! Shared configuration loading used by both the server and the client binaries.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Load a TOML configuration file and deserialize it into the specified type.
///
/// # Arguments
/// - `path`: Path to the TOML configuration file
///
/// # Returns
/// - `Ok(T)`: Successfully loaded and parsed configuration
/// - `Err`: File I/O or parsing error
///
/// # Example
/// ```ignore
/// let config: ServerConfig = load_config("config/server.toml")?;
/// ```
pub fn load_config<T>(path: impl AsRef<Path>) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    parse_config(&content).with_context(|| format!("invalid config file {}", path.display()))
}

/// Parse configuration from an in-memory TOML string.
pub fn parse_config<T>(content: &str) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    let config: T = toml::from_str(content)?;
    Ok(config)
}

/// Load `path` if given, otherwise fall back to the type's defaults.
pub fn load_or_default<T>(path: Option<&str>) -> Result<T>
where
    T: for<'de> Deserialize<'de> + Default,
{
    match path {
        Some(path) => load_config(path),
        None => Ok(T::default()),
    }
}
