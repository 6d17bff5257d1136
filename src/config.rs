use crate::core::{Result, SeshqlError};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Top-level session configuration parsed from a TOML file.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    pub sqlite: Option<SqliteConfig>,
}

/// SQLite-related connection settings, applied right after connecting.
#[derive(Debug, Deserialize)]
pub struct SqliteConfig {
    pub busy_timeout_ms: Option<u64>,
    pub foreign_keys: Option<bool>,
    pub journal_mode: Option<String>,
}

impl Config {
    /// Loads configuration from a TOML file at the given path.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Config> {
        let content = fs::read_to_string(path).map_err(|e| SeshqlError::Config(e.to_string()))?;
        toml::from_str(&content).map_err(|e| SeshqlError::Config(e.to_string()))
    }

    /// Loads `<config dir>/seshql/config.toml` when present, falling
    /// back to defaults when the file is missing or unreadable.
    pub fn discover() -> Config {
        let path = dirs::config_dir().map(|dir| dir.join("seshql").join("config.toml"));
        match path {
            Some(path) if path.exists() => Config::load(&path).unwrap_or_else(|err| {
                debug!("ignoring config at {}: {}", path.display(), err);
                Config::default()
            }),
            _ => Config::default(),
        }
    }
}
