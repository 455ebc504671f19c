use std::{env, path::PathBuf};

use super::ConfigError;

/// Locations of configuration and log files
///
/// Follows the XDG Base Directory specification.
pub struct ConfigPaths;

impl ConfigPaths {
    const APP_NAME: &'static str = "modemctl";

    /// Returns the configuration directory
    ///
    /// `$XDG_CONFIG_HOME/modemctl`, falling back to `$HOME/.config/modemctl`.
    ///
    /// # Errors
    /// Returns `ConfigError::NoConfigDir` if neither variable is set
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|_| env::var("HOME").map(|home| PathBuf::from(home).join(".config")))
            .map(|base| base.join(Self::APP_NAME))
            .map_err(|_| ConfigError::NoConfigDir)
    }

    /// Returns the path to the main configuration file
    ///
    /// # Errors
    /// Returns `ConfigError::NoConfigDir` if the directory cannot be determined
    pub fn main_config() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the log directory, creating it if needed
    ///
    /// `$XDG_STATE_HOME/modemctl/logs`, falling back to `$HOME/.local/state/modemctl/logs`.
    ///
    /// # Errors
    /// Returns an error if no base directory is known or it cannot be created
    pub fn log_dir() -> Result<PathBuf, ConfigError> {
        let log_dir = env::var("XDG_STATE_HOME")
            .map(PathBuf::from)
            .or_else(|_| {
                env::var("HOME").map(|home| PathBuf::from(home).join(".local").join("state"))
            })
            .map_err(|_| ConfigError::NoConfigDir)?
            .join(Self::APP_NAME)
            .join("logs");

        if !log_dir.exists() {
            std::fs::create_dir_all(&log_dir).map_err(|source| ConfigError::Io {
                path: log_dir.clone(),
                source,
            })?;
        }

        Ok(log_dir)
    }
}
