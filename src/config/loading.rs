use std::{collections::HashSet, fs, io, path::Path};

use tracing::{debug, info};

use super::{Config, ConfigError, ConfigPaths};
use crate::services::modem::family_by_name;

impl Config {
    /// Loads the configuration from the default location
    ///
    /// # Errors
    /// Returns an error if the location is unknown or the file is invalid
    pub fn load() -> Result<Config, ConfigError> {
        Self::load_from(&ConfigPaths::main_config()?)
    }

    /// Loads the configuration at `path`
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, is not valid TOML, or
    /// holds values the daemon cannot use
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                info!(path = %path.display(), "No config file, using defaults");
                return Ok(Config::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let config: Config = toml::from_str(&content).map_err(|err| ConfigError::TomlParse {
            path: path.to_path_buf(),
            details: err.to_string(),
        })?;
        config.validate()?;

        debug!(path = %path.display(), "Config loaded");
        Ok(config)
    }

    /// Checks values serde cannot
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidField` naming the first offending field
    pub fn validate(&self) -> Result<(), ConfigError> {
        if family_by_name(&self.modem.family).is_none() {
            return Err(ConfigError::InvalidField {
                field: String::from("modem.family"),
                reason: format!("unknown modem family '{}'", self.modem.family),
            });
        }

        let mut seen = HashSet::new();
        for port in &self.modem.ports {
            if port.name.is_empty() {
                return Err(ConfigError::InvalidField {
                    field: String::from("modem.ports.name"),
                    reason: String::from("port name is empty"),
                });
            }
            if !seen.insert(port.name.as_str()) {
                return Err(ConfigError::InvalidField {
                    field: String::from("modem.ports.name"),
                    reason: format!("port '{}' listed twice", port.name),
                });
            }
        }

        Ok(())
    }
}
