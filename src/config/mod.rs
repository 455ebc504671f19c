//! Daemon configuration.
//!
//! Loaded from `$XDG_CONFIG_HOME/modemctl/config.toml`. Every section and
//! field has a default, so a missing file or an empty section is valid.

mod bus;
mod error;
mod general;
mod loading;
mod modem;
mod paths;

pub use bus::{BusConfig, BusKind};
pub use error::ConfigError;
pub use general::{GeneralConfig, LogLevel};
pub use modem::{ModemConfig, PortConfig};
pub use paths::ConfigPaths;

use serde::{Deserialize, Serialize};

/// Complete daemon configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Daemon-wide settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// The modem to drive.
    #[serde(default)]
    pub modem: ModemConfig,

    /// Where the modem is published.
    #[serde(default)]
    pub bus: BusConfig,
}

#[cfg(test)]
mod tests;
