mod log_level;

pub use log_level::LogLevel;
use serde::{Deserialize, Serialize};

/// Daemon-wide settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct GeneralConfig {
    /// Verbosity used when `RUST_LOG` is not set.
    #[serde(default)]
    pub log_level: LogLevel,
}
