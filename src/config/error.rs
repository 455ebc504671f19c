use std::{io, path::PathBuf};

use thiserror::Error;

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration directory could not be determined
    #[error("cannot locate config directory: neither XDG_CONFIG_HOME nor HOME is set")]
    NoConfigDir,

    /// Configuration file could not be read
    #[error("I/O error on '{path}': {source}")]
    Io {
        /// File being read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// TOML syntax or schema error
    #[error("failed to parse TOML at '{path}': {details}")]
    TomlParse {
        /// File being parsed
        path: PathBuf,
        /// Parse error details
        details: String,
    },

    /// Well-formed TOML with an unusable value
    #[error("invalid config field '{field}': {reason}")]
    InvalidField {
        /// Dotted path of the field
        field: String,
        /// Why the value was rejected
        reason: String,
    },
}
