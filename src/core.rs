use thiserror::Error;

use crate::{
    config::ConfigError,
    services::{bus::BusError, modem::ModemError},
};

/// Top-level errors of the daemon.
#[derive(Error, Debug)]
pub enum ModemctlError {
    /// Configuration could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A modem operation failed
    #[error(transparent)]
    Modem(#[from] ModemError),

    /// Publishing on the message bus failed
    #[error(transparent)]
    Bus(#[from] BusError),

    /// Logging could not be set up
    #[error("failed to initialize logging: {0}")]
    Logging(String),

    /// I/O error outside configuration loading
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized `Result` type for modemctl operations.
pub type Result<T> = std::result::Result<T, ModemctlError>;
