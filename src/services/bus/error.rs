use zbus::DBusError;

use crate::services::modem::{ErrorKind, ModemError};

/// Errors returned to bus callers, named under
/// `org.freedesktop.ModemManager.Modem`.
#[derive(DBusError, Debug)]
#[zbus(prefix = "org.freedesktop.ModemManager.Modem")]
pub enum BusError {
    /// Bus-level failure
    #[zbus(error)]
    ZBus(zbus::Error),

    /// Serial transport failed
    Transport(String),

    /// Modem reply could not be understood
    Parse(String),

    /// No network service
    NoService(String),

    /// The modem cannot do this
    OperationNotSupported(String),

    /// The modem is not in a state to do this
    Precondition(String),

    /// Missing or mistyped arguments
    InvalidArgs(String),

    /// The operation never completed
    Abandoned(String),
}

impl From<ModemError> for BusError {
    fn from(err: ModemError) -> Self {
        let message = err.to_string();
        match err.kind() {
            ErrorKind::Transport => BusError::Transport(message),
            ErrorKind::Parse => BusError::Parse(message),
            ErrorKind::NoService => BusError::NoService(message),
            ErrorKind::NotSupported => BusError::OperationNotSupported(message),
            ErrorKind::Precondition => BusError::Precondition(message),
            ErrorKind::InvalidInput => BusError::InvalidArgs(message),
            ErrorKind::Abandoned => BusError::Abandoned(message),
        }
    }
}
