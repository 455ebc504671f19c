use crate::services::serial::TransportError;

use super::Capability;

/// Broad classes of modem errors callers branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Channel I/O, timeout or failing result code
    Transport,
    /// Reply did not match the expected grammar
    Parse,
    /// Valid reply reporting no network presence
    NoService,
    /// Capability absent for this modem family
    NotSupported,
    /// Operation invoked in a state it cannot run in
    Precondition,
    /// Caller input was missing or of the wrong type
    InvalidInput,
    /// Operation vanished before completing
    Abandoned,
}

/// Modem service errors
#[derive(thiserror::Error, Debug)]
pub enum ModemError {
    /// Transport failure, propagated as reported by the queue
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Reply did not match the expected grammar
    #[error("Could not parse {what} results: '{reply}'")]
    Parse {
        /// What was being parsed
        what: &'static str,
        /// Offending reply
        reply: String,
    },

    /// Modem reports no network service
    #[error("No service")]
    NoService,

    /// Modem family does not implement the capability
    #[error("Operation not supported: {0}")]
    NotSupported(Capability),

    /// Capability needs a primary port and none is claimed
    #[error("Cannot {0} without a primary port")]
    NoPrimaryPort(Capability),

    /// Required workflow property absent
    #[error("Missing {0} property")]
    MissingProperty(String),

    /// Workflow property present with the wrong type
    #[error("Invalid property type for '{name}': {actual} ({expected} expected)")]
    InvalidPropertyType {
        /// Property name
        name: String,
        /// Expected type
        expected: &'static str,
        /// Supplied type
        actual: String,
    },

    /// The task completing the operation went away without an answer
    #[error("Operation abandoned before completion")]
    Abandoned,
}

impl ModemError {
    /// Classify the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ModemError::Transport(_) => ErrorKind::Transport,
            ModemError::Parse { .. } => ErrorKind::Parse,
            ModemError::NoService => ErrorKind::NoService,
            ModemError::NotSupported(_) => ErrorKind::NotSupported,
            ModemError::NoPrimaryPort(_) => ErrorKind::Precondition,
            ModemError::MissingProperty(_) | ModemError::InvalidPropertyType { .. } => {
                ErrorKind::InvalidInput
            }
            ModemError::Abandoned => ErrorKind::Abandoned,
        }
    }

    pub(crate) fn parse(what: &'static str, reply: &str) -> Self {
        ModemError::Parse {
            what,
            reply: reply.to_owned(),
        }
    }
}
