use std::{fmt, io, time::Duration};

/// Final result codes that terminate a failed command exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalResult {
    /// Plain `ERROR`
    Error,
    /// `NO CARRIER`
    NoCarrier,
    /// `BUSY`
    Busy,
    /// `NO ANSWER`
    NoAnswer,
    /// `NO DIALTONE`
    NoDialtone,
}

impl fmt::Display for FinalResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FinalResult::Error => write!(f, "ERROR"),
            FinalResult::NoCarrier => write!(f, "NO CARRIER"),
            FinalResult::Busy => write!(f, "BUSY"),
            FinalResult::NoAnswer => write!(f, "NO ANSWER"),
            FinalResult::NoDialtone => write!(f, "NO DIALTONE"),
        }
    }
}

/// Serial transport errors
#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    /// Port could not be opened
    #[error("Failed to open port {port}: {reason}")]
    OpenFailed {
        /// Port name
        port: String,
        /// Reason for the failure
        reason: String,
    },

    /// Command queued on a port that is not open
    #[error("Port {0} is not open")]
    NotOpen(String),

    /// Port was closed while the command was queued or in flight
    #[error("Port {0} was closed before the command completed")]
    Closed(String),

    /// No final result arrived in time
    #[error("Command '{command}' timed out after {timeout:?}")]
    Timeout {
        /// Command text without the `AT` prefix
        command: String,
        /// Timeout that elapsed
        timeout: Duration,
    },

    /// Channel I/O failed
    #[error("I/O error on port {port}: {source}")]
    Io {
        /// Port name
        port: String,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// Modem answered with a failing final result
    #[error("Modem replied {0}")]
    Final(FinalResult),

    /// Modem answered with an extended `+CME ERROR` / `+CMS ERROR`
    #[error("Mobile equipment error: {0}")]
    MobileEquipment(String),
}
