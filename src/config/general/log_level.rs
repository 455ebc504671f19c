use serde::{Deserialize, Serialize};
use std::fmt;

/// Log verbosity, from errors only to full command traces.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Failures that stop an operation.
    Error,

    /// Failures the modem recovers from, e.g. a skipped status probe.
    Warn,

    /// Port claims, validity changes and workflow results.
    #[default]
    Info,

    /// Operation lifecycles and workflow steps.
    Debug,

    /// Every AT command and reply line.
    Trace,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Error => write!(f, "error"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Trace => write!(f, "trace"),
        }
    }
}
