use std::env;

use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{Builder, Rotation},
};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{ModemctlError, Result, config::ConfigPaths, config::LogLevel};

const FORMAT_VAR: &str = "MODEMCTL_LOG_FORMAT";
const DAYS_TO_KEEP: usize = 7;

/// Output format selected through `MODEMCTL_LOG_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    fn from_env() -> Self {
        match env::var(FORMAT_VAR).as_deref() {
            Ok("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

fn env_filter(level: LogLevel) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()))
}

fn init_failed(err: impl std::fmt::Display) -> ModemctlError {
    ModemctlError::Logging(err.to_string())
}

/// Initialize console logging
///
/// `RUST_LOG` wins over `level`. Output is pretty unless
/// `MODEMCTL_LOG_FORMAT=json`.
///
/// # Errors
/// Returns `ModemctlError::Logging` if a subscriber is already installed
pub fn init(level: LogLevel) -> Result<()> {
    let registry = tracing_subscriber::registry().with(env_filter(level));

    match LogFormat::from_env() {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_target(true).with_level(true))
            .try_init(),
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .pretty()
                    .with_target(true)
                    .with_level(true)
                    .with_thread_ids(true),
            )
            .try_init(),
    }
    .map_err(init_failed)
}

/// Initialize console logging plus a daily rotated log file
///
/// Used by the daemon. Keep the returned guard alive for as long as logs
/// should reach the file.
///
/// # Errors
/// Returns `ModemctlError::Logging` if the log directory or file cannot be
/// created, or a subscriber is already installed
pub fn init_with_file(level: LogLevel) -> Result<WorkerGuard> {
    let log_dir = ConfigPaths::log_dir()?;

    let file_appender = Builder::new()
        .rotation(Rotation::DAILY)
        .max_log_files(DAYS_TO_KEEP)
        .filename_prefix("modemctl")
        .filename_suffix("log")
        .build(&log_dir)
        .map_err(init_failed)?;
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let registry = tracing_subscriber::registry().with(env_filter(level));

    match LogFormat::from_env() {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stdout),
            )
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(file_writer)
                    .with_ansi(false),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .pretty()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_writer(std::io::stdout),
            )
            .with(
                fmt::layer()
                    .compact()
                    .with_target(true)
                    .with_writer(file_writer)
                    .with_ansi(false),
            )
            .try_init(),
    }
    .map_err(init_failed)?;

    Ok(guard)
}
