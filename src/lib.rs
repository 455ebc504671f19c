//! modemctl - CDMA modem control daemon.
//!
//! Drives a CDMA modem through its AT command ports and publishes it on
//! D-Bus under the ModemManager interfaces.
//!
//! - Per-port FIFO command queues over serial devices or TCP bridges
//! - Capability dispatch to modem families
//! - Composite workflows (simple connect, status)
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use modemctl::{
//!     config::Config,
//!     services::{
//!         modem::{GenericCdma, Modem, ModemInfo, Subsystem},
//!         serial::{EndpointOpener, SerialQueue},
//!     },
//! };
//!
//! # async fn run() -> modemctl::Result<()> {
//! let config = Config::load()?;
//! let queue = Arc::new(SerialQueue::new(EndpointOpener::default()));
//! let modem = Modem::new(config.modem.info(), Arc::new(GenericCdma), queue);
//!
//! modem.grab_port(&Subsystem::Tty, "ttyUSB0");
//! modem.enable().await?;
//! println!("signal: {}%", modem.signal_quality().await?);
//! # Ok(())
//! # }
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

/// Command-line front end.
pub mod cli;

/// Daemon configuration.
pub mod config;

/// Crate-level error types and result aliases.
pub mod core;

/// Modem, transport and bus services.
pub mod services;

/// Logging setup.
pub mod tracing_config;

pub use core::{ModemctlError, Result};
