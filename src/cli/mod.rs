//! Command-line front end of the daemon.

pub mod formatting;
mod report;
mod setup;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use report::ProbeReport;
pub use setup::{hold_call, modem_from_config, serial_queue};

/// Drive a CDMA modem over its AT command ports.
#[derive(Parser, Debug)]
#[command(name = "modemctl", version)]
pub struct Cli {
    /// Configuration file; defaults to `$XDG_CONFIG_HOME/modemctl/config.toml`
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// What to do with the modem
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Publish the modem on D-Bus until interrupted
    Serve,
    /// Enable the modem and report identity, signal and serving system
    Probe,
    /// Enable the modem, dial `number` and hold the call until interrupted
    Connect {
        /// Number to dial, e.g. `#777`
        number: String,
    },
    /// Reset the modem and end a call left up by another program
    Hangup,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_flags_go_anywhere() {
        let cli = Cli::parse_from(["modemctl", "connect", "#777", "--json", "-c", "/tmp/m.toml"]);
        assert!(cli.json);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/m.toml")));
        assert_eq!(
            cli.command,
            Command::Connect {
                number: "#777".to_owned()
            }
        );
    }

    #[test]
    fn connect_requires_a_number() {
        assert!(Cli::try_parse_from(["modemctl", "connect"]).is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
