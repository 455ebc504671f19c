//! modemctl - publishes a CDMA modem on D-Bus or runs one workflow against it.

use std::{process, sync::Arc};

use clap::Parser;
use tracing::{info, instrument, warn};

use modemctl::{
    Result,
    cli::{
        Cli, Command, ProbeReport,
        formatting::{format_error, format_success},
        hold_call, modem_from_config, serial_queue,
    },
    config::Config,
    services::{
        bus,
        modem::{Modem, Properties, PropertyValue},
    },
    tracing_config,
};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        eprintln!("{}", format_error(&err.to_string()));
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let _guard = match cli.command {
        Command::Serve => Some(tracing_config::init_with_file(config.general.log_level)?),
        _ => {
            tracing_config::init(config.general.log_level)?;
            None
        }
    };

    let modem = modem_from_config(&config.modem, Arc::new(serial_queue(&config.modem)))?;

    match cli.command {
        Command::Serve => serve(modem, &config).await,
        Command::Probe => probe(&modem, cli.json).await,
        Command::Connect { number } => connect(&modem, &number, cli.json).await,
        Command::Hangup => hang_up(&modem, cli.json).await,
    }
}

#[instrument(skip_all, name = "modemctl_serve")]
async fn serve(modem: Modem, config: &Config) -> Result<()> {
    info!(device = %modem.info().device, "Starting modem daemon");

    let _connection = bus::serve(modem.clone(), &config.bus).await?;
    tokio::signal::ctrl_c().await?;

    info!("Shutting down");
    if modem.is_valid() {
        modem.disable().await?;
    }
    Ok(())
}

async fn probe(modem: &Modem, json: bool) -> Result<()> {
    modem.enable().await?;
    let report = ProbeReport::collect(modem).await;
    modem.disable().await?;

    if json {
        print_json(&report)
    } else {
        println!("{report}");
        Ok(())
    }
}

/// Dial and hold the call until interrupted; closing the port would drop it.
async fn connect(modem: &Modem, number: &str, json: bool) -> Result<()> {
    let properties = Properties::from([("number".to_owned(), PropertyValue::from(number))]);
    modem.connect_simple(&properties).await?;

    if json {
        print_json(&serde_json::json!({ "connected": true, "number": number }))?;
    } else {
        println!("{}", format_success(&format!("Connected to {number}")));
    }

    hold_call(modem, async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "Cannot wait for Ctrl-C");
        }
    })
    .await?;
    Ok(())
}

async fn hang_up(modem: &Modem, json: bool) -> Result<()> {
    modem.enable().await?;
    modem.hang_up().await?;

    if json {
        print_json(&serde_json::json!({ "connected": false }))
    } else {
        println!("{}", format_success("Call ended"));
        Ok(())
    }
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    let text = serde_json::to_string_pretty(value).map_err(std::io::Error::other)?;
    println!("{text}");
    Ok(())
}
