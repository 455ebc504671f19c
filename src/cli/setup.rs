use std::{collections::HashMap, sync::Arc};

use tracing::{info, warn};

use crate::{
    config::{ConfigError, ModemConfig},
    services::{
        modem::{Modem, ModemError, family_by_name},
        serial::{CommandQueue, EndpointOpener, SerialQueue},
    },
};

/// Serial transport for the configured ports.
pub fn serial_queue(config: &ModemConfig) -> SerialQueue {
    let endpoints: HashMap<_, _> = config
        .ports
        .iter()
        .map(|port| (port.name.clone(), port.endpoint()))
        .collect();
    SerialQueue::new(EndpointOpener::new(endpoints))
}

/// Build the configured modem over `queue` and claim its ports in order.
///
/// # Errors
/// Returns `ConfigError::InvalidField` if the family is unknown
pub fn modem_from_config(
    config: &ModemConfig,
    queue: Arc<dyn CommandQueue>,
) -> Result<Modem, ConfigError> {
    let family = family_by_name(&config.family).ok_or_else(|| ConfigError::InvalidField {
        field: String::from("modem.family"),
        reason: format!("unknown modem family '{}'", config.family),
    })?;

    let modem = Modem::new(config.info(), family, queue);
    modem.set_ip_method(config.ip_method);

    for port in &config.ports {
        match modem.grab_port(&port.subsystem, &port.name) {
            Some(role) => info!(port = %port.name, %role, "Configured port claimed"),
            None => warn!(port = %port.name, subsystem = %port.subsystem, "Port not usable by the modem"),
        }
    }

    Ok(modem)
}

/// Keep a placed call up until `until` completes, then hang up and close the ports.
///
/// # Errors
/// Returns the first failure of hanging up or disabling
pub async fn hold_call(
    modem: &Modem,
    until: impl Future<Output = ()>,
) -> Result<(), ModemError> {
    until.await;
    info!("Ending call");
    modem.hang_up().await?;
    modem.disable().await
}
