use tokio::sync::watch;
use tracing::{info, instrument, warn};
use zbus::{Connection, connection::Builder, object_server::InterfaceRef};

use crate::{
    config::{BusConfig, BusKind},
    services::modem::Modem,
};

use super::{BusError, CdmaInterface, ModemInterface, SimpleInterface};

/// Publish `modem` on the bus described by `config`.
///
/// The returned connection keeps the object alive; `Valid` and `DataDevice`
/// change notifications follow the modem until it is dropped.
///
/// # Errors
/// Returns `BusError::ZBus` if the bus is unreachable, the name is taken or
/// the path is malformed
#[instrument(skip(modem))]
pub async fn serve(modem: Modem, config: &BusConfig) -> Result<Connection, BusError> {
    let builder = match config.kind {
        BusKind::Session => Builder::session()?,
        BusKind::System => Builder::system()?,
    };

    let connection = builder
        .name(config.name.as_str())?
        .serve_at(config.path.as_str(), ModemInterface::new(modem.clone()))?
        .serve_at(config.path.as_str(), CdmaInterface::new(modem.clone()))?
        .serve_at(config.path.as_str(), SimpleInterface::new(modem.clone()))?
        .build()
        .await?;

    let iface = connection
        .object_server()
        .interface::<_, ModemInterface>(config.path.as_str())
        .await?;
    tokio::spawn(forward_changes(
        iface,
        modem.valid_property().subscribe(),
        modem.data_device_property().subscribe(),
    ));

    info!(name = %config.name, path = %config.path, "Modem published");
    Ok(connection)
}

async fn forward_changes(
    iface: InterfaceRef<ModemInterface>,
    mut valid: watch::Receiver<bool>,
    mut data_device: watch::Receiver<Option<String>>,
) {
    loop {
        let result = tokio::select! {
            changed = valid.changed() => {
                if changed.is_err() {
                    break;
                }
                iface.get().await.valid_changed(iface.signal_emitter()).await
            }
            changed = data_device.changed() => {
                if changed.is_err() {
                    break;
                }
                iface.get().await.data_device_changed(iface.signal_emitter()).await
            }
        };

        if let Err(err) = result {
            warn!(error = %err, "Failed to emit property change");
        }
    }
}
