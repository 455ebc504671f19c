use std::collections::HashMap;

use tracing::{debug, instrument};
use zbus::{fdo, interface, object_server::SignalEmitter, zvariant::OwnedValue};

use crate::services::modem::{IpMethod, Modem};

use super::{BusError, convert};

/// `Type` property value of CDMA modems.
pub const MODEM_TYPE_CDMA: u32 = 2;

/// `org.freedesktop.ModemManager.Modem`
pub struct ModemInterface {
    modem: Modem,
}

impl ModemInterface {
    /// Publish `modem`'s generic interface.
    pub fn new(modem: Modem) -> Self {
        Self { modem }
    }
}

#[interface(name = "org.freedesktop.ModemManager.Modem")]
impl ModemInterface {
    #[instrument(skip(self))]
    async fn enable(&self, enable: bool) -> Result<(), BusError> {
        Ok(self.modem.set_enabled(enable).await?)
    }

    #[instrument(skip(self))]
    async fn connect(&self, number: String) -> Result<(), BusError> {
        Ok(self.modem.dial(&number).await?)
    }

    #[instrument(skip(self))]
    async fn disconnect(&self) -> Result<(), BusError> {
        Ok(self.modem.hang_up().await?)
    }

    /// Manufacturer, model and version.
    #[instrument(skip(self))]
    async fn get_info(&self) -> Result<(String, String, String), BusError> {
        let info = self.modem.card_info().await?;
        Ok((info.manufacturer, info.model, info.version))
    }

    #[zbus(property)]
    fn device(&self) -> String {
        self.modem.info().device.clone()
    }

    #[zbus(property)]
    fn data_device(&self) -> String {
        self.modem.data_device().unwrap_or_default()
    }

    #[zbus(property)]
    fn driver(&self) -> String {
        self.modem.info().driver.clone()
    }

    #[zbus(property)]
    fn plugin(&self) -> String {
        self.modem.info().plugin.clone()
    }

    #[zbus(property, name = "Type")]
    fn modem_type(&self) -> u32 {
        MODEM_TYPE_CDMA
    }

    #[zbus(property)]
    fn ip_method(&self) -> u32 {
        self.modem.ip_method().as_u32()
    }

    #[zbus(property)]
    fn set_ip_method(&mut self, value: u32) -> fdo::Result<()> {
        let method = IpMethod::from_u32(value)
            .ok_or_else(|| fdo::Error::InvalidArgs(format!("Unknown IP method {value}")))?;
        self.modem.set_ip_method(method);
        Ok(())
    }

    #[zbus(property)]
    fn valid(&self) -> bool {
        self.modem.is_valid()
    }
}

/// `org.freedesktop.ModemManager.Modem.Cdma`
pub struct CdmaInterface {
    modem: Modem,
}

impl CdmaInterface {
    /// Publish `modem`'s CDMA interface.
    pub fn new(modem: Modem) -> Self {
        Self { modem }
    }
}

#[interface(name = "org.freedesktop.ModemManager.Modem.Cdma")]
impl CdmaInterface {
    #[instrument(skip(self, emitter))]
    async fn get_signal_quality(
        &self,
        #[zbus(signal_emitter)] emitter: SignalEmitter<'_>,
    ) -> Result<u32, BusError> {
        let quality = self.modem.signal_quality().await?;
        Self::signal_quality(&emitter, quality).await?;
        Ok(quality)
    }

    #[instrument(skip(self))]
    async fn get_esn(&self) -> Result<String, BusError> {
        Ok(self.modem.esn().await?)
    }

    #[instrument(skip(self))]
    async fn get_serving_system(&self) -> Result<(u32, String, u32), BusError> {
        let system = self.modem.serving_system().await?;
        Ok((system.band_class, system.band.to_string(), system.sid))
    }

    /// Emitted after every successful signal quality query.
    #[zbus(signal)]
    async fn signal_quality(emitter: &SignalEmitter<'_>, quality: u32) -> zbus::Result<()>;
}

/// `org.freedesktop.ModemManager.Modem.Simple`
pub struct SimpleInterface {
    modem: Modem,
}

impl SimpleInterface {
    /// Publish `modem`'s simple interface.
    pub fn new(modem: Modem) -> Self {
        Self { modem }
    }
}

#[interface(name = "org.freedesktop.ModemManager.Modem.Simple")]
impl SimpleInterface {
    #[instrument(skip_all)]
    async fn connect(&self, properties: HashMap<String, OwnedValue>) -> Result<(), BusError> {
        let properties = convert::properties_from_bus(&properties);
        debug!(keys = ?properties.keys().collect::<Vec<_>>(), "Simple connect requested");
        Ok(self.modem.connect_simple(&properties).await?)
    }

    #[instrument(skip(self))]
    async fn get_status(&self) -> Result<HashMap<String, OwnedValue>, BusError> {
        let status = self.modem.status().await?;
        convert::status_to_bus(&status)
    }
}
