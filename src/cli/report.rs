use std::fmt;

use serde::Serialize;
use tracing::warn;

use crate::services::modem::{CardInfo, Modem, ModemStatus};

use super::formatting::{format_field, format_header};

/// What `modemctl probe` found out about the modem.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeReport {
    /// Device path
    pub device: String,
    /// Port carrying data
    pub data_device: Option<String>,
    /// Family driving the modem
    pub family: &'static str,
    /// Card identity, if it could be read
    pub card: Option<CardInfo>,
    /// Electronic serial number, if it could be read
    pub esn: Option<String>,
    /// Signal and serving system
    pub status: ModemStatus,
}

impl ProbeReport {
    /// Query an enabled modem.
    ///
    /// Queries that fail are logged and left out of the report.
    pub async fn collect(modem: &Modem) -> Self {
        let (card, esn, status) = futures::join!(modem.card_info(), modem.esn(), modem.status());

        let card = card
            .inspect_err(|err| warn!(error = %err, "Card info unavailable"))
            .ok();
        let esn = esn
            .inspect_err(|err| warn!(error = %err, "ESN unavailable"))
            .ok();

        Self {
            device: modem.info().device.clone(),
            data_device: modem.data_device(),
            family: modem.family_name(),
            card,
            esn,
            status: status.unwrap_or_default(),
        }
    }
}

impl fmt::Display for ProbeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let quality = self.status.signal_quality.map(|q| format!("{q}%"));
        let system = match (self.status.band_class, self.status.band, self.status.sid) {
            (Some(class), Some(band), Some(sid)) => Some(format!("class {class}, band {band}, SID {sid}")),
            _ => None,
        };

        writeln!(f, "{}", format_header(&self.device))?;
        writeln!(f, "{}", format_field("Family", Some(self.family)))?;
        writeln!(f, "{}", format_field("Data device", self.data_device.as_deref()))?;
        writeln!(
            f,
            "{}",
            format_field("Manufacturer", self.card.as_ref().map(|c| c.manufacturer.as_str()))
        )?;
        writeln!(
            f,
            "{}",
            format_field("Model", self.card.as_ref().map(|c| c.model.as_str()))
        )?;
        writeln!(
            f,
            "{}",
            format_field("Version", self.card.as_ref().map(|c| c.version.as_str()))
        )?;
        writeln!(f, "{}", format_field("ESN", self.esn.as_deref()))?;
        writeln!(f, "{}", format_field("Signal", quality.as_deref()))?;
        write!(f, "{}", format_field("Serving system", system.as_deref()))
    }
}
