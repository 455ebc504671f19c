//! Composite workflows built from single capabilities.

use std::sync::Arc;

use tracing::{debug, warn};

use super::{
    ModemContext, ModemError, ModemFamily, ModemStatus, Pending, Properties, PropertyValue,
};

/// Steps of a simple connect.
enum ConnectState {
    Begin,
    Enabling(Pending<()>),
    Connecting(Pending<()>),
    Done,
}

impl ConnectState {
    fn name(&self) -> &'static str {
        match self {
            ConnectState::Begin => "begin",
            ConnectState::Enabling(_) => "enabling",
            ConnectState::Connecting(_) => "connecting",
            ConnectState::Done => "done",
        }
    }
}

/// The `number` to dial from a connect property bag.
///
/// # Errors
/// Returns `ModemError::MissingProperty` if absent and
/// `ModemError::InvalidPropertyType` if it is not a string
pub fn dial_number(properties: &Properties) -> Result<String, ModemError> {
    match properties.get("number") {
        Some(PropertyValue::String(number)) => Ok(number.clone()),
        Some(other) => Err(ModemError::InvalidPropertyType {
            name: "number".to_owned(),
            expected: "string",
            actual: other.type_name().to_owned(),
        }),
        None => Err(ModemError::MissingProperty("number".to_owned())),
    }
}

/// Enable the modem, then dial `number`.
///
/// Each step is a separate capability operation; the first failure ends the
/// workflow with that error.
pub(crate) async fn connect(
    family: Arc<dyn ModemFamily>,
    ctx: ModemContext,
    number: String,
) -> Result<(), ModemError> {
    let mut state = ConnectState::Begin;

    loop {
        debug!(state = state.name(), "Simple connect");
        state = match state {
            ConnectState::Begin => {
                let family = Arc::clone(&family);
                let ctx = ctx.clone();
                ConnectState::Enabling(Pending::spawn("enable", async move {
                    family.enable(&ctx).await
                }))
            }
            ConnectState::Enabling(enabling) => {
                enabling.await?;
                let family = Arc::clone(&family);
                let ctx = ctx.clone();
                let number = number.clone();
                ConnectState::Connecting(Pending::spawn("dial", async move {
                    family.dial(&ctx, &number).await
                }))
            }
            ConnectState::Connecting(dialing) => {
                dialing.await?;
                ConnectState::Done
            }
            ConnectState::Done => return Ok(()),
        };
    }
}

/// Collect whatever status the modem can report.
///
/// Probes run concurrently; a failed probe leaves its fields empty.
pub(crate) async fn status(family: Arc<dyn ModemFamily>, ctx: ModemContext) -> ModemStatus {
    let (quality, system) = futures::join!(family.signal_quality(&ctx), family.serving_system(&ctx));

    let mut status = ModemStatus::default();

    match quality {
        Ok(quality) => status.signal_quality = Some(quality),
        Err(err) => warn!(error = %err, "Signal quality unavailable for status"),
    }

    match system {
        Ok(system) => {
            status.band_class = Some(system.band_class);
            status.band = Some(system.band);
            status.sid = Some(system.sid);
        }
        Err(err) => warn!(error = %err, "Serving system unavailable for status"),
    }

    status
}
