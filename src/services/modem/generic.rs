use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use super::{
    Capability, CardInfo, ModemContext, ModemError, ModemFamily, Port, ServingSystem, response,
};

const PROBE_TIMEOUT: Duration = Duration::from_secs(3);
const DIAL_TIMEOUT: Duration = Duration::from_secs(60);
const ENABLE_FLASH: Duration = Duration::from_millis(100);
const HANG_UP_FLASH: Duration = Duration::from_millis(1000);

const INIT_COMMAND: &str = "Z E0 V1 X4 &C1";
const VERBOSE_ERRORS_COMMAND: &str = "+CMEE=1";

/// Generic CDMA modem speaking the standard AT command set.
#[derive(Debug, Default, Clone, Copy)]
pub struct GenericCdma;

impl GenericCdma {
    /// Configuration name of the family.
    pub const NAME: &'static str = "generic";

    /// Secondary port when it is open, the primary port otherwise.
    fn probe_port<'a>(ctx: &'a ModemContext, capability: Capability) -> Result<&'a Port, ModemError> {
        match &ctx.secondary {
            Some(secondary) if ctx.queue.is_open(&secondary.name) => Ok(secondary),
            _ => ctx.require_primary(capability),
        }
    }
}

#[async_trait]
impl ModemFamily for GenericCdma {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    #[instrument(skip_all)]
    async fn enable(&self, ctx: &ModemContext) -> Result<(), ModemError> {
        let primary = ctx.require_primary(Capability::Enable)?;
        ctx.queue.open(&primary.name, &primary.settings)?;

        if let Some(secondary) = &ctx.secondary
            && let Err(err) = ctx.queue.open(&secondary.name, &secondary.settings)
        {
            warn!(port = %secondary.name, error = %err, "Secondary port unavailable");
        }

        ctx.queue.flash(&primary.name, ENABLE_FLASH).await?;
        ctx.queue
            .queue(&primary.name, INIT_COMMAND, PROBE_TIMEOUT)
            .await?;

        if let Err(err) = ctx
            .queue
            .queue(&primary.name, VERBOSE_ERRORS_COMMAND, PROBE_TIMEOUT)
            .await
        {
            warn!(error = %err, "Modem rejected verbose error reporting");
        }

        debug!(port = %primary.name, "Modem enabled");
        Ok(())
    }

    #[instrument(skip_all)]
    async fn disable(&self, ctx: &ModemContext) -> Result<(), ModemError> {
        let primary = ctx.require_primary(Capability::Disable)?;
        if let Some(secondary) = &ctx.secondary {
            ctx.queue.close(&secondary.name);
        }
        ctx.queue.close(&primary.name);
        Ok(())
    }

    #[instrument(skip(self, ctx))]
    async fn dial(&self, ctx: &ModemContext, number: &str) -> Result<(), ModemError> {
        let primary = ctx.require_primary(Capability::Dial)?;
        ctx.queue
            .queue(&primary.name, &format!("DT{number}"), DIAL_TIMEOUT)
            .await?;
        Ok(())
    }

    #[instrument(skip_all)]
    async fn hang_up(&self, ctx: &ModemContext) -> Result<(), ModemError> {
        let primary = ctx.require_primary(Capability::HangUp)?;
        ctx.queue.flash(&primary.name, HANG_UP_FLASH).await?;
        Ok(())
    }

    #[instrument(skip_all)]
    async fn card_info(&self, ctx: &ModemContext) -> Result<CardInfo, ModemError> {
        let port = &ctx.require_primary(Capability::CardInfo)?.name;

        let manufacturer = ctx.queue.queue_cached(port, "+GMI", PROBE_TIMEOUT);
        let model = ctx.queue.queue_cached(port, "+GMM", PROBE_TIMEOUT);
        let version = ctx.queue.queue_cached(port, "+GMR", PROBE_TIMEOUT);

        let (manufacturer, model, version) = futures::join!(manufacturer, model, version);
        let manufacturer = manufacturer?;
        let model = model?;
        let version = version?;

        Ok(CardInfo {
            manufacturer: response::strip_response(&manufacturer, "+GMI:").to_owned(),
            model: response::strip_response(&model, "+GMM:").to_owned(),
            version: response::strip_response(&version, "+GMR:").to_owned(),
        })
    }

    #[instrument(skip_all)]
    async fn signal_quality(&self, ctx: &ModemContext) -> Result<u32, ModemError> {
        let port = Self::probe_port(ctx, Capability::SignalQuality)?;
        let reply = ctx.queue.queue(&port.name, "+CSQ", PROBE_TIMEOUT).await?;
        response::signal_quality(&reply)
    }

    #[instrument(skip_all)]
    async fn esn(&self, ctx: &ModemContext) -> Result<String, ModemError> {
        let port = ctx.require_primary(Capability::Esn)?;
        let reply = ctx
            .queue
            .queue_cached(&port.name, "+GSN", PROBE_TIMEOUT)
            .await?;
        Ok(response::strip_response(&reply, "+GSN:").to_owned())
    }

    #[instrument(skip_all)]
    async fn serving_system(&self, ctx: &ModemContext) -> Result<ServingSystem, ModemError> {
        let port = ctx.require_primary(Capability::ServingSystem)?;
        let reply = ctx.queue.queue(&port.name, "+CSS?", PROBE_TIMEOUT).await?;
        response::serving_system(&reply)
    }
}
