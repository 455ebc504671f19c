use std::sync::Arc;

use async_trait::async_trait;

use crate::services::serial::CommandQueue;

use super::{Capability, CardInfo, ModemError, Port, ServingSystem, generic::GenericCdma};

/// Ports and transport a capability runs against, captured when it is invoked.
#[derive(Clone)]
pub struct ModemContext {
    /// Primary port at invocation time
    pub primary: Option<Port>,
    /// Secondary port at invocation time
    pub secondary: Option<Port>,
    /// Transport the commands are queued on
    pub queue: Arc<dyn CommandQueue>,
}

impl ModemContext {
    /// The primary port, required by `capability`.
    ///
    /// # Errors
    /// Returns `ModemError::NoPrimaryPort` if no primary port is claimed
    pub fn require_primary(&self, capability: Capability) -> Result<&Port, ModemError> {
        self.primary
            .as_ref()
            .ok_or(ModemError::NoPrimaryPort(capability))
    }
}

/// Capability implementations of one modem family.
///
/// Every capability defaults to `ModemError::NotSupported`; families override
/// what their hardware can do.
#[async_trait]
pub trait ModemFamily: Send + Sync + 'static {
    /// Family name used in configuration and logs.
    fn name(&self) -> &'static str;

    /// Open and initialize the modem.
    async fn enable(&self, _ctx: &ModemContext) -> Result<(), ModemError> {
        Err(ModemError::NotSupported(Capability::Enable))
    }

    /// Close the modem.
    async fn disable(&self, _ctx: &ModemContext) -> Result<(), ModemError> {
        Err(ModemError::NotSupported(Capability::Disable))
    }

    /// Dial `number`.
    async fn dial(&self, _ctx: &ModemContext, _number: &str) -> Result<(), ModemError> {
        Err(ModemError::NotSupported(Capability::Dial))
    }

    /// End the data call.
    async fn hang_up(&self, _ctx: &ModemContext) -> Result<(), ModemError> {
        Err(ModemError::NotSupported(Capability::HangUp))
    }

    /// Query manufacturer, model and version.
    async fn card_info(&self, _ctx: &ModemContext) -> Result<CardInfo, ModemError> {
        Err(ModemError::NotSupported(Capability::CardInfo))
    }

    /// Query signal quality in percent.
    async fn signal_quality(&self, _ctx: &ModemContext) -> Result<u32, ModemError> {
        Err(ModemError::NotSupported(Capability::SignalQuality))
    }

    /// Query the electronic serial number.
    async fn esn(&self, _ctx: &ModemContext) -> Result<String, ModemError> {
        Err(ModemError::NotSupported(Capability::Esn))
    }

    /// Query the serving system.
    async fn serving_system(&self, _ctx: &ModemContext) -> Result<ServingSystem, ModemError> {
        Err(ModemError::NotSupported(Capability::ServingSystem))
    }
}

/// Look up a shipped family by its configuration name.
pub fn family_by_name(name: &str) -> Option<Arc<dyn ModemFamily>> {
    match name {
        GenericCdma::NAME => Some(Arc::new(GenericCdma)),
        _ => None,
    }
}
