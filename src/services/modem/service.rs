use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::Stream;
use tracing::{debug, info, instrument, warn};

use crate::services::{common::Property, serial::CommandQueue};

use super::{
    CardInfo, IpMethod, ModemContext, ModemFamily, ModemInfo, ModemStatus, Pending, PortRegistry,
    PortRole, Properties, ServingSystem, Subsystem, simple,
};

/// One CDMA modem device.
///
/// Cheap to clone; all clones share the same ports and state. Every
/// capability returns a [`Pending`] that completes on its own task, whether
/// the family supports the capability or not.
#[derive(Clone)]
pub struct Modem {
    inner: Arc<Inner>,
}

struct Inner {
    info: ModemInfo,
    ip_method: Property<IpMethod>,
    ports: Mutex<PortRegistry>,
    valid: Property<bool>,
    data_device: Property<Option<String>>,
    queue: Arc<dyn CommandQueue>,
    family: Arc<dyn ModemFamily>,
}

impl Modem {
    /// Create a modem with no ports, driven by `family` over `queue`.
    pub fn new(
        info: ModemInfo,
        family: Arc<dyn ModemFamily>,
        queue: Arc<dyn CommandQueue>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                info,
                ip_method: Property::new(IpMethod::default()),
                ports: Mutex::new(PortRegistry::default()),
                valid: Property::new(false),
                data_device: Property::new(None),
                queue,
                family,
            }),
        }
    }

    /// Device identity.
    pub fn info(&self) -> &ModemInfo {
        &self.inner.info
    }

    /// Name of the family driving this modem.
    pub fn family_name(&self) -> &'static str {
        self.inner.family.name()
    }

    /// Whether the modem has a primary port.
    pub fn is_valid(&self) -> bool {
        self.inner.valid.get()
    }

    /// Changes of validity, starting with the current value.
    pub fn watch_valid(&self) -> impl Stream<Item = bool> + Send + use<> {
        self.inner.valid.watch()
    }

    /// Name of the port carrying data, i.e. the primary port.
    pub fn data_device(&self) -> Option<String> {
        self.inner.data_device.get()
    }

    /// Changes of the data device, starting with the current value.
    pub fn watch_data_device(&self) -> impl Stream<Item = Option<String>> + Send + use<> {
        self.inner.data_device.watch()
    }

    pub(crate) fn valid_property(&self) -> &Property<bool> {
        &self.inner.valid
    }

    pub(crate) fn data_device_property(&self) -> &Property<Option<String>> {
        &self.inner.data_device
    }

    /// How IP is configured on the data connection.
    pub fn ip_method(&self) -> IpMethod {
        self.inner.ip_method.get()
    }

    /// Change how IP is configured on the data connection.
    pub fn set_ip_method(&self, method: IpMethod) {
        if self.inner.ip_method.set(method) {
            debug!(?method, "IP method changed");
        }
    }

    /// Whether this modem holds the port `name`.
    pub fn owns_port(&self, subsystem: &Subsystem, name: &str) -> bool {
        PortRegistry::handles(subsystem) && self.ports().owns(name)
    }

    /// Claim the port `name`, returning its role.
    ///
    /// Returns `None` for subsystems the modem does not handle.
    #[instrument(skip(self))]
    pub fn grab_port(&self, subsystem: &Subsystem, name: &str) -> Option<PortRole> {
        if !PortRegistry::handles(subsystem) {
            debug!("Subsystem not handled");
            return None;
        }

        let role = self.ports().claim(name);
        info!(%role, "Port claimed");
        if role == PortRole::Primary {
            self.refresh();
        }
        Some(role)
    }

    /// Release the port `name`, returning whether the subsystem is handled.
    ///
    /// Releasing a port the modem does not hold is not an error.
    #[instrument(skip(self))]
    pub fn release_port(&self, subsystem: &Subsystem, name: &str) -> bool {
        if !PortRegistry::handles(subsystem) {
            return false;
        }

        let released = self.ports().release(name);
        match released {
            Some(port) => {
                info!(role = %port.role, "Port released");
                if self.inner.queue.is_open(&port.name) {
                    self.inner.queue.close(&port.name);
                }
                if port.role == PortRole::Primary {
                    self.refresh();
                }
            }
            None => debug!("Port not held"),
        }
        true
    }

    /// Open and initialize the modem.
    pub fn enable(&self) -> Pending<()> {
        self.run("enable", |family, ctx| async move { family.enable(&ctx).await })
    }

    /// Close the modem.
    pub fn disable(&self) -> Pending<()> {
        self.run("disable", |family, ctx| async move { family.disable(&ctx).await })
    }

    /// Enable or disable the modem.
    pub fn set_enabled(&self, enabled: bool) -> Pending<()> {
        if enabled { self.enable() } else { self.disable() }
    }

    /// Dial `number` on the primary port.
    pub fn dial(&self, number: &str) -> Pending<()> {
        let number = number.to_owned();
        self.run("dial", move |family, ctx| async move {
            family.dial(&ctx, &number).await
        })
    }

    /// End the data call.
    pub fn hang_up(&self) -> Pending<()> {
        self.run("hang_up", |family, ctx| async move {
            let result = family.hang_up(&ctx).await;
            if let Err(err) = &result {
                warn!(error = %err, "Hang up failed");
            }
            result
        })
    }

    /// Manufacturer, model and firmware version.
    pub fn card_info(&self) -> Pending<CardInfo> {
        self.run("card_info", |family, ctx| async move {
            family.card_info(&ctx).await
        })
    }

    /// Signal quality in percent.
    pub fn signal_quality(&self) -> Pending<u32> {
        self.run("signal_quality", |family, ctx| async move {
            family.signal_quality(&ctx).await
        })
    }

    /// Electronic serial number.
    pub fn esn(&self) -> Pending<String> {
        self.run("esn", |family, ctx| async move { family.esn(&ctx).await })
    }

    /// Current serving system.
    pub fn serving_system(&self) -> Pending<ServingSystem> {
        self.run("serving_system", |family, ctx| async move {
            family.serving_system(&ctx).await
        })
    }

    /// Enable the modem, then dial the `number` property.
    ///
    /// The property bag is checked before anything is issued.
    pub fn connect_simple(&self, properties: &Properties) -> Pending<()> {
        let number = simple::dial_number(properties);
        self.run("simple_connect", |family, ctx| async move {
            simple::connect(family, ctx, number?).await
        })
    }

    /// Best-effort status; never fails because a probe failed.
    pub fn status(&self) -> Pending<ModemStatus> {
        self.run("status", |family, ctx| async move {
            Ok(simple::status(family, ctx).await)
        })
    }

    fn run<T, F, Fut>(&self, name: &'static str, operation: F) -> Pending<T>
    where
        T: Send + 'static,
        F: FnOnce(Arc<dyn ModemFamily>, ModemContext) -> Fut,
        Fut: Future<Output = Result<T, super::ModemError>> + Send + 'static,
    {
        let ctx = self.context();
        Pending::spawn(name, operation(Arc::clone(&self.inner.family), ctx))
    }

    fn context(&self) -> ModemContext {
        let ports = self.ports();
        ModemContext {
            primary: ports.primary().cloned(),
            secondary: ports.secondary().cloned(),
            queue: Arc::clone(&self.inner.queue),
        }
    }

    fn refresh(&self) {
        let (valid, data_device) = {
            let ports = self.ports();
            (ports.is_valid(), ports.primary().map(|port| port.name.clone()))
        };

        if self.inner.valid.set(valid) {
            info!(valid, "Modem validity changed");
        }
        self.inner.data_device.set(data_device);
    }

    fn ports(&self) -> MutexGuard<'_, PortRegistry> {
        self.inner
            .ports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for Modem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Modem")
            .field("device", &self.inner.info.device)
            .field("family", &self.inner.family.name())
            .field("valid", &self.inner.valid.get())
            .finish_non_exhaustive()
    }
}
