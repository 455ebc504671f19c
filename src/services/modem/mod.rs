//! CDMA modem control: ports, capabilities and workflows.

mod error;
mod family;
mod generic;
mod pending;
mod ports;
/// Parsers for fixed AT reply formats
pub mod response;
mod service;
mod simple;
mod types;

pub use error::{ErrorKind, ModemError};
pub use family::{ModemContext, ModemFamily, family_by_name};
pub use generic::GenericCdma;
pub use pending::Pending;
pub use ports::{Port, PortRegistry};
pub use service::Modem;
pub use simple::dial_number;
pub use types::{
    Capability, CardInfo, IpMethod, ModemInfo, ModemStatus, PortRole, Properties, PropertyValue,
    ServingSystem, Subsystem,
};
