//! D-Bus publication of a modem under the ModemManager interfaces.

mod convert;
mod error;
mod interfaces;
mod server;

pub use convert::{properties_from_bus, status_to_bus};
pub use error::BusError;
pub use interfaces::{CdmaInterface, MODEM_TYPE_CDMA, ModemInterface, SimpleInterface};
pub use server::serve;
