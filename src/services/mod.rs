/// D-Bus publication of modems
pub mod bus;
/// Shared service building blocks
pub mod common;
/// CDMA modem control
pub mod modem;
/// Serial AT command transport
pub mod serial;
