use serde::{Deserialize, Serialize};

use crate::services::{
    modem::{GenericCdma, IpMethod, ModemInfo, Subsystem},
    serial::Endpoint,
};

/// The modem device and the ports it is claimed with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ModemConfig {
    /// Master device path.
    pub device: String,
    /// Kernel driver name.
    pub driver: String,
    /// Plugin name reported on the bus.
    pub plugin: String,
    /// Modem family driving the device.
    pub family: String,
    /// How IP is configured once connected.
    pub ip_method: IpMethod,
    /// Ports in claim order; the first becomes primary.
    pub ports: Vec<PortConfig>,
}

impl Default for ModemConfig {
    fn default() -> Self {
        Self {
            device: String::from("/sys/devices/virtual/tty/ttyUSB0"),
            driver: String::from("option"),
            plugin: String::from("Generic"),
            family: String::from(GenericCdma::NAME),
            ip_method: IpMethod::default(),
            ports: Vec::new(),
        }
    }
}

impl ModemConfig {
    /// Device identity for the modem handle.
    pub fn info(&self) -> ModemInfo {
        ModemInfo {
            device: self.device.clone(),
            driver: self.driver.clone(),
            plugin: self.plugin.clone(),
        }
    }
}

/// A port offered to the modem.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PortConfig {
    /// Port name, e.g. `ttyUSB0`.
    pub name: String,
    /// Subsystem the port belongs to.
    #[serde(default)]
    pub subsystem: Subsystem,
    /// `tcp://host:port` or a device path; `/dev/<name>` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

impl PortConfig {
    /// Where the port's bytes flow.
    pub fn endpoint(&self) -> Endpoint {
        match &self.endpoint {
            Some(endpoint) => Endpoint::parse(endpoint),
            None => Endpoint::for_port(&self.name),
        }
    }
}
