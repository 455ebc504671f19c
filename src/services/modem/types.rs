use std::{collections::HashMap, fmt};

use serde::{Deserialize, Serialize};

/// Role a claimed port plays for its modem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PortRole {
    /// Main command and data channel
    Primary,
    /// Auxiliary channel for out-of-band queries during a call
    Secondary,
    /// Claimed but unused
    Ignored,
}

impl fmt::Display for PortRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortRole::Primary => write!(f, "primary"),
            PortRole::Secondary => write!(f, "secondary"),
            PortRole::Ignored => write!(f, "ignored"),
        }
    }
}

/// Kernel subsystem a channel was discovered under.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subsystem {
    /// Serial tty; the only kind this modem drives
    #[default]
    Tty,
    /// Network interface
    Net,
    /// Anything else
    #[serde(untagged)]
    Other(String),
}

impl From<&str> for Subsystem {
    fn from(value: &str) -> Self {
        match value {
            "tty" => Subsystem::Tty,
            "net" => Subsystem::Net,
            other => Subsystem::Other(other.to_owned()),
        }
    }
}

impl fmt::Display for Subsystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subsystem::Tty => write!(f, "tty"),
            Subsystem::Net => write!(f, "net"),
            Subsystem::Other(name) => write!(f, "{name}"),
        }
    }
}

/// How the host configures IP on the data connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IpMethod {
    /// PPP negotiation over the data port
    #[default]
    Ppp,
    /// Static addressing
    Static,
    /// DHCP on a network interface
    Dhcp,
}

impl IpMethod {
    /// Wire value used by the bus binding.
    pub fn as_u32(self) -> u32 {
        match self {
            IpMethod::Ppp => 0,
            IpMethod::Static => 1,
            IpMethod::Dhcp => 2,
        }
    }

    /// Parse a bus wire value.
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(IpMethod::Ppp),
            1 => Some(IpMethod::Static),
            2 => Some(IpMethod::Dhcp),
            _ => None,
        }
    }
}

/// Identity of the physical device a modem handle represents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModemInfo {
    /// Master device path (sysfs)
    pub device: String,
    /// Kernel driver name
    pub driver: String,
    /// Plugin that recognized the device
    pub plugin: String,
}

/// Capabilities dispatched to a modem family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Open and initialize the modem
    Enable,
    /// Close the modem
    Disable,
    /// Place a data call
    Dial,
    /// End a data call
    HangUp,
    /// Manufacturer, model and firmware version
    CardInfo,
    /// Normalized signal quality
    SignalQuality,
    /// Electronic serial number
    Esn,
    /// CDMA serving system registration
    ServingSystem,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::Enable => "enable",
            Capability::Disable => "disable",
            Capability::Dial => "dial",
            Capability::HangUp => "hang up",
            Capability::CardInfo => "card info",
            Capability::SignalQuality => "signal quality",
            Capability::Esn => "esn",
            Capability::ServingSystem => "serving system",
        };
        write!(f, "{name}")
    }
}

/// Joined identity strings of the card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardInfo {
    /// `+GMI` reply
    pub manufacturer: String,
    /// `+GMM` reply
    pub model: String,
    /// `+GMR` reply
    pub version: String,
}

/// Registration with a CDMA serving system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ServingSystem {
    /// Band class, 0..=4
    pub band_class: u32,
    /// Band letter, `A`..=`Z`
    pub band: char,
    /// System identifier, 0..=32767
    pub sid: u32,
}

/// Best-effort modem status; absent fields belong to probes that failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModemStatus {
    /// Signal quality in percent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signal_quality: Option<u32>,
    /// Serving system band class
    #[serde(skip_serializing_if = "Option::is_none")]
    pub band_class: Option<u32>,
    /// Serving system band
    #[serde(skip_serializing_if = "Option::is_none")]
    pub band: Option<char>,
    /// Serving system identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sid: Option<u32>,
}

/// Value in a caller-supplied property bag.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// String value
    String(String),
    /// Unsigned integer value
    U32(u32),
    /// Signed integer value
    I32(i32),
    /// Boolean value
    Bool(bool),
    /// A value of a type the modem has no use for, by type name
    Other(String),
}

impl PropertyValue {
    /// Human readable type name.
    pub fn type_name(&self) -> &str {
        match self {
            PropertyValue::String(_) => "string",
            PropertyValue::U32(_) => "uint32",
            PropertyValue::I32(_) => "int32",
            PropertyValue::Bool(_) => "boolean",
            PropertyValue::Other(name) => name,
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::String(value.to_owned())
    }
}

/// Named properties passed to composite workflows.
pub type Properties = HashMap<String, PropertyValue>;
