use serde::{Deserialize, Serialize};

/// Message bus to publish the modem on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BusKind {
    /// Per-user session bus
    Session,
    /// System bus
    #[default]
    System,
}

/// D-Bus publication settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BusConfig {
    /// Bus to connect to.
    pub kind: BusKind,
    /// Well-known name to request.
    pub name: String,
    /// Object path the modem is served at.
    pub path: String,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            kind: BusKind::default(),
            name: String::from("org.freedesktop.ModemManager"),
            path: String::from("/org/freedesktop/ModemManager/Modems/0"),
        }
    }
}
