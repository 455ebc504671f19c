use std::collections::HashMap;

use crate::services::serial::{PortSettings, ResponseGrammar};

use super::{PortRole, Subsystem};

/// A channel claimed by a modem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Port {
    /// Channel name, e.g. `ttyUSB0`
    pub name: String,
    /// Role assigned at claim time
    pub role: PortRole,
    /// Line settings used when the port is opened
    pub settings: PortSettings,
}

/// Ports owned by one modem, classified by claim order.
///
/// The first claimed port becomes primary, the second secondary and any
/// further ports are kept but ignored.
#[derive(Debug, Default)]
pub struct PortRegistry {
    ports: HashMap<String, Port>,
    primary: Option<String>,
    secondary: Option<String>,
}

impl PortRegistry {
    /// Whether ports of this subsystem are handled at all.
    pub fn handles(subsystem: &Subsystem) -> bool {
        *subsystem == Subsystem::Tty
    }

    /// Whether the registry holds a port named `name`.
    pub fn owns(&self, name: &str) -> bool {
        self.ports.contains_key(name)
    }

    /// Claim `name`, returning the role it was given.
    ///
    /// Claiming a name that is already held returns its existing role.
    pub fn claim(&mut self, name: &str) -> PortRole {
        if let Some(existing) = self.ports.get(name) {
            return existing.role;
        }

        let role = if self.primary.is_none() {
            self.primary = Some(name.to_owned());
            PortRole::Primary
        } else if self.secondary.is_none() {
            self.secondary = Some(name.to_owned());
            PortRole::Secondary
        } else {
            PortRole::Ignored
        };

        self.ports.insert(
            name.to_owned(),
            Port {
                name: name.to_owned(),
                role,
                settings: PortSettings {
                    carrier_detect: false,
                    grammar: ResponseGrammar::V1,
                    ..PortSettings::default()
                },
            },
        );
        role
    }

    /// Release `name`, returning the removed port.
    pub fn release(&mut self, name: &str) -> Option<Port> {
        let port = self.ports.remove(name)?;
        match port.role {
            PortRole::Primary => self.primary = None,
            PortRole::Secondary => self.secondary = None,
            PortRole::Ignored => {}
        }
        Some(port)
    }

    /// The primary port, if claimed.
    pub fn primary(&self) -> Option<&Port> {
        self.primary.as_ref().and_then(|name| self.ports.get(name))
    }

    /// The secondary port, if claimed.
    pub fn secondary(&self) -> Option<&Port> {
        self.secondary.as_ref().and_then(|name| self.ports.get(name))
    }

    /// Look up a port by name.
    pub fn get(&self, name: &str) -> Option<&Port> {
        self.ports.get(name)
    }

    /// A modem is valid once it has a primary port.
    pub fn is_valid(&self) -> bool {
        self.primary.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_follow_claim_order() {
        for names in [
            ["ttyUSB0", "ttyUSB1", "ttyUSB2"],
            ["ttyUSB2", "ttyUSB1", "ttyUSB0"],
            ["ttyACM9", "ttyACM0", "ttyACM5"],
        ] {
            let mut registry = PortRegistry::default();
            assert_eq!(registry.claim(names[0]), PortRole::Primary);
            assert_eq!(registry.claim(names[1]), PortRole::Secondary);
            assert_eq!(registry.claim(names[2]), PortRole::Ignored);
            assert_eq!(registry.claim("ttyS7"), PortRole::Ignored);

            assert_eq!(registry.primary().unwrap().name, names[0]);
            assert_eq!(registry.secondary().unwrap().name, names[1]);
        }
    }

    #[test]
    fn claimed_ports_disable_carrier_detect() {
        let mut registry = PortRegistry::default();
        registry.claim("ttyUSB0");
        let port = registry.get("ttyUSB0").unwrap();
        assert!(!port.settings.carrier_detect);
        assert_eq!(port.settings.grammar, ResponseGrammar::V1);
    }

    #[test]
    fn reclaiming_keeps_the_existing_role() {
        let mut registry = PortRegistry::default();
        registry.claim("ttyUSB0");
        assert_eq!(registry.claim("ttyUSB0"), PortRole::Primary);
        assert!(registry.secondary().is_none());
    }

    #[test]
    fn releasing_primary_invalidates() {
        let mut registry = PortRegistry::default();
        registry.claim("ttyUSB0");
        registry.claim("ttyUSB1");
        assert!(registry.is_valid());

        let released = registry.release("ttyUSB0").unwrap();
        assert_eq!(released.role, PortRole::Primary);
        assert!(!registry.is_valid());
        assert!(!registry.owns("ttyUSB0"));
        assert_eq!(registry.secondary().unwrap().name, "ttyUSB1");
    }

    #[test]
    fn releasing_unbound_or_ignored_keeps_validity() {
        let mut registry = PortRegistry::default();
        registry.claim("ttyUSB0");
        registry.claim("ttyUSB1");
        registry.claim("ttyUSB2");

        assert!(registry.release("ttyUSB7").is_none());
        assert_eq!(registry.release("ttyUSB2").unwrap().role, PortRole::Ignored);
        assert!(registry.is_valid());
        assert!(!registry.owns("ttyUSB2"));
    }

    #[test]
    fn freed_slots_are_refilled_by_later_claims() {
        let mut registry = PortRegistry::default();
        registry.claim("ttyUSB0");
        registry.claim("ttyUSB1");
        registry.release("ttyUSB0");

        assert_eq!(registry.claim("ttyUSB3"), PortRole::Primary);
        assert_eq!(registry.claim("ttyUSB4"), PortRole::Ignored);
    }

    #[test]
    fn only_tty_ports_are_handled() {
        assert!(PortRegistry::handles(&Subsystem::Tty));
        assert!(!PortRegistry::handles(&Subsystem::Net));
        assert!(!PortRegistry::handles(&Subsystem::from("usbmisc")));
    }
}
