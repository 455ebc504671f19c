//! Unit tests for config module
//!
//! In-memory only; file loading is covered by the integration tests.

use crate::services::{
    modem::{IpMethod, Subsystem},
    serial::Endpoint,
};

use super::{BusKind, Config, ConfigError, LogLevel};

#[test]
fn defaults_drive_a_generic_modem_on_the_system_bus() {
    let config = Config::default();

    assert_eq!(config.general.log_level, LogLevel::Info);
    assert_eq!(config.modem.family, "generic");
    assert_eq!(config.modem.ip_method, IpMethod::Ppp);
    assert!(config.modem.ports.is_empty());
    assert_eq!(config.bus.kind, BusKind::System);
    assert_eq!(config.bus.name, "org.freedesktop.ModemManager");
    assert!(config.validate().is_ok());
}

#[test]
fn empty_document_is_the_default() {
    let config: Config = toml::from_str("").unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn full_document() {
    let config: Config = toml::from_str(
        r#"
        [general]
        log_level = "trace"

        [modem]
        device = "/sys/devices/pci0000:00/usb1/1-2"
        driver = "sierra"
        ip_method = "dhcp"

        [[modem.ports]]
        name = "ttyUSB0"

        [[modem.ports]]
        name = "ttyUSB1"
        endpoint = "tcp://127.0.0.1:4001"

        [[modem.ports]]
        name = "wwan0"
        subsystem = "net"

        [bus]
        kind = "session"
        path = "/org/freedesktop/ModemManager/Modems/3"
        "#,
    )
    .unwrap();

    assert_eq!(config.general.log_level, LogLevel::Trace);
    assert_eq!(config.modem.driver, "sierra");
    assert_eq!(config.modem.plugin, "Generic");
    assert_eq!(config.modem.ip_method, IpMethod::Dhcp);

    let ports = &config.modem.ports;
    assert_eq!(ports.len(), 3);
    assert_eq!(ports[0].subsystem, Subsystem::Tty);
    assert_eq!(ports[0].endpoint(), Endpoint::for_port("ttyUSB0"));
    assert_eq!(
        ports[1].endpoint(),
        Endpoint::Tcp("127.0.0.1:4001".to_owned())
    );
    assert_eq!(ports[2].subsystem, Subsystem::Net);

    assert_eq!(config.bus.kind, BusKind::Session);
    assert_eq!(config.bus.name, "org.freedesktop.ModemManager");
}

#[test]
fn unknown_subsystems_are_kept_by_name() {
    let config: Config = toml::from_str(
        r#"
        [[modem.ports]]
        name = "cdc-wdm0"
        subsystem = "usbmisc"
        "#,
    )
    .unwrap();

    assert_eq!(
        config.modem.ports[0].subsystem,
        Subsystem::Other("usbmisc".to_owned())
    );
}

#[test]
fn unknown_family_is_rejected() {
    let config: Config = toml::from_str(
        r#"
        [modem]
        family = "huawei"
        "#,
    )
    .unwrap();

    match config.validate() {
        Err(ConfigError::InvalidField { field, reason }) => {
            assert_eq!(field, "modem.family");
            assert!(reason.contains("huawei"));
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn duplicate_ports_are_rejected() {
    let config: Config = toml::from_str(
        r#"
        [[modem.ports]]
        name = "ttyUSB0"

        [[modem.ports]]
        name = "ttyUSB0"
        "#,
    )
    .unwrap();

    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidField { .. })
    ));
}

#[test]
fn bad_log_level_fails_to_parse() {
    let result: Result<Config, _> = toml::from_str(
        r#"
        [general]
        log_level = "loud"
        "#,
    );
    assert!(result.is_err());
}

#[test]
fn log_level_display_matches_filter_syntax() {
    assert_eq!(LogLevel::Warn.to_string(), "warn");
    assert_eq!(LogLevel::Trace.to_string(), "trace");
}
