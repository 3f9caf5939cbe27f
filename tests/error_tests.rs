//! Error handling tests
//!
//! Tests for error display, conversion and fatality classification.

use proto_flood::error::*;
use std::io;

#[test]
fn test_config_error_display() {
    let error = ConfigError::InvalidValue {
        field: "ip.ttl".to_string(),
        value: "300".to_string(),
        reason: "out of range".to_string(),
    };
    assert_eq!(error.to_string(), "Invalid value '300' for field 'ip.ttl': out of range");

    let error = ConfigError::UnknownOption {
        option: "tcp.syn".to_string(),
        protocol: "ICMP".to_string(),
    };
    assert_eq!(error.to_string(), "Option 'tcp.syn' is not accepted by protocol ICMP");
}

#[test]
fn test_packet_error_display() {
    let error: FloodError = PacketError::TcpOptionsTooLarge { size: 44, limit: 40 }.into();
    assert_eq!(error.to_string(), "Packet error: TCP options size (44 bytes) is bigger than 40 bytes");

    let error = PacketError::SizeMismatch { expected: 40, written: 36 };
    assert_eq!(error.to_string(), "Packet size mismatch: expected 40 bytes, wrote 36");
}

#[test]
fn test_validation_error_display() {
    let error = ValidationError::InvalidPrefix { bits: 4, min: 8, max: 32 };
    assert_eq!(error.to_string(), "CIDR prefix /4 is outside the supported range /8../32");

    let error = ValidationError::BelowMinimum {
        field: "threshold".to_string(),
        value: 5,
        minimum: 13,
    };
    assert!(error.to_string().contains("below the minimum of 13"));
}

#[test]
fn test_only_send_failures_are_recoverable() {
    let send: FloodError = NetworkError::PacketSend("EPERM".to_string()).into();
    assert!(!send.is_fatal());

    let fatal: Vec<FloodError> = vec![
        PacketError::InvalidSize(0).into(),
        PacketError::AllocationFailed { requested: 1 << 40 }.into(),
        NetworkError::ChannelCreation("socket".to_string()).into(),
        SystemError::Internal("overflow".to_string()).into(),
        ConfigError::ParseError("bad yaml".to_string()).into(),
        io::Error::new(io::ErrorKind::Other, "disk").into(),
    ];
    for error in fatal {
        assert!(error.is_fatal(), "{} should be fatal", error);
    }
}

#[test]
fn test_io_error_keeps_source() {
    use std::error::Error;
    let error: FloodError = io::Error::new(io::ErrorKind::NotFound, "missing").into();
    assert!(error.source().is_some());
    assert!(matches!(error, FloodError::Io(_)));
}

#[test]
fn test_map_error_helpers() {
    let failed: std::result::Result<(), String> = Err("boom".to_string());
    let error = failed.clone().map_network_error("raw socket").unwrap_err();
    assert_eq!(error.to_string(), "Network error: Failed to create network channel: raw socket: boom");

    let error = failed.map_system_error("runtime").unwrap_err();
    assert!(matches!(error, FloodError::System(SystemError::RuntimeUnavailable(_))));
}
