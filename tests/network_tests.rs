//! Target parsing and name resolution tests

use proto_flood::error::{FloodError, ValidationError};
use proto_flood::network::*;
use std::net::Ipv4Addr;

#[test]
fn test_parse_target_with_and_without_prefix() {
    assert_eq!(parse_target("10.0.0.0/30", 32).unwrap(), ("10.0.0.0".to_string(), 30));
    assert_eq!(parse_target("router.lan", 24).unwrap(), ("router.lan".to_string(), 24));
    assert!(parse_target("10.0.0.0/", 32).is_err());
    assert!(parse_target("10.0.0.0/300", 32).is_err());
}

#[test]
fn test_resolve_literal_addresses() {
    assert_eq!(resolve_host("192.168.10.1").unwrap(), Ipv4Addr::new(192, 168, 10, 1));
    assert!(matches!(
        resolve_host("fe80::1"),
        Err(FloodError::Validation(ValidationError::InvalidIpRange { .. }))
    ));
}

#[test]
fn test_resolve_localhost() {
    // resolvers without a hosts file may fail; a result must be IPv4 loopback
    if let Ok(addr) = resolve_host("localhost") {
        assert!(addr.is_loopback());
    }
}

#[test]
fn test_unresolvable_name() {
    assert!(resolve_host("no-such-host.invalid").is_err());
}
