//! Validation module tests

use proto_flood::config::{get_default_config, Config};
use proto_flood::error::{FloodError, ValidationError};
use proto_flood::registry::Selection;
use proto_flood::validation::*;
use std::net::Ipv4Addr;

fn config_with_bits(bits: u8) -> Config {
    let mut config = get_default_config();
    config.target.bits = bits;
    config
}

#[test]
fn test_private_ranges() {
    assert!(is_private(&Ipv4Addr::new(10, 20, 30, 40)));
    assert!(is_private(&Ipv4Addr::new(172, 31, 255, 1)));
    assert!(is_private(&Ipv4Addr::new(192, 168, 0, 1)));
    assert!(!is_private(&Ipv4Addr::new(172, 32, 0, 1)));
    assert!(!is_private(&Ipv4Addr::new(8, 8, 8, 8)));
}

#[test]
fn test_default_run_is_valid() {
    let config = get_default_config();
    let selection = Selection::parse(&config.emission.protocol).unwrap();
    assert!(validate_run(&config, &Ipv4Addr::new(192, 168, 1, 1), selection).is_ok());
}

#[test]
fn test_public_target_needs_opt_out() {
    let mut config = get_default_config();
    let public = Ipv4Addr::new(203, 0, 113, 9);
    let tcp = Selection::Single(3);
    assert!(validate_run(&config, &public, tcp).is_err());

    config.safety.require_private_ranges = false;
    assert!(validate_run(&config, &public, tcp).is_ok());
}

#[test]
fn test_prefix_must_stay_in_private_range() {
    let tcp = Selection::Single(3);
    for (base, bits) in [([192, 168, 1, 1], 8), ([172, 16, 0, 1], 8), ([172, 16, 0, 1], 11), ([192, 168, 0, 0], 15)] {
        let target = Ipv4Addr::from(base);
        assert!(
            matches!(
                validate_run(&config_with_bits(bits), &target, tcp),
                Err(FloodError::Validation(ValidationError::InvalidIpRange { .. }))
            ),
            "{}/{} should be rejected",
            target,
            bits
        );
    }

    for (base, bits) in [([10, 0, 0, 0], 8), ([172, 16, 0, 1], 12), ([192, 168, 1, 1], 16), ([192, 168, 1, 1], 24)] {
        let target = Ipv4Addr::from(base);
        assert!(validate_run(&config_with_bits(bits), &target, tcp).is_ok(), "{}/{}", target, bits);
    }
}

#[test]
fn test_private_block_edges() {
    assert!(is_private_block(&Ipv4Addr::new(172, 31, 255, 254), 12));
    assert!(!is_private_block(&Ipv4Addr::new(172, 31, 255, 254), 11));
    assert!(is_private_block(&Ipv4Addr::new(10, 1, 2, 3), 32));
    assert!(!is_private_block(&Ipv4Addr::new(8, 8, 8, 8), 32));
}

#[test]
fn test_special_addresses_always_rejected() {
    let mut config = get_default_config();
    config.safety.require_private_ranges = false;
    for addr in [Ipv4Addr::LOCALHOST, Ipv4Addr::new(224, 0, 0, 5), Ipv4Addr::BROADCAST] {
        assert!(validate_run(&config, &addr, Selection::All).is_err(), "{}", addr);
    }
}

#[test]
fn test_prefix_bounds() {
    let target = Ipv4Addr::new(10, 0, 0, 0);
    let tcp = Selection::Single(3);
    assert!(validate_run(&config_with_bits(8), &target, tcp).is_ok());
    assert!(validate_run(&config_with_bits(32), &target, tcp).is_ok());
    assert!(matches!(
        validate_run(&config_with_bits(7), &target, tcp),
        Err(FloodError::Validation(ValidationError::InvalidPrefix { bits: 7, .. }))
    ));
    assert!(validate_prefix(33).is_err());
}

#[test]
fn test_threshold_rules() {
    let target = Ipv4Addr::new(10, 0, 0, 1);
    let mut config = get_default_config();

    config.emission.threshold = 12;
    assert!(matches!(
        validate_run(&config, &target, Selection::All),
        Err(FloodError::Validation(ValidationError::BelowMinimum { minimum: 13, .. }))
    ));
    assert!(validate_run(&config, &target, Selection::Single(0)).is_ok());

    config.emission.threshold = 0;
    assert!(validate_run(&config, &target, Selection::Single(0)).is_err());

    config.emission.flood = true;
    assert!(validate_run(&config, &target, Selection::All).is_ok());
}

#[test]
fn test_dry_run_skips_privilege_check() {
    assert!(validate_system_requirements(true).is_ok());
}
