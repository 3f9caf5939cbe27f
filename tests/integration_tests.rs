//! Integration tests for proto-flood
//!
//! Configuration, validation and synthesis working together the way `main`
//! wires them.

use proto_flood::buffer::PacketBuffer;
use proto_flood::cli::{build_command, process_cli_config, selection_for};
use proto_flood::config::load_config;
use proto_flood::network::resolve_host;
use proto_flood::protocol::synthesize;
use proto_flood::random::Randomizer;
use proto_flood::registry::{self, Selection};
use proto_flood::target::CidrTarget;
use proto_flood::validation::validate_run;
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_file_then_cli_then_build() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "emission:\n  protocol: RIPv2\n  threshold: 10\nrip:\n  auth: true").unwrap();

    let matches = build_command()
        .try_get_matches_from([
            "proto-flood",
            "--config",
            file.path().to_str().unwrap(),
            "--target",
            "172.16.0.0/24",
            "--encapsulated",
            "--set",
            "rip.key_id=9",
        ])
        .unwrap();
    let base = load_config(matches.get_one::<String>("config").map(String::as_str)).unwrap();
    let mut config = process_cli_config(&matches, base).unwrap();

    let selection = selection_for(&config).unwrap();
    assert_eq!(selection, Selection::Single(7));
    let target_ip = resolve_host(&config.target.host).unwrap();
    validate_run(&config, &target_ip, selection).unwrap();

    let target = CidrTarget::new(target_ip, config.target.bits).unwrap();
    let module = registry::entry(7).unwrap();
    let mut buffer = PacketBuffer::new();
    let mut rng = Randomizer::seeded(520);
    for _ in 0..10 {
        config.ip.daddr = target.next_address(&mut rng);
        let packet = synthesize(&mut config, module, &mut buffer, &mut rng).unwrap();
        assert_eq!(packet.len(), (module.packet_size)(&config).unwrap());
        assert_eq!(packet[9], 47);
        assert_eq!(&packet[16..19], &[172, 16, 0]);
        assert!(packet[19] >= 1 && packet[19] <= 254);
    }
}

#[test]
fn test_public_target_rejected_end_to_end() {
    let matches = build_command()
        .try_get_matches_from(["proto-flood", "--target", "198.51.100.1", "--protocol", "T50"])
        .unwrap();
    let config = process_cli_config(&matches, load_config(Some("does_not_exist.yaml")).unwrap()).unwrap();
    let selection = selection_for(&config).unwrap();
    let target_ip = resolve_host(&config.target.host).unwrap();
    assert!(validate_run(&config, &target_ip, selection).is_err());
}
