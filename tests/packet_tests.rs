//! Packet synthesis tests
//!
//! Every builder must write exactly the number of bytes its size function
//! predicts, for every combination of the switches that change the layout.

use std::net::Ipv4Addr;

use proto_flood::buffer::PacketBuffer;
use proto_flood::checksum::checksum;
use proto_flood::config::Config;
use proto_flood::constants::ipproto;
use proto_flood::error::{FloodError, PacketError};
use proto_flood::protocol::{gre, pseudo_header_checksum, synthesize};
use proto_flood::random::Randomizer;
use proto_flood::registry::{self, ProtocolModule, MODULES};
use proto_flood::target::CidrTarget;

fn base_config() -> Config {
    let mut config = Config::default();
    config.ip.daddr = Ipv4Addr::new(192, 168, 100, 7);
    config
}

fn module(acronym: &str) -> &'static ProtocolModule {
    registry::find(acronym)
        .and_then(registry::entry)
        .unwrap_or_else(|| panic!("no module {}", acronym))
}

/// Builds once and checks the result against the size function and the IP
/// total length.
fn build_and_check(config: &mut Config, module: &ProtocolModule, rng: &mut Randomizer) -> Vec<u8> {
    let mut buffer = PacketBuffer::new();
    let predicted = {
        config.ip.protocol = module.protocol;
        (module.packet_size)(config).unwrap()
    };
    let packet = synthesize(config, module, &mut buffer, rng)
        .unwrap_or_else(|e| panic!("{} failed: {}", module.acronym, e))
        .to_vec();

    assert_eq!(packet.len(), predicted, "{} size", module.acronym);
    assert_eq!(u16::from_be_bytes([packet[2], packet[3]]) as usize, predicted);
    assert_eq!(checksum(&packet[..20]), 0, "{} IP header checksum", module.acronym);
    packet
}

/// Applies the module-specific switches for one bit pattern.
fn apply_switches(config: &mut Config, bits: u32) {
    let on = |n: u32| bits & (1 << n) != 0;
    config.bogus_csum = on(0);
    config.encapsulated = on(1);
    config.gre.checksum = on(2);
    config.gre.key = on(3);
    config.gre.sequence = on(4);
    config.dccp.ext = on(5);
    config.rip.auth = on(5);
    config.eigrp.auth = on(5);
    config.ospf.auth = on(5);
    config.igmp.suppress = on(5);
    config.ospf.lls = on(6);
    config.ospf.dd_include_lsa = on(6);
    config.tcp.options.mss = on(6);
    config.tcp.options.tsopt = on(6);
    config.tcp.options.sack_ok = on(6);
    config.tcp.options.md5 = on(5);
}

#[test]
fn test_size_purity_for_every_module_and_switch() {
    let mut rng = Randomizer::seeded(2024);
    for module in MODULES.iter() {
        for bits in 0..(1 << 7) {
            let mut config = base_config();
            apply_switches(&mut config, bits);
            build_and_check(&mut config, module, &mut rng);
        }
    }
}

#[test]
fn test_size_purity_across_message_types() {
    let mut rng = Randomizer::seeded(77);
    for encapsulated in [false, true] {
        for dccp_type in 0..=10 {
            let mut config = base_config();
            config.encapsulated = encapsulated;
            config.dccp.dccp_type = dccp_type;
            build_and_check(&mut config, module("DCCP"), &mut rng);
        }
        for msg_type in 0..=9 {
            let mut config = base_config();
            config.encapsulated = encapsulated;
            config.rsvp.msg_type = msg_type;
            for (tspec, adspec) in [(1, 5), (2, 2), (0, 0), (3, 7)] {
                config.rsvp.tspec = tspec;
                config.rsvp.adspec = adspec;
                build_and_check(&mut config, module("RSVP"), &mut rng);
            }
        }
        for opcode in 1..=11 {
            for tlv_type in [0x0001, 0x0003, 0x0004, 0x0005, 0x0102, 0x0103] {
                for prefix in [0, 8, 20, 24, 31, 32] {
                    let mut config = base_config();
                    config.encapsulated = encapsulated;
                    config.eigrp.opcode = opcode;
                    config.eigrp.tlv_type = tlv_type;
                    config.eigrp.prefix = prefix;
                    build_and_check(&mut config, module("EIGRP"), &mut rng);
                }
            }
        }
        for packet_type in 1..=6 {
            for lsa_type in 1..=8 {
                let mut config = base_config();
                config.encapsulated = encapsulated;
                config.ospf.packet_type = packet_type;
                config.ospf.lsa_type = lsa_type;
                config.ospf.neighbors = 3;
                build_and_check(&mut config, module("OSPF"), &mut rng);
            }
        }
        for ah_length in [0, 1, 4, 16] {
            let mut config = base_config();
            config.encapsulated = encapsulated;
            config.ipsec.ah_length = ah_length;
            build_and_check(&mut config, module("IPSEC"), &mut rng);
        }
        for sources in [0, 1, 5] {
            let mut config = base_config();
            config.encapsulated = encapsulated;
            config.igmp.sources = sources;
            config.igmp.igmp_type = 0x22;
            build_and_check(&mut config, module("IGMPv3"), &mut rng);
            config.igmp.igmp_type = 0x11;
            build_and_check(&mut config, module("IGMPv3"), &mut rng);
        }
    }
}

#[test]
fn test_tcp_options_over_limit_is_rejected() {
    let mut config = base_config();
    let opts = &mut config.tcp.options;
    opts.mss = true;
    opts.wsopt = true;
    opts.tsopt = true;
    opts.md5 = true;
    opts.cc = true;
    let mut buffer = PacketBuffer::new();
    let mut rng = Randomizer::seeded(1);

    let err = synthesize(&mut config, module("TCP"), &mut buffer, &mut rng).unwrap_err();
    assert!(matches!(
        err,
        FloodError::Packet(PacketError::TcpOptionsTooLarge { size: 44, limit: 40 })
    ));
    assert!(err.is_fatal());
}

#[test]
fn test_icmp_checksum_verifies() {
    let mut config = base_config();
    let mut rng = Randomizer::seeded(5);
    let packet = build_and_check(&mut config, module("ICMP"), &mut rng);
    assert_eq!(packet[9], ipproto::ICMP);
    assert_eq!(checksum(&packet[20..]), 0);
}

#[test]
fn test_pseudo_header_checksums_verify() {
    let mut rng = Randomizer::seeded(6);
    for acronym in ["TCP", "UDP", "DCCP"] {
        let mut config = base_config();
        config.tcp.options.mss = true;
        let m = module(acronym);
        let packet = build_and_check(&mut config, m, &mut rng);
        let saddr = Ipv4Addr::new(packet[12], packet[13], packet[14], packet[15]);
        let daddr = Ipv4Addr::new(packet[16], packet[17], packet[18], packet[19]);
        assert_eq!(daddr, config.ip.daddr);
        assert_eq!(pseudo_header_checksum(saddr, daddr, m.protocol, &packet[20..]), 0, "{}", acronym);
    }
}

#[test]
fn test_bogus_checksum_does_not_touch_ip_header() {
    let mut config = base_config();
    config.bogus_csum = true;
    let mut rng = Randomizer::seeded(8);
    let mut mismatches = 0;
    for _ in 0..20 {
        let packet = build_and_check(&mut config, module("ICMP"), &mut rng);
        if checksum(&packet[20..]) != 0 {
            mismatches += 1;
        }
    }
    assert!(mismatches > 15);
}

#[test]
fn test_gre_encapsulation_layout() {
    let mut config = base_config();
    config.encapsulated = true;
    config.gre.checksum = true;
    config.gre.key = true;
    config.gre.key_value = 0x0102_0304;
    config.gre.saddr = Ipv4Addr::new(10, 9, 9, 9);
    let mut rng = Randomizer::seeded(11);

    let packet = build_and_check(&mut config, module("UDP"), &mut rng);
    let gre_len = gre::header_len(&config);
    assert_eq!(gre_len, 12);

    // outer IP carries GRE
    assert_eq!(packet[9], ipproto::GRE);
    // flags C and K, ethertype IPv4
    assert_eq!(&packet[20..24], &[0xa0, 0x00, 0x08, 0x00]);
    assert_eq!(&packet[28..32], &[0x01, 0x02, 0x03, 0x04]);
    // GRE checksum covers GRE through the end
    assert_eq!(checksum(&packet[20..]), 0);

    let inner = &packet[20 + gre_len..];
    assert_eq!(inner[0], 0x45);
    assert_eq!(inner[9], ipproto::UDP);
    assert_eq!(u16::from_be_bytes([inner[2], inner[3]]) as usize, inner.len());
    assert_eq!(&inner[12..16], &[10, 9, 9, 9]);
    assert_eq!(&inner[16..20], &config.ip.daddr.octets());
    assert_eq!(checksum(&inner[..20]), 0);
    assert_eq!(
        pseudo_header_checksum(Ipv4Addr::new(10, 9, 9, 9), config.ip.daddr, ipproto::UDP, &inner[20..]),
        0
    );
}

#[test]
fn test_tcp_syn_across_slash_30() {
    let mut config = base_config();
    config.tcp.syn = true;
    let target = CidrTarget::new(Ipv4Addr::new(10, 0, 0, 0), 30).unwrap();
    let mut buffer = PacketBuffer::new();
    let mut rng = Randomizer::seeded(30);
    let hosts = [[10, 0, 0, 1], [10, 0, 0, 2]];

    for _ in 0..50 {
        config.ip.daddr = target.next_address(&mut rng);
        let packet = synthesize(&mut config, module("TCP"), &mut buffer, &mut rng).unwrap();
        assert_eq!(packet.len(), 40);
        assert_eq!(u16::from_be_bytes([packet[2], packet[3]]), 40);
        assert!(hosts.contains(&[packet[16], packet[17], packet[18], packet[19]]));
        assert_eq!(packet[20 + 13], 0x02);
        // data offset of a bare header
        assert_eq!(packet[20 + 12] >> 4, 5);
    }
}

#[test]
fn test_buffer_reuse_across_modules() {
    let mut config = base_config();
    config.ospf.lls = true;
    config.ospf.auth = true;
    let mut buffer = PacketBuffer::new();
    let mut rng = Randomizer::seeded(99);

    let large = synthesize(&mut config, module("OSPF"), &mut buffer, &mut rng).unwrap().len();
    let small = synthesize(&mut config, module("EGP"), &mut buffer, &mut rng).unwrap().len();
    assert!(small < large);
    assert_eq!(small, 20 + 14);
    assert_eq!(buffer.capacity(), large);
}

#[test]
fn test_fixed_sizes() {
    let config = base_config();
    let size = |acronym: &str| (module(acronym).packet_size)(&config).unwrap();
    assert_eq!(size("ICMP"), 28);
    assert_eq!(size("IGMPv1"), 28);
    assert_eq!(size("UDP"), 28);
    assert_eq!(size("EGP"), 34);
    assert_eq!(size("RIPv1"), 20 + 8 + 24);
}
