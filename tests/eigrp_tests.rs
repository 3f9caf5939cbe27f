//! EIGRP packet layout tests

use std::net::Ipv4Addr;

use proto_flood::buffer::PacketBuffer;
use proto_flood::checksum::checksum;
use proto_flood::config::Config;
use proto_flood::constants::eigrp;
use proto_flood::protocol::eigrp::{destination_len, route_tlv_len};
use proto_flood::protocol::synthesize;
use proto_flood::random::Randomizer;
use proto_flood::registry::{self, MODULES};

fn build(config: &mut Config) -> Vec<u8> {
    let module = &MODULES[registry::find("EIGRP").unwrap()];
    config.ip.daddr = Ipv4Addr::new(10, 10, 10, 10);
    let mut buffer = PacketBuffer::new();
    let mut rng = Randomizer::seeded(88);
    synthesize(config, module, &mut buffer, &mut rng).unwrap().to_vec()
}

#[test]
fn test_update_with_internal_route() {
    let mut config = Config::default();
    config.eigrp.prefix = 24;
    config.eigrp.destination = Ipv4Addr::new(172, 16, 9, 0);
    let packet = build(&mut config);
    let body = &packet[20..];

    assert_eq!(body[0], eigrp::VERSION);
    assert_eq!(body[1], eigrp::OPCODE_UPDATE);
    assert_eq!(checksum(body), 0);

    let tlv = &body[eigrp::HEADER_LEN..];
    assert_eq!(u16::from_be_bytes([tlv[0], tlv[1]]), eigrp::TYPE_INTERNAL);
    assert_eq!(u16::from_be_bytes([tlv[2], tlv[3]]) as usize, eigrp::TLV_INTERNAL + 3);
    // prefix length then three destination octets
    assert_eq!(&tlv[eigrp::TLV_INTERNAL - 1..], &[24, 172, 16, 9]);
}

#[test]
fn test_external_route_with_auth() {
    let mut config = Config::default();
    config.eigrp.tlv_type = eigrp::TYPE_EXTERNAL;
    config.eigrp.auth = true;
    config.eigrp.prefix = 16;
    let packet = build(&mut config);
    let body = &packet[20..];

    assert_eq!(body.len(), eigrp::HEADER_LEN + eigrp::TLV_AUTH + eigrp::TLV_EXTERNAL + 2);
    let auth = &body[eigrp::HEADER_LEN..];
    assert_eq!(u16::from_be_bytes([auth[0], auth[1]]), eigrp::TYPE_AUTH);
    let route = &auth[eigrp::TLV_AUTH..];
    assert_eq!(u16::from_be_bytes([route[0], route[1]]), eigrp::TYPE_EXTERNAL);
}

#[test]
fn test_explicit_tlv_length_is_written_verbatim() {
    let mut config = Config::default();
    config.eigrp.length = 999;
    let packet = build(&mut config);
    let tlv = &packet[20 + eigrp::HEADER_LEN..];
    assert_eq!(u16::from_be_bytes([tlv[2], tlv[3]]), 999);
    assert_eq!(packet.len(), 20 + eigrp::HEADER_LEN + route_tlv_len(&config));
}

#[test]
fn test_query_and_reply_are_header_only() {
    for opcode in [eigrp::OPCODE_QUERY, eigrp::OPCODE_REPLY] {
        let mut config = Config::default();
        config.eigrp.opcode = opcode;
        config.eigrp.auth = true;
        let packet = build(&mut config);
        assert_eq!(packet.len(), 20 + eigrp::HEADER_LEN);
        // acknowledge is only set on updates
        assert_eq!(&packet[20 + 12..20 + 16], &[0, 0, 0, 0]);
    }
}

#[test]
fn test_hello_tlvs() {
    let cases = [
        (eigrp::TYPE_SEQUENCE, eigrp::TYPE_SEQUENCE, eigrp::TLV_SEQUENCE),
        (eigrp::TYPE_SOFTWARE, eigrp::TYPE_SOFTWARE, eigrp::TLV_SOFTWARE),
        (eigrp::TYPE_MULTICAST, eigrp::TYPE_MULTICAST, eigrp::TLV_MULTICAST),
        (eigrp::TYPE_INTERNAL, eigrp::TYPE_PARAMETER, eigrp::TLV_PARAMETER),
    ];
    for (configured, written, len) in cases {
        let mut config = Config::default();
        config.eigrp.opcode = eigrp::OPCODE_HELLO;
        config.eigrp.tlv_type = configured;
        let packet = build(&mut config);
        let tlv = &packet[20 + eigrp::HEADER_LEN..];
        assert_eq!(tlv.len(), len);
        assert_eq!(u16::from_be_bytes([tlv[0], tlv[1]]), written);
    }
}

#[test]
fn test_slash_32_keeps_no_destination_octets() {
    assert_eq!(destination_len(32), 0);
    let mut config = Config::default();
    config.eigrp.prefix = 32;
    assert_eq!(route_tlv_len(&config), eigrp::TLV_INTERNAL);
}
