//! EIGRP packets
//!
//! After the 20-byte header comes, in order:
//!
//! * the authentication TLV, when `eigrp.auth` is set and the opcode is
//!   Update, Request, SIA-Query, SIA-Reply or Hello;
//! * an internal or external route TLV for Update, Request, SIA-Query and
//!   SIA-Reply, whose destination is truncated by [`destination_len`];
//! * one Hello TLV (parameters, sequence, software version or next multicast
//!   sequence) for Hello.
//!
//! Query and Reply carry the header alone.

use crate::buffer::{PacketBuffer, PacketWriter};
use crate::config::Config;
use crate::constants::{eigrp, AUTH_DIGEST_LEN};
use crate::error::Result;
use crate::random::Randomizer;

use super::{begin, header_overhead};

/// Octets of the destination kept for a given prefix length.
///
/// This reproduces the arithmetic deployed traffic captures were made with:
/// `((p >> 3) & 3) + (p % 8 != 0)`, so a /32 keeps no octets at all.
pub fn destination_len(prefix: u8) -> usize {
    usize::from((prefix >> 3) & 3) + usize::from(prefix % 8 != 0)
}

fn carries_auth(config: &Config) -> bool {
    config.eigrp.auth
        && matches!(
            config.eigrp.opcode,
            eigrp::OPCODE_UPDATE
                | eigrp::OPCODE_REQUEST
                | eigrp::OPCODE_SIA_QUERY
                | eigrp::OPCODE_SIA_REPLY
                | eigrp::OPCODE_HELLO
        )
}

fn carries_route(config: &Config) -> bool {
    matches!(
        config.eigrp.opcode,
        eigrp::OPCODE_UPDATE | eigrp::OPCODE_REQUEST | eigrp::OPCODE_SIA_QUERY | eigrp::OPCODE_SIA_REPLY
    )
}

fn is_external(config: &Config) -> bool {
    config.eigrp.tlv_type == eigrp::TYPE_EXTERNAL
}

/// Route TLV length as computed from the prefix.
pub fn route_tlv_len(config: &Config) -> usize {
    let fixed = if is_external(config) {
        eigrp::TLV_EXTERNAL
    } else {
        eigrp::TLV_INTERNAL
    };
    fixed + destination_len(config.eigrp.prefix)
}

fn hello_tlv_len(config: &Config) -> usize {
    match config.eigrp.tlv_type {
        eigrp::TYPE_SEQUENCE => eigrp::TLV_SEQUENCE,
        eigrp::TYPE_SOFTWARE => eigrp::TLV_SOFTWARE,
        eigrp::TYPE_MULTICAST => eigrp::TLV_MULTICAST,
        _ => eigrp::TLV_PARAMETER,
    }
}

fn eigrp_len(config: &Config) -> usize {
    let mut len = eigrp::HEADER_LEN;
    if carries_auth(config) {
        len += eigrp::TLV_AUTH;
    }
    if carries_route(config) {
        len += route_tlv_len(config);
    } else if config.eigrp.opcode == eigrp::OPCODE_HELLO {
        len += hello_tlv_len(config);
    }
    len
}

pub fn packet_size(config: &Config) -> Result<usize> {
    Ok(header_overhead(config) + eigrp_len(config))
}

pub fn build(config: &Config, buffer: &mut PacketBuffer, rng: &mut Randomizer) -> Result<usize> {
    let cfg = &config.eigrp;
    let mut frame = begin(config, buffer, rng, eigrp_len(config))?;
    let start = frame.payload_start;

    let w = &mut frame.writer;
    w.put_u8(eigrp::VERSION)?;
    w.put_u8(cfg.opcode)?;
    w.put_u16(0)?;
    w.put_u32(rng.resolve_u32(cfg.flags))?;
    w.put_u32(rng.resolve_u32(cfg.sequence))?;
    let ack = if cfg.opcode == eigrp::OPCODE_UPDATE {
        rng.resolve_u32(cfg.acknowledge)
    } else {
        0
    };
    w.put_u32(ack)?;
    w.put_u32(rng.resolve_u32(cfg.autonomous_system))?;

    if carries_auth(config) {
        write_auth(w, config, rng)?;
    }
    if carries_route(config) {
        write_route(w, config, rng)?;
    } else if cfg.opcode == eigrp::OPCODE_HELLO {
        write_hello(w, config, rng)?;
    }

    frame.checksum_payload(start + 2, config, rng)?;
    frame.finish(config)
}

fn write_auth(w: &mut PacketWriter<'_>, config: &Config, rng: &mut Randomizer) -> Result<()> {
    let cfg = &config.eigrp;
    w.put_u16(eigrp::TYPE_AUTH)?;
    w.put_u16(eigrp::TLV_AUTH as u16)?;
    w.put_u16(eigrp::AUTH_HMAC_MD5)?;
    w.put_u16(AUTH_DIGEST_LEN as u16)?;
    w.put_u32(rng.resolve_u32(cfg.key_id))?;
    w.put_u32(rng.resolve_u32(cfg.sequence))?;
    w.put_zeros(8)?;
    w.put_random(rng, AUTH_DIGEST_LEN)
}

fn write_route(w: &mut PacketWriter<'_>, config: &Config, rng: &mut Randomizer) -> Result<()> {
    let cfg = &config.eigrp;
    let external = is_external(config);
    let length = if cfg.length != 0 {
        cfg.length
    } else {
        route_tlv_len(config) as u16
    };

    w.put_u16(if external { eigrp::TYPE_EXTERNAL } else { eigrp::TYPE_INTERNAL })?;
    w.put_u16(length)?;
    w.put_addr(rng.resolve_addr(cfg.next_hop))?;

    if external {
        w.put_addr(rng.resolve_addr(cfg.source_router))?;
        w.put_u32(rng.resolve_u32(cfg.source_as))?;
        w.put_u32(rng.resolve_u32(cfg.tag))?;
        w.put_u32(rng.resolve_u32(cfg.external_metric))?;
        w.put_u16(0)?;
        w.put_u8(rng.resolve_u8(cfg.external_protocol))?;
        w.put_u8(cfg.external_flags)?;
    }

    w.put_u32(rng.resolve_u32(cfg.delay))?;
    w.put_u32(rng.resolve_u32(cfg.bandwidth))?;
    w.put_u24(rng.resolve_u24(cfg.mtu))?;
    w.put_u8(rng.resolve_u8(cfg.hop_count))?;
    w.put_u8(rng.resolve_u8(cfg.reliability))?;
    w.put_u8(rng.resolve_u8(cfg.load))?;
    w.put_u16(0)?;
    w.put_u8(cfg.prefix)?;

    let destination = rng.resolve_addr(cfg.destination).octets();
    w.put_bytes(&destination[..destination_len(cfg.prefix)])
}

fn write_hello(w: &mut PacketWriter<'_>, config: &Config, rng: &mut Randomizer) -> Result<()> {
    let cfg = &config.eigrp;
    match cfg.tlv_type {
        eigrp::TYPE_SEQUENCE => {
            w.put_u16(eigrp::TYPE_SEQUENCE)?;
            w.put_u16(eigrp::TLV_SEQUENCE as u16)?;
            w.put_u8(4)?;
            w.put_addr(rng.resolve_addr(cfg.sequence_address))
        }
        eigrp::TYPE_SOFTWARE => {
            w.put_u16(eigrp::TYPE_SOFTWARE)?;
            w.put_u16(eigrp::TLV_SOFTWARE as u16)?;
            w.put_u8(rng.resolve_u8(cfg.ios_major))?;
            w.put_u8(rng.resolve_u8(cfg.ios_minor))?;
            w.put_u8(rng.resolve_u8(cfg.ver_major))?;
            w.put_u8(rng.resolve_u8(cfg.ver_minor))
        }
        eigrp::TYPE_MULTICAST => {
            w.put_u16(eigrp::TYPE_MULTICAST)?;
            w.put_u16(eigrp::TLV_MULTICAST as u16)?;
            w.put_u32(rng.resolve_u32(cfg.multicast))
        }
        _ => {
            w.put_u16(eigrp::TYPE_PARAMETER)?;
            w.put_u16(eigrp::TLV_PARAMETER as u16)?;
            for k in [cfg.k1, cfg.k2, cfg.k3, cfg.k4, cfg.k5] {
                w.put_u8(rng.resolve_u8(k))?;
            }
            w.put_u8(0)?;
            w.put_u16(rng.resolve_u16(cfg.hold))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destination_len_literal_arithmetic() {
        assert_eq!(destination_len(0), 0);
        assert_eq!(destination_len(1), 1);
        assert_eq!(destination_len(8), 1);
        assert_eq!(destination_len(16), 2);
        assert_eq!(destination_len(24), 3);
        assert_eq!(destination_len(25), 4);
        assert_eq!(destination_len(31), 4);
        assert_eq!(destination_len(32), 0);
    }

    #[test]
    fn test_auth_skipped_for_query() {
        let mut config = Config::default();
        config.eigrp.auth = true;
        config.eigrp.opcode = eigrp::OPCODE_QUERY;
        assert_eq!(eigrp_len(&config), eigrp::HEADER_LEN);
        config.eigrp.opcode = eigrp::OPCODE_HELLO;
        assert_eq!(eigrp_len(&config), eigrp::HEADER_LEN + eigrp::TLV_AUTH + eigrp::TLV_PARAMETER);
    }
}
