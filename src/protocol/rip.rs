//! RIPv1 and RIPv2 over UDP port 520
//!
//! Both versions carry one route entry. RIPv2 with authentication places a
//! keyed-MD5 authentication entry before the route and a 20-byte trailer
//! with a random digest after it.

use crate::buffer::{PacketBuffer, PacketWriter};
use crate::config::Config;
use crate::constants::{rip, udp, AUTH_DIGEST_LEN};
use crate::error::Result;
use crate::random::Randomizer;

use super::{begin, header_overhead, udp as udp_header};

fn rip_len(config: &Config, version: u8) -> usize {
    let auth = version == 2 && config.rip.auth;
    let mut len = rip::HEADER_LEN + rip::MESSAGE_LEN;
    if auth {
        len += rip::AUTH_LEN + rip::TRAILER_LEN + AUTH_DIGEST_LEN;
    }
    len
}

pub fn packet_size_v1(config: &Config) -> Result<usize> {
    Ok(header_overhead(config) + udp::HEADER_LEN + rip_len(config, 1))
}

pub fn packet_size_v2(config: &Config) -> Result<usize> {
    Ok(header_overhead(config) + udp::HEADER_LEN + rip_len(config, 2))
}

pub fn build_v1(config: &Config, buffer: &mut PacketBuffer, rng: &mut Randomizer) -> Result<usize> {
    build(config, buffer, rng, 1)
}

pub fn build_v2(config: &Config, buffer: &mut PacketBuffer, rng: &mut Randomizer) -> Result<usize> {
    build(config, buffer, rng, 2)
}

fn build(config: &Config, buffer: &mut PacketBuffer, rng: &mut Randomizer, version: u8) -> Result<usize> {
    let cfg = &config.rip;
    let rip_len = rip_len(config, version);
    let udp_len = udp::HEADER_LEN + rip_len;
    let mut frame = begin(config, buffer, rng, udp_len)?;
    let start = frame.payload_start;

    let w = &mut frame.writer;
    udp_header::write_header(w, rip::PORT, rip::PORT, udp_len)?;

    w.put_u8(cfg.command)?;
    w.put_u8(version)?;
    if version == 2 {
        w.put_u16(rng.resolve_u16(cfg.domain))?;
    } else {
        w.put_u16(0)?;
    }

    if version == 2 && cfg.auth {
        write_auth_entry(w, config, rng)?;
    }

    w.put_u16(rng.resolve_u16(cfg.family))?;
    if version == 2 {
        w.put_u16(rng.resolve_u16(cfg.tag))?;
        w.put_addr(rng.resolve_addr(cfg.address))?;
        w.put_addr(rng.resolve_netmask(cfg.netmask))?;
        w.put_addr(rng.resolve_addr(cfg.next_hop))?;
    } else {
        w.put_u16(0)?;
        w.put_addr(rng.resolve_addr(cfg.address))?;
        w.put_zeros(8)?;
    }
    w.put_u32(rng.resolve_u32(cfg.metric))?;

    if version == 2 && cfg.auth {
        w.put_u16(rip::AUTH_FAMILY)?;
        w.put_u16(rip::TRAILER_TYPE)?;
        w.put_random(rng, AUTH_DIGEST_LEN)?;
    }

    frame.checksum_pseudo(start + 6, config, rng)?;
    frame.finish(config)
}

fn write_auth_entry(w: &mut PacketWriter<'_>, config: &Config, rng: &mut Randomizer) -> Result<()> {
    let cfg = &config.rip;
    w.put_u16(rip::AUTH_FAMILY)?;
    w.put_u16(rip::AUTH_KEYED_MD5)?;
    // offset of the trailer within the RIP message
    w.put_u16((rip::HEADER_LEN + rip::AUTH_LEN + rip::MESSAGE_LEN) as u16)?;
    w.put_u8(cfg.key_id)?;
    w.put_u8(AUTH_DIGEST_LEN as u8)?;
    w.put_u32(rng.resolve_u32(cfg.sequence))?;
    w.put_zeros(8)
}
