//! IGMPv1 and IGMPv3 builders.
//!
//! IGMPv3 produces a membership report with a single group record when the
//! type is 0x22 and a membership query otherwise; both carry `igmp.sources`
//! source addresses.

use crate::buffer::{PacketBuffer, PacketWriter};
use crate::config::Config;
use crate::constants::igmp;
use crate::error::Result;
use crate::random::Randomizer;

use super::{begin, header_overhead};

pub fn packet_size_v1(config: &Config) -> Result<usize> {
    Ok(header_overhead(config) + igmp::V1_HEADER_LEN)
}

pub fn build_v1(config: &Config, buffer: &mut PacketBuffer, rng: &mut Randomizer) -> Result<usize> {
    let cfg = &config.igmp;
    let mut frame = begin(config, buffer, rng, igmp::V1_HEADER_LEN)?;
    let start = frame.payload_start;

    let w = &mut frame.writer;
    w.put_u8(cfg.igmp_type)?;
    w.put_u8(cfg.code)?;
    w.put_u16(0)?;
    w.put_addr(rng.resolve_addr(cfg.group))?;

    frame.checksum_payload(start + 2, config, rng)?;
    frame.finish(config)
}

fn v3_len(config: &Config) -> usize {
    let sources = usize::from(config.igmp.sources) * 4;
    if config.igmp.igmp_type == igmp::V3_MEMBERSHIP_REPORT {
        igmp::V3_REPORT_LEN + igmp::V3_GROUP_RECORD_LEN + sources
    } else {
        igmp::V3_QUERY_LEN + sources
    }
}

pub fn packet_size_v3(config: &Config) -> Result<usize> {
    Ok(header_overhead(config) + v3_len(config))
}

pub fn build_v3(config: &Config, buffer: &mut PacketBuffer, rng: &mut Randomizer) -> Result<usize> {
    let cfg = &config.igmp;
    let mut frame = begin(config, buffer, rng, v3_len(config))?;
    let start = frame.payload_start;

    let w = &mut frame.writer;
    if cfg.igmp_type == igmp::V3_MEMBERSHIP_REPORT {
        w.put_u8(cfg.igmp_type)?;
        w.put_u8(0)?;
        w.put_u16(0)?;
        w.put_u16(0)?;
        // one group record
        w.put_u16(1)?;

        w.put_u8(cfg.grec_type)?;
        w.put_u8(0)?;
        w.put_u16(u16::from(cfg.sources))?;
        w.put_addr(rng.resolve_addr(cfg.grec_mca))?;
    } else {
        w.put_u8(cfg.igmp_type)?;
        w.put_u8(cfg.code)?;
        w.put_u16(0)?;
        w.put_addr(rng.resolve_addr(cfg.group))?;
        let suppress = if cfg.suppress { 0x08 } else { 0 };
        w.put_u8(suppress | (cfg.qrv & 0x07))?;
        w.put_u8(cfg.qqic)?;
        w.put_u16(u16::from(cfg.sources))?;
    }
    write_sources(w, config, rng)?;

    frame.checksum_payload(start + 2, config, rng)?;
    frame.finish(config)
}

fn write_sources(w: &mut PacketWriter<'_>, config: &Config, rng: &mut Randomizer) -> Result<()> {
    for i in 0..usize::from(config.igmp.sources) {
        let addr = config
            .igmp
            .source_addresses
            .get(i)
            .copied()
            .unwrap_or(std::net::Ipv4Addr::UNSPECIFIED);
        w.put_addr(rng.resolve_addr(addr))?;
    }
    Ok(())
}
