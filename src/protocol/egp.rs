use crate::buffer::PacketBuffer;
use crate::config::Config;
use crate::constants::egp;
use crate::error::Result;
use crate::random::Randomizer;

use super::{begin, header_overhead};

const EGP_LEN: usize = egp::HEADER_LEN + egp::ACQUIRE_LEN;

pub fn packet_size(config: &Config) -> Result<usize> {
    Ok(header_overhead(config) + EGP_LEN)
}

/// Neighbor acquisition message: common header plus hello and poll intervals.
pub fn build(config: &Config, buffer: &mut PacketBuffer, rng: &mut Randomizer) -> Result<usize> {
    let cfg = &config.egp;
    let mut frame = begin(config, buffer, rng, EGP_LEN)?;
    let start = frame.payload_start;

    let w = &mut frame.writer;
    w.put_u8(egp::VERSION)?;
    w.put_u8(cfg.egp_type)?;
    w.put_u8(cfg.code)?;
    w.put_u8(cfg.status)?;
    w.put_u16(0)?;
    w.put_u16(rng.resolve_u16(cfg.autonomous_system))?;
    w.put_u16(rng.resolve_u16(cfg.sequence))?;
    w.put_u16(rng.resolve_u16(cfg.hello))?;
    w.put_u16(rng.resolve_u16(cfg.poll))?;

    frame.checksum_payload(start + 4, config, rng)?;
    frame.finish(config)
}
