use crate::buffer::PacketBuffer;
use crate::config::Config;
use crate::constants::icmp;
use crate::error::Result;
use crate::random::Randomizer;

use super::{begin, header_overhead};

pub fn packet_size(config: &Config) -> Result<usize> {
    Ok(header_overhead(config) + icmp::HEADER_LEN)
}

/// Echo-style header; redirects carry a gateway address instead of id and
/// sequence.
pub fn build(config: &Config, buffer: &mut PacketBuffer, rng: &mut Randomizer) -> Result<usize> {
    let cfg = &config.icmp;
    let mut frame = begin(config, buffer, rng, icmp::HEADER_LEN)?;
    let start = frame.payload_start;

    let w = &mut frame.writer;
    w.put_u8(cfg.icmp_type)?;
    w.put_u8(cfg.code)?;
    w.put_u16(0)?;
    let is_redirect = cfg.icmp_type == icmp::REDIRECT
        && (cfg.code == icmp::REDIRECT_NET || cfg.code == icmp::REDIRECT_HOST);
    if is_redirect {
        w.put_addr(rng.resolve_addr(cfg.gateway))?;
    } else {
        w.put_u16(rng.resolve_u16(cfg.id))?;
        w.put_u16(rng.resolve_u16(cfg.sequence))?;
    }

    frame.checksum_payload(start + 2, config, rng)?;
    frame.finish(config)
}
