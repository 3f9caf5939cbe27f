use crate::buffer::{PacketBuffer, PacketWriter};
use crate::config::Config;
use crate::constants::udp;
use crate::error::Result;
use crate::random::Randomizer;

use super::{begin, header_overhead};

pub fn packet_size(config: &Config) -> Result<usize> {
    Ok(header_overhead(config) + udp::HEADER_LEN)
}

pub fn build(config: &Config, buffer: &mut PacketBuffer, rng: &mut Randomizer) -> Result<usize> {
    let mut frame = begin(config, buffer, rng, udp::HEADER_LEN)?;
    let start = frame.payload_start;

    let sport = rng.resolve_port(config.source_port);
    let dport = rng.resolve_port(config.dest_port);
    write_header(&mut frame.writer, sport, dport, udp::HEADER_LEN)?;

    frame.checksum_pseudo(start + 6, config, rng)?;
    frame.finish(config)
}

/// Header with a zero checksum, also used in front of RIP messages.
pub fn write_header(w: &mut PacketWriter<'_>, sport: u16, dport: u16, length: usize) -> Result<()> {
    w.put_u16(sport)?;
    w.put_u16(dport)?;
    w.put_u16(length as u16)?;
    w.put_u16(0)
}
