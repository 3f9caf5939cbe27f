use crate::buffer::PacketBuffer;
use crate::config::Config;
use crate::constants::{ipproto, ipsec};
use crate::error::Result;
use crate::random::Randomizer;

use super::{begin, header_overhead};

fn icv_len(config: &Config) -> usize {
    usize::from(config.ipsec.ah_length) * 4
}

fn ipsec_len(config: &Config) -> usize {
    ipsec::AH_HEADER_LEN + icv_len(config) + ipsec::ESP_HEADER_LEN + ipsec::ESP_DATA_LEN
}

pub fn packet_size(config: &Config) -> Result<usize> {
    Ok(header_overhead(config) + ipsec_len(config))
}

/// Authentication header with a random ICV, followed by an ESP header and
/// eight bytes of opaque payload. Neither carries a checksum.
pub fn build(config: &Config, buffer: &mut PacketBuffer, rng: &mut Randomizer) -> Result<usize> {
    let cfg = &config.ipsec;
    let mut frame = begin(config, buffer, rng, ipsec_len(config))?;

    let w = &mut frame.writer;
    w.put_u8(ipproto::ESP)?;
    // AH length in 32-bit words minus two
    w.put_u8(cfg.ah_length.wrapping_add(1))?;
    w.put_u16(0)?;
    w.put_u32(rng.resolve_u32(cfg.ah_spi))?;
    w.put_u32(rng.resolve_u32(cfg.ah_sequence))?;
    w.put_random(rng, icv_len(config))?;

    w.put_u32(rng.resolve_u32(cfg.esp_spi))?;
    w.put_u32(rng.resolve_u32(cfg.esp_sequence))?;
    w.put_random(rng, ipsec::ESP_DATA_LEN)?;

    frame.finish(config)
}
