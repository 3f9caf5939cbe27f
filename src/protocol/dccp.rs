//! DCCP generic header plus the type-specific subheader.

use crate::buffer::{PacketBuffer, PacketWriter};
use crate::config::Config;
use crate::constants::dccp;
use crate::error::Result;
use crate::random::Randomizer;

use super::{begin, header_overhead};

/// Length of the subheader following the generic header.
pub fn subheader_len(config: &Config) -> usize {
    let ack = if config.dccp.ext {
        dccp::ACK_LONG_LEN
    } else {
        dccp::ACK_SHORT_LEN
    };
    match config.dccp.dccp_type {
        dccp::TYPE_REQUEST => dccp::REQUEST_LEN,
        dccp::TYPE_RESPONSE => dccp::RESPONSE_LEN,
        dccp::TYPE_RESET => dccp::RESET_LEN,
        dccp::TYPE_ACK
        | dccp::TYPE_DATAACK
        | dccp::TYPE_CLOSEREQ
        | dccp::TYPE_CLOSE
        | dccp::TYPE_SYNC
        | dccp::TYPE_SYNCACK => ack,
        _ => 0,
    }
}

fn dccp_len(config: &Config) -> usize {
    let ext = if config.dccp.ext { dccp::EXTENDED_LEN } else { 0 };
    dccp::HEADER_LEN + ext + subheader_len(config)
}

pub fn packet_size(config: &Config) -> Result<usize> {
    Ok(header_overhead(config) + dccp_len(config))
}

pub fn build(config: &Config, buffer: &mut PacketBuffer, rng: &mut Randomizer) -> Result<usize> {
    let cfg = &config.dccp;
    let len = dccp_len(config);
    let mut frame = begin(config, buffer, rng, len)?;
    let start = frame.payload_start;

    let doff = if cfg.doff != 0 { cfg.doff } else { (len / 4) as u8 };

    let w = &mut frame.writer;
    w.put_u16(rng.resolve_port(config.source_port))?;
    w.put_u16(rng.resolve_port(config.dest_port))?;
    w.put_u8(doff)?;
    w.put_u8((cfg.ccval << 4) | (cfg.cscov & 0x0f))?;
    w.put_u16(0)?;
    w.put_u8(((cfg.dccp_type & 0x0f) << 1) | u8::from(cfg.ext))?;
    if cfg.ext {
        w.put_u8(0)?;
        w.put_u16(rng.resolve_u16(cfg.sequence_high))?;
        w.put_u32(rng.resolve_u32(cfg.sequence_low))?;
    } else {
        w.put_u24(rng.resolve_u24(cfg.sequence_low))?;
    }

    match cfg.dccp_type {
        dccp::TYPE_REQUEST => {
            w.put_u32(rng.resolve_u32(cfg.service))?;
        }
        dccp::TYPE_RESPONSE => {
            write_long_ack(w, config, rng)?;
            w.put_u32(rng.resolve_u32(cfg.service))?;
        }
        dccp::TYPE_RESET => {
            write_long_ack(w, config, rng)?;
            w.put_u8(rng.resolve_u8(cfg.reset_code))?;
            w.put_bytes(&cfg.reset_data)?;
        }
        _ if subheader_len(config) == dccp::ACK_LONG_LEN => write_long_ack(w, config, rng)?,
        _ if subheader_len(config) == dccp::ACK_SHORT_LEN => {
            w.put_u8(0)?;
            w.put_u24(rng.resolve_u24(cfg.ack_low))?;
        }
        _ => {}
    }

    frame.checksum_pseudo(start + 6, config, rng)?;
    frame.finish(config)
}

fn write_long_ack(w: &mut PacketWriter<'_>, config: &Config, rng: &mut Randomizer) -> Result<()> {
    w.put_u16(0)?;
    w.put_u16(rng.resolve_u16(config.dccp.ack_high))?;
    w.put_u32(rng.resolve_u32(config.dccp.ack_low))
}
