//! RSVP messages
//!
//! A message is the common header followed by the objects its type is
//! eligible for, always in [`RsvpObject`] declaration order. Unknown message
//! types carry SESSION only.

use std::net::Ipv4Addr;

use crate::buffer::{PacketBuffer, PacketWriter};
use crate::config::Config;
use crate::constants::rsvp;
use crate::error::Result;
use crate::random::Randomizer;

use super::{begin, header_overhead};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RsvpObject {
    Session,
    RsvpHop,
    TimeValues,
    ErrorSpec,
    Scope,
    ResvConfirm,
    Style,
    SenderTemplate,
    SenderTspec,
    Adspec,
}

impl RsvpObject {
    pub fn class(self) -> u8 {
        match self {
            RsvpObject::Session => rsvp::CLASS_SESSION,
            RsvpObject::RsvpHop => rsvp::CLASS_RSVP_HOP,
            RsvpObject::TimeValues => rsvp::CLASS_TIME_VALUES,
            RsvpObject::ErrorSpec => rsvp::CLASS_ERROR_SPEC,
            RsvpObject::Scope => rsvp::CLASS_SCOPE,
            RsvpObject::ResvConfirm => rsvp::CLASS_RESV_CONFIRM,
            RsvpObject::Style => rsvp::CLASS_STYLE,
            RsvpObject::SenderTemplate => rsvp::CLASS_SENDER_TEMPLATE,
            RsvpObject::SenderTspec => rsvp::CLASS_SENDER_TSPEC,
            RsvpObject::Adspec => rsvp::CLASS_ADSPEC,
        }
    }

    fn c_type(self) -> u8 {
        match self {
            RsvpObject::SenderTspec | RsvpObject::Adspec => 2,
            _ => 1,
        }
    }

    /// Object length including its 4-byte object header.
    pub fn len(self, config: &Config) -> usize {
        let cfg = &config.rsvp;
        match self {
            RsvpObject::Session => rsvp::LEN_SESSION,
            RsvpObject::RsvpHop => rsvp::LEN_RSVP_HOP,
            RsvpObject::TimeValues => rsvp::LEN_TIME_VALUES,
            RsvpObject::ErrorSpec => rsvp::LEN_ERROR_SPEC,
            RsvpObject::Scope => rsvp::OBJECT_HEADER_LEN + usize::from(cfg.scope) * 4,
            RsvpObject::ResvConfirm => rsvp::LEN_RESV_CONFIRM,
            RsvpObject::Style => rsvp::LEN_STYLE,
            RsvpObject::SenderTemplate => rsvp::LEN_SENDER_TEMPLATE,
            RsvpObject::SenderTspec => rsvp::LEN_SENDER_TSPEC + tspec_service_len(config),
            RsvpObject::Adspec => rsvp::LEN_ADSPEC + adspec_service_len(config),
        }
    }
}

const ALL_OBJECTS: [RsvpObject; 10] = [
    RsvpObject::Session,
    RsvpObject::RsvpHop,
    RsvpObject::TimeValues,
    RsvpObject::ErrorSpec,
    RsvpObject::Scope,
    RsvpObject::ResvConfirm,
    RsvpObject::Style,
    RsvpObject::SenderTemplate,
    RsvpObject::SenderTspec,
    RsvpObject::Adspec,
];

/// Whether `object` belongs in a message of type `msg_type`.
pub fn is_eligible(msg_type: u8, object: RsvpObject) -> bool {
    use RsvpObject::*;
    match object {
        Session => true,
        RsvpHop => matches!(
            msg_type,
            rsvp::MSG_PATH | rsvp::MSG_RESV | rsvp::MSG_RESVERR | rsvp::MSG_PATHTEAR | rsvp::MSG_RESVTEAR
        ),
        TimeValues => matches!(msg_type, rsvp::MSG_PATH | rsvp::MSG_RESV),
        ErrorSpec => matches!(msg_type, rsvp::MSG_PATHERR | rsvp::MSG_RESVERR | rsvp::MSG_RESVCONF),
        Scope => matches!(msg_type, rsvp::MSG_RESV | rsvp::MSG_RESVERR | rsvp::MSG_RESVTEAR),
        ResvConfirm => matches!(msg_type, rsvp::MSG_RESV | rsvp::MSG_RESVCONF),
        Style => matches!(
            msg_type,
            rsvp::MSG_RESV | rsvp::MSG_RESVERR | rsvp::MSG_RESVTEAR | rsvp::MSG_RESVCONF
        ),
        SenderTemplate => matches!(msg_type, rsvp::MSG_PATH | rsvp::MSG_PATHERR | rsvp::MSG_PATHTEAR),
        SenderTspec | Adspec => matches!(msg_type, rsvp::MSG_PATH | rsvp::MSG_PATHERR),
    }
}

/// Objects carried by a message of type `msg_type`, in wire order.
pub fn objects(msg_type: u8) -> impl Iterator<Item = RsvpObject> {
    ALL_OBJECTS
        .into_iter()
        .filter(move |object| is_eligible(msg_type, *object))
}

fn tspec_service_len(config: &Config) -> usize {
    match config.rsvp.tspec {
        rsvp::TSPEC_TRAFFIC_SERVICE | rsvp::TSPEC_GUARANTEED_SERVICE => rsvp::TSPEC_SERVICE_LEN,
        _ => 0,
    }
}

/// Controlled-load advertisements carry the guaranteed fragment as well.
fn adspec_service_len(config: &Config) -> usize {
    match config.rsvp.adspec {
        rsvp::ADSPEC_GUARANTEED_SERVICE => rsvp::ADSPEC_GUARANTEED_LEN,
        rsvp::ADSPEC_CONTROLLED_SERVICE => rsvp::ADSPEC_GUARANTEED_LEN + rsvp::ADSPEC_CONTROLLED_LEN,
        _ => 0,
    }
}

fn rsvp_len(config: &Config) -> usize {
    rsvp::HEADER_LEN
        + objects(config.rsvp.msg_type)
            .map(|object| object.len(config))
            .sum::<usize>()
}

pub fn packet_size(config: &Config) -> Result<usize> {
    Ok(header_overhead(config) + rsvp_len(config))
}

pub fn build(config: &Config, buffer: &mut PacketBuffer, rng: &mut Randomizer) -> Result<usize> {
    let cfg = &config.rsvp;
    let len = rsvp_len(config);
    let mut frame = begin(config, buffer, rng, len)?;
    let start = frame.payload_start;

    let w = &mut frame.writer;
    w.put_u8((rsvp::VERSION << 4) | (cfg.flags & 0x0f))?;
    w.put_u8(cfg.msg_type)?;
    w.put_u16(0)?;
    w.put_u8(rng.resolve_u8(cfg.send_ttl))?;
    w.put_u8(0)?;
    w.put_u16(len as u16)?;

    for object in objects(cfg.msg_type) {
        w.put_u16(object.len(config) as u16)?;
        w.put_u8(object.class())?;
        w.put_u8(object.c_type())?;
        write_object_body(w, object, config, rng)?;
    }

    frame.checksum_payload(start + 2, config, rng)?;
    frame.finish(config)
}

fn write_object_body(
    w: &mut PacketWriter<'_>,
    object: RsvpObject,
    config: &Config,
    rng: &mut Randomizer,
) -> Result<()> {
    let cfg = &config.rsvp;
    match object {
        RsvpObject::Session => {
            w.put_addr(rng.resolve_addr(cfg.session_addr))?;
            w.put_u8(rng.resolve_u8(cfg.session_protocol))?;
            w.put_u8(cfg.session_flags)?;
            w.put_u16(rng.resolve_port(cfg.session_port))
        }
        RsvpObject::RsvpHop => {
            w.put_addr(rng.resolve_addr(cfg.hop_addr))?;
            w.put_u32(rng.resolve_u32(cfg.hop_iface))
        }
        RsvpObject::TimeValues => w.put_u32(rng.resolve_u32(cfg.time_refresh)),
        RsvpObject::ErrorSpec => {
            w.put_addr(rng.resolve_addr(cfg.error_addr))?;
            w.put_u8(cfg.error_flags)?;
            w.put_u8(rng.resolve_u8(cfg.error_code))?;
            w.put_u16(rng.resolve_u16(cfg.error_value))
        }
        RsvpObject::Scope => {
            for i in 0..usize::from(cfg.scope) {
                let addr = cfg.scope_addresses.get(i).copied().unwrap_or(Ipv4Addr::UNSPECIFIED);
                w.put_addr(rng.resolve_addr(addr))?;
            }
            Ok(())
        }
        RsvpObject::ResvConfirm => w.put_addr(rng.resolve_addr(cfg.confirm_addr)),
        RsvpObject::Style => {
            w.put_u8(0)?;
            w.put_u24(rng.resolve_u24(cfg.style_option))
        }
        RsvpObject::SenderTemplate => {
            w.put_addr(rng.resolve_addr(cfg.sender_addr))?;
            w.put_u16(0)?;
            w.put_u16(rng.resolve_port(cfg.sender_port))
        }
        RsvpObject::SenderTspec => write_tspec(w, config, rng),
        RsvpObject::Adspec => write_adspec(w, config, rng),
    }
}

/// IntServ message header, then one service fragment with a token bucket.
fn write_tspec(w: &mut PacketWriter<'_>, config: &Config, rng: &mut Randomizer) -> Result<()> {
    let cfg = &config.rsvp;
    let service_len = tspec_service_len(config);
    w.put_u16(0)?;
    w.put_u16((service_len / 4) as u16)?;
    if service_len == 0 {
        return Ok(());
    }

    w.put_u8(cfg.tspec)?;
    w.put_u8(0)?;
    w.put_u16((service_len / 4 - 1) as u16)?;
    w.put_u8(rsvp::TSPEC_TOKEN_BUCKET)?;
    w.put_u8(0)?;
    w.put_u16((service_len / 4 - 2) as u16)?;
    w.put_u32(rng.resolve_u32(cfg.token_rate))?;
    w.put_u32(rng.resolve_u32(cfg.token_size))?;
    w.put_u32(rng.resolve_u32(cfg.peak_rate))?;
    w.put_u32(rng.resolve_u32(cfg.min_policed))?;
    w.put_u32(rng.resolve_u32(cfg.max_packet))
}

/// Parameter header followed by a single 32-bit value.
fn put_param(w: &mut PacketWriter<'_>, id: u8, value: u32) -> Result<()> {
    w.put_u8(id)?;
    w.put_u8(0)?;
    w.put_u16(1)?;
    w.put_u32(value)
}

/// General characterization parameters, then the guaranteed fragment and the
/// controlled-load fragment depending on `rsvp.adspec`.
fn write_adspec(w: &mut PacketWriter<'_>, config: &Config, rng: &mut Randomizer) -> Result<()> {
    let cfg = &config.rsvp;
    let body_words = (rsvp::LEN_ADSPEC + adspec_service_len(config)) / 4 - 2;
    w.put_u16(0)?;
    w.put_u16(body_words as u16)?;

    // default general parameters, service 1
    w.put_u8(1)?;
    w.put_u8(0)?;
    w.put_u16(8)?;
    put_param(w, 4, rng.resolve_u32(cfg.adspec_hop))?;
    put_param(w, 6, rng.resolve_u32(cfg.adspec_path_bw))?;
    put_param(w, 8, rng.resolve_u32(cfg.adspec_min_latency))?;
    put_param(w, 10, rng.resolve_u32(cfg.adspec_mtu))?;

    if adspec_service_len(config) == 0 {
        return Ok(());
    }

    w.put_u8(rsvp::ADSPEC_GUARANTEED_SERVICE)?;
    w.put_u8(0)?;
    w.put_u16(8)?;
    put_param(w, 133, rng.resolve_u32(cfg.adspec_ctot))?;
    put_param(w, 134, rng.resolve_u32(cfg.adspec_dtot))?;
    put_param(w, 135, rng.resolve_u32(cfg.adspec_csum))?;
    put_param(w, 136, rng.resolve_u32(cfg.adspec_dsum))?;

    if cfg.adspec == rsvp::ADSPEC_CONTROLLED_SERVICE {
        w.put_u8(rsvp::ADSPEC_CONTROLLED_SERVICE)?;
        w.put_u8(0)?;
        w.put_u16(0)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_message_carries_session_only() {
        let only: Vec<_> = objects(42).collect();
        assert_eq!(only, vec![RsvpObject::Session]);
    }

    #[test]
    fn test_adspec_lengths() {
        let mut config = Config::default();
        config.rsvp.adspec = rsvp::ADSPEC_GUARANTEED_SERVICE;
        assert_eq!(RsvpObject::Adspec.len(&config), 80);
        config.rsvp.adspec = rsvp::ADSPEC_CONTROLLED_SERVICE;
        assert_eq!(RsvpObject::Adspec.len(&config), 84);
        config.rsvp.adspec = 0;
        assert_eq!(RsvpObject::Adspec.len(&config), 44);
    }
}
