//! OSPFv2 packets
//!
//! Wire order: 24-byte header, the type-specific body, a 16-byte digest when
//! cryptographic authentication is on, then the Link-Local Signaling block
//! when `ospf.lls` is set. With authentication the packet checksum and the
//! LLS checksum are both left at zero.

use std::net::Ipv4Addr;

use crate::buffer::{PacketBuffer, PacketWriter};
use crate::checksum::checksum;
use crate::config::Config;
use crate::constants::{ospf, AUTH_DIGEST_LEN};
use crate::error::Result;
use crate::random::Randomizer;

use super::{begin, finish_checksum, header_overhead};

/// Body length of the LSA selected by `ospf.lsa_type`.
pub fn lsa_body_len(lsa_type: u8) -> usize {
    match lsa_type {
        ospf::LSA_ROUTER => ospf::LSA_LEN_ROUTER,
        ospf::LSA_NETWORK => ospf::LSA_LEN_NETWORK,
        ospf::LSA_SUMMARY_IP | ospf::LSA_SUMMARY_AS => ospf::LSA_LEN_SUMMARY,
        ospf::LSA_AS_EXTERNAL | ospf::LSA_NSSA => ospf::LSA_LEN_EXTERNAL,
        ospf::LSA_MULTICAST => ospf::LSA_LEN_MULTICAST,
        _ => 0,
    }
}

fn body_len(config: &Config) -> usize {
    let cfg = &config.ospf;
    match cfg.packet_type {
        ospf::TYPE_HELLO => ospf::LEN_HELLO + usize::from(cfg.neighbors) * 4,
        ospf::TYPE_DD => {
            let lsa = if cfg.dd_include_lsa { ospf::LSA_HEADER_LEN } else { 0 };
            ospf::LEN_DD + lsa
        }
        ospf::TYPE_LSREQUEST => ospf::LEN_LSREQUEST,
        ospf::TYPE_LSUPDATE => ospf::LEN_LSUPDATE + ospf::LSA_HEADER_LEN + lsa_body_len(cfg.lsa_type),
        ospf::TYPE_LSACK => ospf::LSA_HEADER_LEN,
        _ => 0,
    }
}

/// Length of the LLS block, or zero when it is absent.
pub fn lls_len(config: &Config) -> usize {
    if !config.ospf.lls {
        return 0;
    }
    let crypto = if config.ospf.auth { ospf::LLS_CRYPTO_AUTH_LEN } else { 0 };
    ospf::LLS_HEADER_LEN + ospf::LLS_EXT_OPTIONS_LEN + crypto
}

fn ospf_len(config: &Config) -> usize {
    let digest = if config.ospf.auth { AUTH_DIGEST_LEN } else { 0 };
    ospf::HEADER_LEN + body_len(config) + digest + lls_len(config)
}

pub fn packet_size(config: &Config) -> Result<usize> {
    Ok(header_overhead(config) + ospf_len(config))
}

/// Options advertised in Hello and Database Description bodies.
fn options(config: &Config) -> u8 {
    if config.ospf.lls {
        config.ospf.options | ospf::OPTION_LLS
    } else {
        config.ospf.options
    }
}

pub fn build(config: &Config, buffer: &mut PacketBuffer, rng: &mut Randomizer) -> Result<usize> {
    let cfg = &config.ospf;
    let mut frame = begin(config, buffer, rng, ospf_len(config))?;
    let start = frame.payload_start;
    let packet_len = ospf::HEADER_LEN + body_len(config);
    let crypto_sequence = rng.resolve_u32(cfg.sequence);

    let w = &mut frame.writer;
    w.put_u8(ospf::VERSION)?;
    w.put_u8(cfg.packet_type)?;
    w.put_u16(packet_len as u16)?;
    w.put_addr(rng.resolve_addr(cfg.router_id))?;
    w.put_addr(rng.resolve_addr(cfg.area_id))?;
    let check = w.skip(2)?;
    if cfg.auth {
        w.put_u16(ospf::AUTH_CRYPTO)?;
        w.put_u16(0)?;
        w.put_u8(cfg.key_id)?;
        w.put_u8(AUTH_DIGEST_LEN as u8)?;
        w.put_u32(crypto_sequence)?;
    } else {
        w.put_u16(ospf::AUTH_NONE)?;
        w.put_zeros(8)?;
    }

    match cfg.packet_type {
        ospf::TYPE_HELLO => write_hello(w, config, rng)?,
        ospf::TYPE_DD => {
            w.put_u16(rng.resolve_u16(cfg.dd_mtu))?;
            w.put_u8(options(config))?;
            w.put_u8(cfg.dd_flags & 0x07)?;
            w.put_u32(rng.resolve_u32(cfg.dd_sequence))?;
            if cfg.dd_include_lsa {
                write_lsa_header_and_body(w, config, rng, false)?;
            }
        }
        ospf::TYPE_LSREQUEST => {
            w.put_u32(u32::from(cfg.lsa_type))?;
            w.put_addr(rng.resolve_addr(cfg.lsa_id))?;
            w.put_addr(rng.resolve_addr(cfg.lsa_router))?;
        }
        ospf::TYPE_LSUPDATE => {
            // one advertisement
            w.put_u32(1)?;
            write_lsa_header_and_body(w, config, rng, true)?;
        }
        ospf::TYPE_LSACK => write_lsa_header_and_body(w, config, rng, false)?,
        _ => {}
    }

    if cfg.auth {
        w.put_random(rng, AUTH_DIGEST_LEN)?;
    } else {
        frame.checksum_range(check, start, start + packet_len, config, rng)?;
    }

    if cfg.lls {
        write_lls(&mut frame.writer, config, rng, crypto_sequence)?;
    }

    frame.finish(config)
}

fn write_hello(w: &mut PacketWriter<'_>, config: &Config, rng: &mut Randomizer) -> Result<()> {
    let cfg = &config.ospf;
    w.put_addr(rng.resolve_netmask(cfg.netmask))?;
    w.put_u16(rng.resolve_u16(cfg.hello_interval))?;
    w.put_u8(options(config))?;
    w.put_u8(rng.resolve_u8(cfg.hello_priority))?;
    w.put_u32(rng.resolve_u32(cfg.hello_dead))?;
    w.put_addr(rng.resolve_addr(cfg.designated))?;
    w.put_addr(rng.resolve_addr(cfg.backup))?;
    for i in 0..usize::from(cfg.neighbors) {
        let neighbor = cfg.neighbor_addresses.get(i).copied().unwrap_or(Ipv4Addr::UNSPECIFIED);
        w.put_addr(rng.resolve_addr(neighbor))?;
    }
    Ok(())
}

/// Writes one LSA header and, when `with_body` is set, the body selected by
/// `ospf.lsa_type`. The header length always advertises the full LSA.
///
/// Shared by LS Update, LS Acknowledgment and Database Description packets.
pub fn write_lsa_header_and_body(
    w: &mut PacketWriter<'_>,
    config: &Config,
    rng: &mut Randomizer,
    with_body: bool,
) -> Result<()> {
    let cfg = &config.ospf;
    let start = w.position();
    let body_len = lsa_body_len(cfg.lsa_type);

    w.put_u16(rng.resolve_u16(cfg.lsa_age))?;
    w.put_u8(cfg.options)?;
    w.put_u8(cfg.lsa_type)?;
    w.put_addr(rng.resolve_addr(cfg.lsa_id))?;
    w.put_addr(rng.resolve_addr(cfg.lsa_router))?;
    w.put_u32(rng.resolve_u32(cfg.lsa_sequence))?;
    let check = w.skip(2)?;
    w.put_u16((ospf::LSA_HEADER_LEN + body_len) as u16)?;

    if with_body {
        write_lsa_body(w, config, rng)?;
    }

    // the age field is excluded from the LSA checksum
    let sum = checksum(w.written(start + 2, w.position()));
    w.patch_checksum(check, finish_checksum(config, rng, sum))
}

fn write_lsa_body(w: &mut PacketWriter<'_>, config: &Config, rng: &mut Randomizer) -> Result<()> {
    let cfg = &config.ospf;
    match cfg.lsa_type {
        ospf::LSA_ROUTER => {
            w.put_u8(cfg.lsa_flags)?;
            w.put_u8(0)?;
            // one link
            w.put_u16(1)?;
            w.put_addr(rng.resolve_addr(cfg.lsa_link_id))?;
            w.put_addr(rng.resolve_addr(cfg.lsa_link_data))?;
            w.put_u8(cfg.lsa_link_type)?;
            w.put_u8(0)?;
            w.put_u16(rng.resolve_u16(cfg.lsa_metric as u16))
        }
        ospf::LSA_NETWORK => {
            w.put_addr(rng.resolve_netmask(cfg.netmask))?;
            w.put_addr(rng.resolve_addr(cfg.lsa_attached))
        }
        ospf::LSA_SUMMARY_IP | ospf::LSA_SUMMARY_AS => {
            w.put_addr(rng.resolve_netmask(cfg.netmask))?;
            // reserved octet overlapping the high byte of the metric word
            w.put_u8(0)?;
            w.put_u24(rng.resolve_u24(cfg.lsa_metric))
        }
        ospf::LSA_AS_EXTERNAL | ospf::LSA_NSSA => {
            w.put_addr(rng.resolve_netmask(cfg.netmask))?;
            w.put_u8(if cfg.lsa_larger { 0x80 } else { 0 })?;
            w.put_u24(rng.resolve_u24(cfg.lsa_metric))?;
            w.put_addr(rng.resolve_addr(cfg.lsa_forward))?;
            w.put_u32(rng.resolve_u32(cfg.lsa_external))
        }
        ospf::LSA_MULTICAST => {
            w.put_u32(rng.resolve_u32(cfg.vertex_type))?;
            w.put_addr(rng.resolve_addr(cfg.vertex_id))
        }
        _ => Ok(()),
    }
}

fn write_lls(w: &mut PacketWriter<'_>, config: &Config, rng: &mut Randomizer, crypto_sequence: u32) -> Result<()> {
    let cfg = &config.ospf;
    let start = w.position();
    let check = w.skip(2)?;
    w.put_u16((lls_len(config) / 4) as u16)?;

    w.put_u16(ospf::LLS_TYPE_EXT_OPTIONS)?;
    w.put_u16(4)?;
    w.put_u32(rng.resolve_u32(cfg.lls_options))?;

    if cfg.auth {
        w.put_u16(ospf::LLS_TYPE_CRYPTO_AUTH)?;
        w.put_u16((ospf::LLS_CRYPTO_AUTH_LEN - 4) as u16)?;
        w.put_u32(crypto_sequence)?;
        w.put_random(rng, AUTH_DIGEST_LEN)?;
        return Ok(());
    }

    let sum = checksum(w.written(start, w.position()));
    w.patch_checksum(check, finish_checksum(config, rng, sum))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lls_block_lengths() {
        let mut config = Config::default();
        assert_eq!(lls_len(&config), 0);
        config.ospf.lls = true;
        assert_eq!(lls_len(&config), 12);
        config.ospf.auth = true;
        assert_eq!(lls_len(&config), 36);
    }

    #[test]
    fn test_lsa_body_sizes() {
        assert_eq!(lsa_body_len(ospf::LSA_ROUTER), 16);
        assert_eq!(lsa_body_len(ospf::LSA_SUMMARY_AS), 8);
        assert_eq!(lsa_body_len(ospf::LSA_NSSA), 16);
        assert_eq!(lsa_body_len(42), 0);
    }
}
