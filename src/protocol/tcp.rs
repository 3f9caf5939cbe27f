//! TCP header and options
//!
//! Options are written in a fixed order, followed by `tcp.nop` NOP bytes and
//! EOL padding up to the next 32-bit boundary.

use crate::buffer::{PacketBuffer, PacketWriter};
use crate::config::Config;
use crate::constants::{tcp, AUTH_DIGEST_LEN};
use crate::error::{PacketError, Result};
use crate::random::Randomizer;

use super::{begin, header_overhead};

/// Padded options length, rejecting anything the data offset cannot express.
pub fn options_len(config: &Config) -> Result<usize> {
    let opts = &config.tcp.options;
    let lengths = [
        (opts.mss, tcp::OPTLEN_MSS),
        (opts.wsopt, tcp::OPTLEN_WSOPT),
        (opts.tsopt, tcp::OPTLEN_TSOPT),
        (opts.sack_ok, tcp::OPTLEN_SACK_OK),
        (opts.cc, tcp::OPTLEN_CC),
        (opts.cc_new, tcp::OPTLEN_CC),
        (opts.cc_echo, tcp::OPTLEN_CC),
        (opts.sack_edge, tcp::OPTLEN_SACK_EDGE),
        (opts.md5, tcp::OPTLEN_MD5),
        (opts.auth, tcp::OPTLEN_AO),
    ];
    let raw: usize = lengths
        .iter()
        .filter(|(present, _)| *present)
        .map(|(_, len)| len)
        .sum::<usize>()
        + usize::from(config.tcp.nop);
    let padded = (raw + 3) & !3;

    if padded > tcp::MAX_OPTIONS_LEN {
        return Err(PacketError::TcpOptionsTooLarge {
            size: padded,
            limit: tcp::MAX_OPTIONS_LEN,
        }
        .into());
    }
    Ok(padded)
}

pub fn packet_size(config: &Config) -> Result<usize> {
    Ok(header_overhead(config) + tcp::HEADER_LEN + options_len(config)?)
}

fn flags(config: &Config) -> u8 {
    let t = &config.tcp;
    [
        (t.fin, tcp::FLAG_FIN),
        (t.syn, tcp::FLAG_SYN),
        (t.rst, tcp::FLAG_RST),
        (t.psh, tcp::FLAG_PSH),
        (t.ack, tcp::FLAG_ACK),
        (t.urg, tcp::FLAG_URG),
        (t.ece, tcp::FLAG_ECE),
        (t.cwr, tcp::FLAG_CWR),
    ]
    .iter()
    .filter(|(set, _)| *set)
    .fold(0, |acc, (_, bit)| acc | bit)
}

pub fn build(config: &Config, buffer: &mut PacketBuffer, rng: &mut Randomizer) -> Result<usize> {
    let cfg = &config.tcp;
    let opts_len = options_len(config)?;
    let mut frame = begin(config, buffer, rng, tcp::HEADER_LEN + opts_len)?;
    let start = frame.payload_start;

    let doff = if cfg.doff != 0 {
        cfg.doff & 0x0f
    } else {
        ((tcp::HEADER_LEN + opts_len) / 4) as u8
    };

    let w = &mut frame.writer;
    w.put_u16(rng.resolve_port(config.source_port))?;
    w.put_u16(rng.resolve_port(config.dest_port))?;
    w.put_u32(rng.resolve_u32(cfg.sequence))?;
    w.put_u32(if cfg.ack { rng.resolve_u32(cfg.acknowledge) } else { 0 })?;
    w.put_u8(doff << 4)?;
    w.put_u8(flags(config))?;
    w.put_u16(rng.resolve_u16(cfg.window))?;
    w.put_u16(0)?;
    w.put_u16(if cfg.urg { rng.resolve_u16(cfg.urg_ptr) } else { 0 })?;

    write_options(w, config, rng, opts_len)?;

    frame.checksum_pseudo(start + 16, config, rng)?;
    frame.finish(config)
}

fn write_options(w: &mut PacketWriter<'_>, config: &Config, rng: &mut Randomizer, padded: usize) -> Result<()> {
    let cfg = &config.tcp;
    let opts = &cfg.options;
    let start = w.position();

    if opts.mss {
        w.put_u8(tcp::OPT_MSS)?;
        w.put_u8(tcp::OPTLEN_MSS as u8)?;
        w.put_u16(rng.resolve_u16(cfg.mss))?;
    }
    if opts.wsopt {
        w.put_u8(tcp::OPT_WSOPT)?;
        w.put_u8(tcp::OPTLEN_WSOPT as u8)?;
        w.put_u8(rng.resolve_u8(cfg.wscale))?;
    }
    if opts.tsopt {
        w.put_u8(tcp::OPT_TSOPT)?;
        w.put_u8(tcp::OPTLEN_TSOPT as u8)?;
        w.put_u32(rng.resolve_u32(cfg.tsval))?;
        w.put_u32(rng.resolve_u32(cfg.tsecr))?;
    }
    if opts.sack_ok {
        w.put_u8(tcp::OPT_SACK_OK)?;
        w.put_u8(tcp::OPTLEN_SACK_OK as u8)?;
    }
    for (present, kind, value) in [
        (opts.cc, tcp::OPT_CC, cfg.cc),
        (opts.cc_new, tcp::OPT_CC_NEW, cfg.cc_new),
        (opts.cc_echo, tcp::OPT_CC_ECHO, cfg.cc_echo),
    ] {
        if present {
            w.put_u8(kind)?;
            w.put_u8(tcp::OPTLEN_CC as u8)?;
            w.put_u32(rng.resolve_u32(value))?;
        }
    }
    if opts.sack_edge {
        w.put_u8(tcp::OPT_SACK)?;
        w.put_u8(tcp::OPTLEN_SACK_EDGE as u8)?;
        w.put_u32(rng.resolve_u32(cfg.sack_left))?;
        w.put_u32(rng.resolve_u32(cfg.sack_right))?;
    }
    if opts.md5 {
        w.put_u8(tcp::OPT_MD5)?;
        w.put_u8(tcp::OPTLEN_MD5 as u8)?;
        w.put_random(rng, AUTH_DIGEST_LEN)?;
    }
    if opts.auth {
        w.put_u8(tcp::OPT_AO)?;
        w.put_u8(tcp::OPTLEN_AO as u8)?;
        w.put_u8(rng.resolve_u8(cfg.key_id))?;
        w.put_u8(rng.resolve_u8(cfg.next_key))?;
        w.put_random(rng, AUTH_DIGEST_LEN)?;
    }

    for _ in 0..cfg.nop {
        w.put_u8(tcp::OPT_NOP)?;
    }
    let written = w.position() - start;
    for _ in written..padded {
        w.put_u8(tcp::OPT_EOL)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_are_padded_to_words() {
        let mut config = Config::default();
        config.tcp.options.wsopt = true;
        assert_eq!(options_len(&config).unwrap(), 4);
        config.tcp.options.mss = true;
        config.tcp.nop = 1;
        assert_eq!(options_len(&config).unwrap(), 8);
    }

    #[test]
    fn test_oversized_options_rejected() {
        let mut config = Config::default();
        config.tcp.options.md5 = true;
        config.tcp.options.auth = true;
        config.tcp.options.mss = true;
        let err = options_len(&config).unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(
            err.to_string(),
            "Packet error: TCP options size (44 bytes) is bigger than 40 bytes"
        );
    }
}
