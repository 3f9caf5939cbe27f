//! Protocol header builders
//!
//! Every builder follows the same shape: a pure `packet_size` derived from the
//! configuration alone, and a `build` that reserves exactly that many bytes,
//! writes the IP header (plus GRE when encapsulating) through [`begin`], writes
//! its own fields, fills its checksums and closes with [`Frame::finish`].

pub mod dccp;
pub mod egp;
pub mod eigrp;
pub mod gre;
pub mod icmp;
pub mod igmp;
pub mod ip;
pub mod ipsec;
pub mod ospf;
pub mod rip;
pub mod rsvp;
pub mod tcp;
pub mod udp;

use std::net::Ipv4Addr;

use crate::buffer::{PacketBuffer, PacketWriter};
use crate::checksum::Checksum;
use crate::config::Config;
use crate::error::{PacketError, Result};
use crate::random::Randomizer;
use crate::registry::ProtocolModule;

/// Bytes in front of the protocol header: outer IP plus the GRE overhead.
pub fn header_overhead(config: &Config) -> usize {
    let gre = if config.encapsulated {
        gre::overhead(config)
    } else {
        0
    };
    ip::HEADER_LEN + gre
}

/// A packet under construction, positioned at the start of the protocol header.
pub struct Frame<'a> {
    pub writer: PacketWriter<'a>,
    /// Addresses of the innermost IP header, used by pseudo-header checksums.
    pub saddr: Ipv4Addr,
    pub daddr: Ipv4Addr,
    /// Offset of the first protocol byte.
    pub payload_start: usize,
    gre_start: Option<usize>,
}

/// Reserves `header_overhead + payload_len` bytes and writes the IP layer.
pub fn begin<'a>(
    config: &Config,
    buffer: &'a mut PacketBuffer,
    rng: &mut Randomizer,
    payload_len: usize,
) -> Result<Frame<'a>> {
    let total = header_overhead(config) + payload_len;
    let mut writer = PacketWriter::new(buffer.ensure(total)?);

    let outer = ip::IpHeader::from_config(config, rng, total)?;
    if !config.encapsulated {
        outer.write(&mut writer)?;
        return Ok(Frame {
            writer,
            saddr: outer.saddr,
            daddr: outer.daddr,
            payload_start: ip::HEADER_LEN,
            gre_start: None,
        });
    }

    let outer = outer.encapsulating();
    outer.write(&mut writer)?;
    let gre_start = writer.position();
    let inner = gre::write(&mut writer, config, &outer, payload_len, rng)?;
    Ok(Frame {
        payload_start: writer.position(),
        writer,
        saddr: inner.saddr,
        daddr: inner.daddr,
        gre_start: Some(gre_start),
    })
}

impl<'a> Frame<'a> {
    /// Bytes from the protocol header start up to the current position.
    pub fn payload(&self) -> &[u8] {
        self.writer.written(self.payload_start, self.writer.position())
    }

    /// Fills the checksum at `field` with the sum over `start..end`.
    pub fn checksum_range(
        &mut self,
        field: usize,
        start: usize,
        end: usize,
        config: &Config,
        rng: &mut Randomizer,
    ) -> Result<()> {
        let sum = crate::checksum::checksum(self.writer.written(start, end));
        self.writer.patch_checksum(field, finish_checksum(config, rng, sum))
    }

    /// Plain checksum over the whole protocol payload written so far.
    pub fn checksum_payload(&mut self, field: usize, config: &Config, rng: &mut Randomizer) -> Result<()> {
        let (start, end) = (self.payload_start, self.writer.position());
        self.checksum_range(field, start, end, config, rng)
    }

    /// Pseudo-header checksum used by TCP, UDP and DCCP.
    pub fn checksum_pseudo(&mut self, field: usize, config: &Config, rng: &mut Randomizer) -> Result<()> {
        let sum = pseudo_header_checksum(self.saddr, self.daddr, config.ip.protocol, self.payload());
        self.writer.patch_checksum(field, finish_checksum(config, rng, sum))
    }

    /// Runs the GRE checksum pass when encapsulating and checks the packet
    /// was written to exactly its predicted size.
    pub fn finish(mut self, config: &Config) -> Result<usize> {
        if let Some(gre_start) = self.gre_start {
            gre::finalize(&mut self.writer, config, gre_start)?;
        }
        self.writer.finish()
    }
}

/// The computed checksum, or a random one in bogus-checksum mode.
pub fn finish_checksum(config: &Config, rng: &mut Randomizer, sum: u16) -> u16 {
    if config.bogus_csum {
        rng.u16()
    } else {
        sum
    }
}

/// Checksum over the IPv4 pseudo-header followed by `segment`.
pub fn pseudo_header_checksum(saddr: Ipv4Addr, daddr: Ipv4Addr, protocol: u8, segment: &[u8]) -> u16 {
    let length = segment.len() as u16;
    let mut pseudo = [0u8; crate::constants::PSEUDO_HEADER_LEN];
    pseudo[0..4].copy_from_slice(&saddr.octets());
    pseudo[4..8].copy_from_slice(&daddr.octets());
    pseudo[9] = protocol;
    pseudo[10..12].copy_from_slice(&length.to_be_bytes());
    Checksum::new().add(&pseudo).add(segment).finish()
}

/// Builds one packet for `module` into `buffer` and returns its bytes.
///
/// The active protocol id is recorded in `config.ip.protocol` so the IP layer
/// and pseudo-header checksums see the right value.
pub fn synthesize<'b>(
    config: &mut Config,
    module: &ProtocolModule,
    buffer: &'b mut PacketBuffer,
    rng: &mut Randomizer,
) -> Result<&'b [u8]> {
    config.ip.protocol = module.protocol;
    let size = (module.build)(config, buffer, rng)?;
    if size == 0 {
        return Err(PacketError::InvalidSize(size).into());
    }
    Ok(buffer.packet(size))
}
