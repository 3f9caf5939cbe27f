//! IPv4 header helper shared by every builder and the GRE layer.

use std::net::Ipv4Addr;

use crate::buffer::PacketWriter;
use crate::checksum::checksum;
use crate::config::Config;
use crate::constants::{ip, ipproto};
use crate::error::{PacketError, Result};
use crate::random::Randomizer;

pub use crate::constants::ip::HEADER_LEN;

/// Resolved header fields; randomized values are drawn once so the GRE inner
/// header can copy them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IpHeader {
    pub tos: u8,
    pub total_len: u16,
    pub id: u16,
    pub frag: u16,
    pub ttl: u8,
    pub protocol: u8,
    pub saddr: Ipv4Addr,
    pub daddr: Ipv4Addr,
}

impl IpHeader {
    pub fn from_config(config: &Config, rng: &mut Randomizer, total_len: usize) -> Result<Self> {
        let total_len = u16::try_from(total_len).map_err(|_| PacketError::InvalidSize(total_len))?;
        Ok(Self {
            tos: config.ip.tos,
            total_len,
            id: rng.resolve_u16(config.ip.id),
            frag: fragment_field(config.ip.frag_offset),
            ttl: config.ip.ttl,
            protocol: config.ip.protocol,
            saddr: rng.resolve_addr(config.ip.saddr),
            daddr: config.ip.daddr,
        })
    }

    /// The outer header of an encapsulated packet carries GRE.
    pub fn encapsulating(self) -> Self {
        Self {
            protocol: ipproto::GRE,
            ..self
        }
    }

    /// Writes the 20-byte header with its checksum filled in.
    pub fn write(&self, w: &mut PacketWriter<'_>) -> Result<()> {
        let start = w.position();
        w.put_u8((ip::VERSION << 4) | (HEADER_LEN / 4) as u8)?;
        w.put_u8(self.tos)?;
        w.put_u16(self.total_len)?;
        w.put_u16(self.id)?;
        w.put_u16(self.frag)?;
        w.put_u8(self.ttl)?;
        w.put_u8(self.protocol)?;
        let check = w.skip(2)?;
        w.put_addr(self.saddr)?;
        w.put_addr(self.daddr)?;

        let sum = checksum(w.written(start, start + HEADER_LEN));
        w.patch_checksum(check, sum)
    }
}

/// Fragment offset in bytes becomes an offset in 8-byte units with MF set;
/// no offset means don't-fragment.
pub fn fragment_field(frag_offset: u16) -> u16 {
    if frag_offset != 0 {
        (frag_offset >> 3) | ip::FLAG_MF
    } else {
        ip::FLAG_DF
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment_field() {
        assert_eq!(fragment_field(0), 0x4000);
        assert_eq!(fragment_field(1480), 0x2000 | 185);
    }

    #[test]
    fn test_header_checksum_verifies() {
        let mut config = Config::default();
        config.ip.protocol = ipproto::UDP;
        config.ip.daddr = Ipv4Addr::new(10, 0, 0, 1);
        let mut rng = Randomizer::seeded(1);
        let header = IpHeader::from_config(&config, &mut rng, 28).unwrap();

        let mut raw = [0u8; HEADER_LEN];
        let mut w = PacketWriter::new(&mut raw);
        header.write(&mut w).unwrap();
        assert_eq!(w.finish().unwrap(), HEADER_LEN);
        assert_eq!(checksum(&raw), 0);
        assert_eq!(raw[0], 0x45);
        assert_eq!(&raw[16..20], &[10, 0, 0, 1]);
    }
}
