//! GRE encapsulation layer
//!
//! Layout after the outer IP header: the 4-byte GRE base header, then the
//! optional checksum, key and sequence words in that order, then an inner IP
//! header carrying the real protocol. The GRE checksum covers everything from
//! the GRE header to the end of the packet, so it is filled last by
//! [`finalize`].

use crate::buffer::PacketWriter;
use crate::checksum::checksum;
use crate::config::Config;
use crate::constants::gre;
use crate::error::Result;
use crate::random::Randomizer;

use super::ip::{self, IpHeader};

/// GRE header with its optional words.
pub fn header_len(config: &Config) -> usize {
    let mut len = gre::HEADER_LEN;
    if config.gre.checksum {
        len += gre::CHECKSUM_LEN;
    }
    if config.gre.key {
        len += gre::KEY_LEN;
    }
    if config.gre.sequence {
        len += gre::SEQUENCE_LEN;
    }
    len
}

/// Everything encapsulation adds in front of the protocol header.
pub fn overhead(config: &Config) -> usize {
    header_len(config) + ip::HEADER_LEN
}

/// Writes the GRE header and the inner IP header, returning the latter.
pub fn write(
    w: &mut PacketWriter<'_>,
    config: &Config,
    outer: &IpHeader,
    payload_len: usize,
    rng: &mut Randomizer,
) -> Result<IpHeader> {
    let mut flags = gre::VERSION;
    if config.gre.checksum {
        flags |= gre::FLAG_CHECKSUM;
    }
    if config.gre.key {
        flags |= gre::FLAG_KEY;
    }
    if config.gre.sequence {
        flags |= gre::FLAG_SEQUENCE;
    }
    w.put_u16(flags)?;
    w.put_u16(gre::ETHERTYPE_IPV4)?;

    if config.gre.checksum {
        // checksum and reserved offset, patched by finalize
        w.put_zeros(gre::CHECKSUM_LEN)?;
    }
    if config.gre.key {
        w.put_u32(rng.resolve_u32(config.gre.key_value))?;
    }
    if config.gre.sequence {
        w.put_u32(rng.resolve_u32(config.gre.sequence_value))?;
    }

    let inner = IpHeader {
        total_len: (ip::HEADER_LEN + payload_len) as u16,
        protocol: config.ip.protocol,
        saddr: if config.gre.saddr.is_unspecified() { outer.saddr } else { config.gre.saddr },
        daddr: if config.gre.daddr.is_unspecified() { outer.daddr } else { config.gre.daddr },
        ..*outer
    };
    inner.write(w)?;
    Ok(inner)
}

/// Fills the optional GRE checksum once the whole packet has been written.
pub fn finalize(w: &mut PacketWriter<'_>, config: &Config, gre_start: usize) -> Result<()> {
    if !config.gre.checksum {
        return Ok(());
    }
    let sum = checksum(w.written(gre_start, w.position()));
    w.patch_checksum(gre_start + gre::HEADER_LEN, sum)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overhead_counts_optional_words() {
        let mut config = Config::default();
        assert_eq!(overhead(&config), 24);
        config.gre.checksum = true;
        config.gre.key = true;
        config.gre.sequence = true;
        assert_eq!(overhead(&config), 36);
    }
}
