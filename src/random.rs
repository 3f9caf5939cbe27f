//! Randomization policy
//!
//! A configured value of zero means "pick a random value of the field's
//! width"; anything else is used verbatim. Byte-order conversion is not done
//! here: [`crate::buffer::PacketWriter`] always writes network order.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, RngCore, SeedableRng};
use std::net::Ipv4Addr;

/// Per-process random source used by every builder.
pub struct Randomizer {
    rng: StdRng,
}

impl Randomizer {
    /// Seeds from the operating system; each process must create its own.
    pub fn from_entropy() -> Self {
        Self { rng: StdRng::from_entropy() }
    }

    /// Deterministic generator for reproducible tests.
    pub fn seeded(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }

    pub fn u8(&mut self) -> u8 {
        self.rng.gen::<u8>()
    }

    pub fn u16(&mut self) -> u16 {
        self.rng.gen::<u16>()
    }

    pub fn u32(&mut self) -> u32 {
        self.rng.gen::<u32>()
    }

    pub fn resolve_u8(&mut self, value: u8) -> u8 {
        if value == 0 { self.u8() } else { value }
    }

    pub fn resolve_u16(&mut self, value: u16) -> u16 {
        if value == 0 { self.u16() } else { value }
    }

    pub fn resolve_u32(&mut self, value: u32) -> u32 {
        if value == 0 { self.u32() } else { value }
    }

    /// 24-bit fields such as EIGRP MTU and OSPF metrics.
    pub fn resolve_u24(&mut self, value: u32) -> u32 {
        let value = value & 0x00ff_ffff;
        if value == 0 { self.u32() & 0x00ff_ffff } else { value }
    }

    pub fn resolve_addr(&mut self, addr: Ipv4Addr) -> Ipv4Addr {
        if addr.is_unspecified() {
            Ipv4Addr::from(self.u32())
        } else {
            addr
        }
    }

    pub fn resolve_port(&mut self, port: u16) -> u16 {
        self.resolve_u16(port)
    }

    /// An unspecified netmask becomes the mask of a random prefix length.
    pub fn resolve_netmask(&mut self, mask: Ipv4Addr) -> Ipv4Addr {
        if !mask.is_unspecified() {
            return mask;
        }
        let prefix = self.rng.gen_range(0..=32u32);
        Ipv4Addr::from(u32::MAX.checked_shl(32 - prefix).unwrap_or(0))
    }

    pub fn fill(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest);
    }

    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }
}

impl Default for Randomizer {
    fn default() -> Self {
        Self::from_entropy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_values_pass_through() {
        let mut rng = Randomizer::seeded(7);
        assert_eq!(rng.resolve_u8(9), 9);
        assert_eq!(rng.resolve_u16(0x1234), 0x1234);
        assert_eq!(rng.resolve_u32(0xdead_beef), 0xdead_beef);
        assert_eq!(rng.resolve_addr(Ipv4Addr::new(10, 1, 2, 3)), Ipv4Addr::new(10, 1, 2, 3));
    }

    #[test]
    fn test_random_netmask_is_contiguous() {
        let mut rng = Randomizer::seeded(11);
        for _ in 0..200 {
            let mask = u32::from(rng.resolve_netmask(Ipv4Addr::UNSPECIFIED));
            assert_eq!(mask.leading_ones() + mask.trailing_zeros(), 32);
        }
    }

    #[test]
    fn test_u24_stays_in_width() {
        let mut rng = Randomizer::seeded(3);
        for _ in 0..500 {
            assert!(rng.resolve_u24(0) <= 0x00ff_ffff);
        }
    }
}
