//! Packet buffer arena and write cursor
//!
//! One [`PacketBuffer`] lives per process and is reused for every packet.
//! It grows to exactly the largest size requested so far and never shrinks;
//! bytes past the current packet are stale and never read.

use std::net::Ipv4Addr;

use crate::error::{PacketError, Result};
use crate::random::Randomizer;

#[derive(Debug, Default)]
pub struct PacketBuffer {
    data: Vec<u8>,
}

impl PacketBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Grows the arena to `new_size` if needed and returns the first
    /// `new_size` bytes for writing.
    pub fn ensure(&mut self, new_size: usize) -> Result<&mut [u8]> {
        if new_size == 0 {
            return Err(PacketError::InvalidSize(new_size).into());
        }

        if new_size > self.data.len() {
            let additional = new_size - self.data.len();
            self.data
                .try_reserve_exact(additional)
                .map_err(|_| PacketError::AllocationFailed { requested: new_size })?;
            self.data.resize(new_size, 0);
        }

        Ok(&mut self.data[..new_size])
    }

    /// The first `size` bytes of the last packet built.
    pub fn packet(&self, size: usize) -> &[u8] {
        &self.data[..size.min(self.data.len())]
    }
}

/// Bounds-checked cursor writing network-order fields into a reserved region.
pub struct PacketWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> PacketWriter<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn advance(&mut self, len: usize) -> Result<&mut [u8]> {
        if len > self.remaining() {
            return Err(PacketError::BufferOverflow {
                required: self.pos + len,
                available: self.buf.len(),
            }
            .into());
        }
        let start = self.pos;
        self.pos += len;
        Ok(&mut self.buf[start..self.pos])
    }

    pub fn put_u8(&mut self, value: u8) -> Result<()> {
        self.advance(1)?[0] = value;
        Ok(())
    }

    pub fn put_u16(&mut self, value: u16) -> Result<()> {
        self.advance(2)?.copy_from_slice(&value.to_be_bytes());
        Ok(())
    }

    /// Low 24 bits of `value`, network order.
    pub fn put_u24(&mut self, value: u32) -> Result<()> {
        self.advance(3)?.copy_from_slice(&value.to_be_bytes()[1..]);
        Ok(())
    }

    pub fn put_u32(&mut self, value: u32) -> Result<()> {
        self.advance(4)?.copy_from_slice(&value.to_be_bytes());
        Ok(())
    }

    pub fn put_addr(&mut self, addr: Ipv4Addr) -> Result<()> {
        self.advance(4)?.copy_from_slice(&addr.octets());
        Ok(())
    }

    pub fn put_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.advance(bytes.len())?.copy_from_slice(bytes);
        Ok(())
    }

    pub fn put_zeros(&mut self, len: usize) -> Result<()> {
        self.advance(len)?.fill(0);
        Ok(())
    }

    pub fn put_random(&mut self, rng: &mut Randomizer, len: usize) -> Result<()> {
        rng.fill(self.advance(len)?);
        Ok(())
    }

    /// Reserves a field to be patched later and returns its offset.
    pub fn skip(&mut self, len: usize) -> Result<usize> {
        let offset = self.pos;
        self.put_zeros(len)?;
        Ok(offset)
    }

    fn slot(&mut self, offset: usize, len: usize) -> Result<&mut [u8]> {
        if offset + len > self.pos {
            return Err(PacketError::BufferOverflow {
                required: offset + len,
                available: self.pos,
            }
            .into());
        }
        Ok(&mut self.buf[offset..offset + len])
    }

    pub fn patch_u16(&mut self, offset: usize, value: u16) -> Result<()> {
        self.slot(offset, 2)?.copy_from_slice(&value.to_be_bytes());
        Ok(())
    }

    /// Stores a value produced by [`crate::checksum`] without reordering it.
    pub fn patch_checksum(&mut self, offset: usize, value: u16) -> Result<()> {
        self.slot(offset, 2)?.copy_from_slice(&value.to_ne_bytes());
        Ok(())
    }

    /// Bytes already written in `start..end`.
    pub fn written(&self, start: usize, end: usize) -> &[u8] {
        &self.buf[start.min(self.pos)..end.min(self.pos)]
    }

    /// Checks that the reserved region was written in full and returns its size.
    pub fn finish(self) -> Result<usize> {
        if self.pos != self.buf.len() {
            return Err(PacketError::SizeMismatch {
                expected: self.buf.len(),
                written: self.pos,
            }
            .into());
        }
        Ok(self.pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writer_emits_network_order() {
        let mut raw = [0u8; 13];
        let mut w = PacketWriter::new(&mut raw);
        w.put_u8(0xaa).unwrap();
        w.put_u16(0x0102).unwrap();
        w.put_u24(0x00a0b0c0).unwrap();
        w.put_u32(0x11223344).unwrap();
        w.put_addr(Ipv4Addr::new(1, 2, 3, 4)).unwrap_err();
        assert_eq!(w.finish().unwrap_err().to_string(), "Packet error: Packet size mismatch: expected 13 bytes, wrote 10");
        assert_eq!(&raw[..10], &[0xaa, 0x01, 0x02, 0xa0, 0xb0, 0xc0, 0x11, 0x22, 0x33, 0x44]);
    }

    #[test]
    fn test_patch_requires_written_bytes() {
        let mut raw = [0u8; 4];
        let mut w = PacketWriter::new(&mut raw);
        let offset = w.skip(2).unwrap();
        assert!(w.patch_u16(offset, 0xbeef).is_ok());
        assert!(w.patch_u16(2, 0xbeef).is_err());
    }
}
