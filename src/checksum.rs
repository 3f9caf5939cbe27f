//! RFC 1071 Internet checksum
//!
//! Words are summed in native byte order, so the returned value must be
//! stored back with `to_ne_bytes` to land in network order on the wire.
//! [`crate::buffer::PacketWriter::patch_checksum`] does exactly that.

/// Streaming one's-complement accumulator.
///
/// Chunks may have any length; an odd trailing byte is carried over to the
/// next chunk, so summing `pseudo` then `segment` equals summing their
/// concatenation.
#[derive(Debug, Default, Clone)]
pub struct Checksum {
    sum: u32,
    pending: Option<u8>,
}

impl Checksum {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, mut data: &[u8]) -> &mut Self {
        if let Some(high) = self.pending.take() {
            match data.split_first() {
                Some((&low, rest)) => {
                    self.add_word(u16::from_ne_bytes([high, low]));
                    data = rest;
                }
                None => {
                    self.pending = Some(high);
                    return self;
                }
            }
        }

        let mut words = data.chunks_exact(2);
        for word in &mut words {
            self.add_word(u16::from_ne_bytes([word[0], word[1]]));
        }
        if let [odd] = words.remainder() {
            self.pending = Some(*odd);
        }
        self
    }

    fn add_word(&mut self, word: u16) {
        self.sum = self.sum.wrapping_add(u32::from(word));
    }

    /// Folds the carries and returns the complemented sum.
    pub fn finish(&self) -> u16 {
        let mut sum = self.sum;
        if let Some(odd) = self.pending {
            // high byte on big-endian hosts, low byte on little-endian ones
            sum = sum.wrapping_add(u32::from(u16::from_ne_bytes([odd, 0])));
        }
        while sum >> 16 != 0 {
            sum = (sum & 0xffff) + (sum >> 16);
        }
        !(sum as u16)
    }
}

/// Checksum of a single contiguous byte range.
pub fn checksum(data: &[u8]) -> u16 {
    Checksum::new().add(data).finish()
}
