//! Packet buffer tests

use proto_flood::buffer::{PacketBuffer, PacketWriter};
use proto_flood::error::{FloodError, PacketError};
use proto_flood::random::Randomizer;

#[test]
fn test_buffer_grows_to_exact_size_and_never_shrinks() {
    let mut buffer = PacketBuffer::new();
    assert_eq!(buffer.capacity(), 0);

    assert_eq!(buffer.ensure(60).unwrap().len(), 60);
    assert_eq!(buffer.capacity(), 60);

    assert_eq!(buffer.ensure(40).unwrap().len(), 40);
    assert_eq!(buffer.capacity(), 60);

    assert_eq!(buffer.ensure(100).unwrap().len(), 100);
    assert_eq!(buffer.capacity(), 100);
}

#[test]
fn test_zero_size_request_is_rejected() {
    let mut buffer = PacketBuffer::new();
    match buffer.ensure(0) {
        Err(FloodError::Packet(PacketError::InvalidSize(0))) => {}
        other => panic!("expected InvalidSize, got {:?}", other.map(|b| b.len())),
    }
}

#[test]
fn test_growth_preserves_prefix() {
    let mut buffer = PacketBuffer::new();
    buffer.ensure(4).unwrap().copy_from_slice(&[1, 2, 3, 4]);
    let grown = buffer.ensure(8).unwrap();
    assert_eq!(&grown[..4], &[1, 2, 3, 4]);
}

#[test]
fn test_writer_overflow_is_an_error() {
    let mut raw = [0u8; 3];
    let mut w = PacketWriter::new(&mut raw);
    assert!(w.put_u16(1).is_ok());
    assert!(w.put_u16(2).is_err());
    assert_eq!(w.position(), 2);
    assert_eq!(w.remaining(), 1);
}

#[test]
fn test_writer_finish_checks_reserved_size() {
    let mut raw = [0u8; 8];
    let mut w = PacketWriter::new(&mut raw);
    let mut rng = Randomizer::seeded(1);
    w.put_u24(0x0102_0304).unwrap();
    w.put_random(&mut rng, 5).unwrap();
    assert_eq!(w.finish().unwrap(), 8);
    assert_eq!(&raw[..3], &[0x02, 0x03, 0x04]);
}

#[test]
fn test_checksum_patch_is_native_endian() {
    let mut raw = [0u8; 4];
    let mut w = PacketWriter::new(&mut raw);
    let offset = w.skip(4).unwrap();
    w.patch_checksum(offset, 0x1234).unwrap();
    w.patch_u16(offset + 2, 0x1234).unwrap();
    assert_eq!(&raw[..2], &0x1234u16.to_ne_bytes());
    assert_eq!(&raw[2..], &[0x12, 0x34]);
}
