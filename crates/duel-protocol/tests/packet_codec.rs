// crates/duel-protocol/tests/packet_codec.rs
//
// Wire primitives: little-endian integers, two's-complement encoding
// of negatives, fixed-size UTF-16LE strings, and the frame size bound.

use duel_protocol::{Packet, ProtocolError, MAX_PACKET_SIZE};

#[test]
fn integer_round_trip_all_widths() {
    let mut packet = Packet::new(0x01);
    packet.write_u8(0xab).unwrap();
    packet.write_u16(0xbeef).unwrap();
    packet.write_u32(0xdead_beef).unwrap();
    packet.write_u64(0x0123_4567_89ab_cdef).unwrap();
    packet.write_bool(true).unwrap();

    assert_eq!(packet.read_u8().unwrap(), 0xab);
    assert_eq!(packet.read_u16().unwrap(), 0xbeef);
    assert_eq!(packet.read_u32().unwrap(), 0xdead_beef);
    assert_eq!(packet.read_u64().unwrap(), 0x0123_4567_89ab_cdef);
    assert!(packet.read_bool().unwrap());
    assert_eq!(packet.remaining(), 0);
}

#[test]
fn integers_are_little_endian() {
    let mut packet = Packet::new(0x01);
    packet.write_u32(0x0102_0304).unwrap();
    assert_eq!(packet.content(), &[0x04, 0x03, 0x02, 0x01]);
}

#[test]
fn negative_values_take_twos_complement_path() {
    let mut packet = Packet::new(0x01);
    packet.write_i32(-1).unwrap();
    assert_eq!(packet.content(), &[0xff, 0xff, 0xff, 0xff]);

    let mut packet = Packet::new(0x01);
    packet.write_int(-2, 2).unwrap();
    assert_eq!(packet.content(), &[0xfe, 0xff]);

    let mut packet = Packet::new(0x01);
    packet.write_int(-1, 1).unwrap();
    assert_eq!(packet.content(), &[0xff]);
}

#[test]
fn utf16_pads_short_strings_with_zeroes() {
    let mut packet = Packet::new(0x01);
    packet.write_utf16("ab", 40).unwrap();
    assert_eq!(packet.content().len(), 40);
    assert_eq!(&packet.content()[..4], &[b'a', 0x00, b'b', 0x00]);
    assert!(packet.content()[4..].iter().all(|b| *b == 0));

    assert_eq!(packet.read_utf16(40).unwrap(), "ab");
}

#[test]
fn utf16_truncates_long_strings() {
    let mut packet = Packet::new(0x01);
    packet.write_utf16("abcdef", 6).unwrap();
    assert_eq!(packet.content().len(), 6);
    assert_eq!(packet.read_utf16(6).unwrap(), "abc");
}

#[test]
fn malformed_utf16_decodes_to_empty_string() {
    let mut packet = Packet::new(0x01);
    // Lone high surrogate: not valid UTF-16.
    packet.write_bytes(&[0x00, 0xd8]).unwrap();
    assert_eq!(packet.read_utf16(2).unwrap(), "");

    // An odd byte count cannot be UTF-16 either.
    let mut packet = Packet::new(0x01);
    packet.write_bytes(&[b'a', 0x00, b'b']).unwrap();
    assert_eq!(packet.read_utf16(3).unwrap(), "");
}

#[test]
fn reading_past_the_end_is_fatal() {
    let mut packet = Packet::new(0x01);
    packet.write_u16(7).unwrap();
    assert!(matches!(
        packet.read_u32(),
        Err(ProtocolError::Truncated)
    ));
}

#[test]
fn oversize_write_fails_without_partial_write() {
    let mut packet = Packet::new(0x01);
    // Discriminant + payload may reach exactly MAX_PACKET_SIZE.
    packet.write_bytes(&vec![0u8; MAX_PACKET_SIZE - 1]).unwrap();
    assert_eq!(packet.size(), MAX_PACKET_SIZE);

    let before = packet.content().len();
    assert!(matches!(
        packet.write_u8(0),
        Err(ProtocolError::Oversize { .. })
    ));
    assert_eq!(packet.content().len(), before);
}

#[test]
fn frame_parse_splits_discriminant_and_payload() {
    let mut packet = Packet::from_frame(&[0x12, 0xaa, 0xbb]).unwrap();
    assert_eq!(packet.msg_id(), 0x12);
    assert_eq!(packet.content(), &[0xaa, 0xbb]);
    assert_eq!(packet.read_u16().unwrap(), 0xbbaa);

    assert!(matches!(
        Packet::from_frame(&[]),
        Err(ProtocolError::EmptyFrame)
    ));
}

#[test]
fn data_round_trips_through_frame_parse() {
    let mut packet = Packet::new(0x07);
    packet.write_u32(99).unwrap();
    packet.write_utf16("duel", 12).unwrap();

    let mut parsed = Packet::from_frame(&packet.data()).unwrap();
    assert_eq!(parsed.msg_id(), 0x07);
    assert_eq!(parsed.read_u32().unwrap(), 99);
    assert_eq!(parsed.read_utf16(12).unwrap(), "duel");
}
