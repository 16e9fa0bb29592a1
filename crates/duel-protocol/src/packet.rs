//! Framed packets with a typed cursor.
//!
//! A packet is one wire frame minus its length prefix: a single
//! discriminant byte plus the payload. Reads walk a cursor over the
//! payload; writes append to it. The whole frame (discriminant +
//! payload) is bounded to 65535 bytes because the length prefix is a
//! 16-bit integer, and a write that would cross that bound fails
//! before touching the buffer.
//!
//! Field conventions of the duel protocol:
//! - integers are little-endian, widths 1/2/4/8
//! - strings are UTF-16LE, zero-padded to a fixed byte size
//! - booleans are one byte
//!
//! Reading past the end of the payload is a protocol violation and
//! poisons the whole message; a string that is not valid UTF-16LE
//! decodes to "" and the message continues.

use std::fmt;

use duel_core::{Location, Phase, Position};

/// Maximum framed size: discriminant byte + payload.
pub const MAX_PACKET_SIZE: usize = 0xffff;

/// Errors from packet encoding/decoding.
#[derive(Debug)]
pub enum ProtocolError {
    /// A read ran past the end of the payload.
    Truncated,
    /// A write would push the frame above [`MAX_PACKET_SIZE`].
    Oversize { size: usize, extra: usize },
    /// A field decoded to a value the protocol does not allow.
    InvalidField(&'static str),
    /// An empty frame arrived where a discriminant was required.
    EmptyFrame,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::Truncated => write!(f, "Read past end of packet"),
            ProtocolError::Oversize { size, extra } => write!(
                f,
                "Write of {} bytes would exceed max packet size (current size {}, max {})",
                extra, size, MAX_PACKET_SIZE
            ),
            ProtocolError::InvalidField(field) => write!(f, "Invalid field: {}", field),
            ProtocolError::EmptyFrame => write!(f, "Empty frame"),
        }
    }
}

impl std::error::Error for ProtocolError {}

/// One protocol message: discriminant plus payload cursor.
#[derive(Debug, Clone)]
pub struct Packet {
    msg_id: u8,
    content: Vec<u8>,
    cursor: usize,
}

impl Packet {
    /// Start an empty outbound packet.
    pub fn new(msg_id: u8) -> Self {
        Packet {
            msg_id,
            content: Vec::new(),
            cursor: 0,
        }
    }

    /// Parse an inbound frame (discriminant byte + payload).
    pub fn from_frame(frame: &[u8]) -> Result<Self, ProtocolError> {
        let (&msg_id, payload) = frame.split_first().ok_or(ProtocolError::EmptyFrame)?;
        Ok(Packet {
            msg_id,
            content: payload.to_vec(),
            cursor: 0,
        })
    }

    pub fn msg_id(&self) -> u8 {
        self.msg_id
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Framed size: discriminant byte + payload bytes.
    pub fn size(&self) -> usize {
        1 + self.content.len()
    }

    /// The frame as sent on the wire (without the length prefix).
    pub fn data(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(self.size());
        data.push(self.msg_id);
        data.extend_from_slice(&self.content);
        data
    }

    /// Payload bytes not yet consumed by reads.
    pub fn remaining(&self) -> usize {
        self.content.len() - self.cursor
    }

    // -------------------------------------------------------------------------
    // Writes
    // -------------------------------------------------------------------------

    /// Append raw bytes, refusing (with no partial write) anything that
    /// would push the frame above [`MAX_PACKET_SIZE`].
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), ProtocolError> {
        if self.size() + bytes.len() > MAX_PACKET_SIZE {
            return Err(ProtocolError::Oversize {
                size: self.size(),
                extra: bytes.len(),
            });
        }
        self.content.extend_from_slice(bytes);
        Ok(())
    }

    /// Append an integer as `width` little-endian bytes.
    ///
    /// Negative values take the two's-complement adjustment path so a
    /// `-1` encodes as all-ones at any width.
    pub fn write_int(&mut self, value: i64, width: usize) -> Result<(), ProtocolError> {
        let mut value = value as u64;
        if width < 8 {
            value &= (1u64 << (width * 8)) - 1;
        }
        self.write_bytes(&value.to_le_bytes()[..width])
    }

    pub fn write_u8(&mut self, value: u8) -> Result<(), ProtocolError> {
        self.write_int(i64::from(value), 1)
    }

    pub fn write_u16(&mut self, value: u16) -> Result<(), ProtocolError> {
        self.write_int(i64::from(value), 2)
    }

    pub fn write_u32(&mut self, value: u32) -> Result<(), ProtocolError> {
        self.write_int(i64::from(value), 4)
    }

    pub fn write_i32(&mut self, value: i32) -> Result<(), ProtocolError> {
        self.write_int(i64::from(value), 4)
    }

    pub fn write_u64(&mut self, value: u64) -> Result<(), ProtocolError> {
        self.write_bytes(&value.to_le_bytes())
    }

    pub fn write_bool(&mut self, value: bool) -> Result<(), ProtocolError> {
        self.write_u8(u8::from(value))
    }

    /// Append a string as UTF-16LE in exactly `byte_size` bytes:
    /// zero-padded when shorter, truncated when longer.
    pub fn write_utf16(&mut self, content: &str, byte_size: usize) -> Result<(), ProtocolError> {
        let mut encoded: Vec<u8> = content
            .encode_utf16()
            .flat_map(|unit| unit.to_le_bytes())
            .collect();
        encoded.resize(byte_size, 0);
        self.write_bytes(&encoded)
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// Consume `n` raw payload bytes.
    pub fn read_bytes(&mut self, n: usize) -> Result<&[u8], ProtocolError> {
        if self.remaining() < n {
            return Err(ProtocolError::Truncated);
        }
        let bytes = &self.content[self.cursor..self.cursor + n];
        self.cursor += n;
        Ok(bytes)
    }

    /// Consume `width` bytes as a little-endian unsigned integer.
    pub fn read_int(&mut self, width: usize) -> Result<u64, ProtocolError> {
        let bytes = self.read_bytes(width)?;
        let mut buf = [0u8; 8];
        buf[..width].copy_from_slice(bytes);
        Ok(u64::from_le_bytes(buf))
    }

    pub fn read_u8(&mut self) -> Result<u8, ProtocolError> {
        Ok(self.read_int(1)? as u8)
    }

    pub fn read_u16(&mut self) -> Result<u16, ProtocolError> {
        Ok(self.read_int(2)? as u16)
    }

    pub fn read_u32(&mut self) -> Result<u32, ProtocolError> {
        Ok(self.read_int(4)? as u32)
    }

    pub fn read_u64(&mut self) -> Result<u64, ProtocolError> {
        self.read_int(8)
    }

    pub fn read_bool(&mut self) -> Result<bool, ProtocolError> {
        Ok(self.read_u8()? != 0)
    }

    /// Consume `n` bytes as UTF-16LE. Malformed content (including an
    /// odd byte count) decodes to an empty string rather than failing
    /// the message; trailing NUL padding is stripped.
    pub fn read_utf16(&mut self, n: usize) -> Result<String, ProtocolError> {
        let bytes = self.read_bytes(n)?;
        if bytes.len() % 2 != 0 {
            return Ok(String::new());
        }
        let units: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        let decoded = String::from_utf16(&units).unwrap_or_default();
        Ok(decoded.trim_end_matches('\0').to_string())
    }

    /// A 4-byte card code.
    pub fn read_id(&mut self) -> Result<u32, ProtocolError> {
        self.read_u32()
    }

    pub fn read_location(&mut self) -> Result<Location, ProtocolError> {
        Ok(Location::from_byte(self.read_u8()?))
    }

    pub fn read_position(&mut self) -> Result<Position, ProtocolError> {
        Ok(Position::from_raw(self.read_u32()?))
    }

    pub fn read_phase(&mut self) -> Result<Phase, ProtocolError> {
        Phase::from_u32(self.read_u32()?).ok_or(ProtocolError::InvalidField("phase"))
    }
}
