//! duel-protocol
//!
//! Wire-level encoding/decoding for the duel server protocol.
//!
//! This crate is responsible for turning framed byte buffers into
//! typed packet cursors and back again:
//!
//! - [`packet`]     : the bounded [`Packet`] buffer with typed reads/writes
//! - [`wire_types`] : message discriminants and the handshake constant
//! - [`query`]      : the card attribute-query stream decoder

pub mod packet;
pub mod query;
pub mod wire_types;

pub use packet::{Packet, ProtocolError, MAX_PACKET_SIZE};
pub use wire_types::{CtosMessage, ErrorKind, GameMessage, StocMessage, SERVER_HANDSHAKE};
