//! Client error types.

use duel_protocol::wire_types::ErrorKind;
use duel_protocol::ProtocolError;
use thiserror::Error;

/// Everything that can tear down a duel connection.
///
/// None of these are retried inside the client; reconnection policy
/// belongs to the caller.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A message violated the wire format (truncated read, oversize
    /// write, malformed field).
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Transport-level failure (dropped connection mid-read, socket
    /// error).
    #[error("transport error: {0}")]
    Io(#[from] std::io::Error),

    /// The join acknowledgement carried the wrong handshake constant.
    /// The connection is aborted before any deck list is sent.
    #[error("handshake mismatch: got {got:#010x}")]
    HandshakeMismatch { got: u32 },

    /// The server rejected this client (join/deck/side/version error).
    #[error("server rejected connection: {0:?}")]
    ServerRejected(ErrorKind),

    /// A message variant this client refuses to guess a decode for,
    /// since a wrong field-width assumption would desynchronize the
    /// whole stream.
    #[error("unsupported server message: {0}")]
    Unsupported(&'static str),

    /// An operation needed an open connection.
    #[error("not connected")]
    NotConnected,
}
