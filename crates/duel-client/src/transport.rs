//! Byte-stream transport.
//!
//! The protocol rides on an ordered byte channel delivering frames of
//! `[u16 LE length][length bytes]`. The trait keeps the router testable
//! against scripted frames; [`TcpTransport`] is the real thing.
//!
//! A zero-length frame is the server's orderly close and surfaces as
//! `Ok(None)`; an EOF or socket error mid-frame is a fault. Closing is
//! idempotent and leaves the transport in a terminal "not connected"
//! state, which also unblocks any pending receive with an error.

use bytes::{BufMut, BytesMut};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, info};

use crate::error::ClientError;

/// An ordered, length-framed byte channel to the duel server.
pub trait Transport {
    fn is_connected(&self) -> bool;

    /// Drop the connection. Idempotent; afterwards every send/receive
    /// fails with [`ClientError::NotConnected`].
    fn close(&mut self);

    /// Send one frame (discriminant byte + payload), blocking on the
    /// transport's own flush before returning.
    fn send_frame(
        &mut self,
        frame: &[u8],
    ) -> impl std::future::Future<Output = Result<(), ClientError>> + Send;

    /// Receive one frame. `Ok(None)` means the server closed the
    /// connection in an orderly fashion (zero-length frame).
    fn recv_frame(
        &mut self,
    ) -> impl std::future::Future<Output = Result<Option<Vec<u8>>, ClientError>> + Send;
}

/// TCP transport over tokio.
pub struct TcpTransport {
    stream: Option<TcpStream>,
    write_buffer: BytesMut,
}

impl TcpTransport {
    /// Connect to `addr` (e.g. `"127.0.0.1:7911"`).
    pub async fn connect(addr: &str) -> Result<Self, ClientError> {
        info!("Connecting to {}...", addr);
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        info!("Connected successfully");
        Ok(TcpTransport {
            stream: Some(stream),
            write_buffer: BytesMut::with_capacity(1024),
        })
    }
}

impl Transport for TcpTransport {
    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    fn close(&mut self) {
        if self.stream.take().is_some() {
            debug!("Connection closed");
        }
    }

    async fn send_frame(&mut self, frame: &[u8]) -> Result<(), ClientError> {
        let stream = self.stream.as_mut().ok_or(ClientError::NotConnected)?;

        self.write_buffer.clear();
        self.write_buffer.put_u16_le(frame.len() as u16);
        self.write_buffer.extend_from_slice(frame);

        stream.write_all(&self.write_buffer).await?;
        stream.flush().await?;
        Ok(())
    }

    async fn recv_frame(&mut self) -> Result<Option<Vec<u8>>, ClientError> {
        let stream = self.stream.as_mut().ok_or(ClientError::NotConnected)?;

        match read_frame(stream).await {
            Ok(Some(frame)) => Ok(Some(frame)),
            Ok(None) => {
                self.close();
                Ok(None)
            }
            Err(e) => {
                self.close();
                Err(e.into())
            }
        }
    }
}

async fn read_frame(stream: &mut TcpStream) -> std::io::Result<Option<Vec<u8>>> {
    let mut header = [0u8; 2];
    stream.read_exact(&mut header).await?;

    let frame_len = u16::from_le_bytes(header) as usize;
    if frame_len == 0 {
        return Ok(None);
    }

    let mut frame = vec![0u8; frame_len];
    stream.read_exact(&mut frame).await?;
    Ok(Some(frame))
}
