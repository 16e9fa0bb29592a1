//! The duel client receive loop.
//!
//! The protocol is half-duplex and lockstep: the client handles one
//! message at a time and sends at most one reply per message before
//! awaiting the next frame. A pending executor decision therefore
//! blocks the loop entirely, which keeps duel-state mutations totally
//! ordered without any locking.

use duel_core::{Deck, Duel};
use duel_protocol::wire_types::CtosMessage;
use duel_protocol::Packet;
use tracing::debug;

use crate::config::Config;
use crate::error::ClientError;
use crate::executor::DuelExecutor;
use crate::manager::{GameManager, Handled};
use crate::transport::Transport;

/// A connected duel client: transport + router + executor.
pub struct DuelClient<T, E> {
    transport: T,
    manager: GameManager<E>,
    name: String,
    version: u32,
}

impl<T: Transport, E: DuelExecutor> DuelClient<T, E> {
    pub fn new(transport: T, deck: Deck, executor: E, name: &str, version: u32) -> Self {
        DuelClient {
            transport,
            manager: GameManager::new(deck, executor),
            name: name.to_string(),
            version,
        }
    }

    /// Like [`DuelClient::new`], with name/version from a [`Config`].
    pub fn with_config(transport: T, deck: Deck, executor: E, config: &Config) -> Self {
        Self::new(transport, deck, executor, &config.name, config.version)
    }

    pub fn duel(&self) -> &Duel {
        self.manager.duel()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    /// Announce this player, join the room, then drive the receive
    /// loop until the server closes the connection (or a protocol
    /// fault aborts it).
    pub async fn run(&mut self) -> Result<(), ClientError> {
        self.send_join().await?;

        loop {
            let frame = match self.transport.recv_frame().await? {
                Some(frame) => frame,
                None => {
                    debug!("Server closed the connection");
                    break;
                }
            };

            let mut packet = Packet::from_frame(&frame)?;
            match self.manager.handle(&mut packet) {
                Ok(Handled::Reply(reply)) => {
                    self.transport.send_frame(&reply.data()).await?;
                }
                Ok(Handled::NoReply) => {}
                Ok(Handled::Shutdown) => {
                    self.transport.close();
                    break;
                }
                Err(e) => {
                    self.transport.close();
                    return Err(e);
                }
            }
        }
        Ok(())
    }

    /// Concede the duel.
    pub async fn surrender(&mut self) -> Result<(), ClientError> {
        let packet = Packet::new(CtosMessage::Surrender as u8);
        self.transport.send_frame(&packet.data()).await
    }

    /// Send a chat line to the room.
    pub async fn chat(&mut self, content: &str) -> Result<(), ClientError> {
        let mut packet = Packet::new(CtosMessage::Chat as u8);
        let byte_size = content.encode_utf16().count() * 2;
        packet.write_utf16(content, byte_size)?;
        packet.write_u32(0)?;
        self.transport.send_frame(&packet.data()).await
    }

    async fn send_join(&mut self) -> Result<(), ClientError> {
        let mut info = Packet::new(CtosMessage::PlayerInfo as u8);
        info.write_utf16(&self.name, 40)?;
        self.transport.send_frame(&info.data()).await?;

        let mut join = Packet::new(CtosMessage::JoinGame as u8);
        join.write_u16((self.version & 0xffff) as u16)?;
        join.write_bytes(&[0xcc, 0xcc, 0x00, 0x00, 0x00, 0x00])?;
        join.write_utf16("", 40)?; // room pass
        join.write_u32(self.version)?;
        self.transport.send_frame(&join.data()).await
    }
}
