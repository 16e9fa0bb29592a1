// crates/duel-client/tests/client_loop.rs
//
// The lockstep receive loop against a scripted transport: join flow,
// orderly close on a zero-length frame, and the handshake abort path.

mod common;

use std::collections::VecDeque;

use common::RecordingExecutor;
use duel_client::{ClientError, DuelClient, Transport};
use duel_core::Deck;
use duel_protocol::wire_types::{CtosMessage, StocMessage, SERVER_HANDSHAKE};
use duel_protocol::Packet;

/// Transport double that replays scripted frames and records sends.
/// An exhausted script behaves like the server's zero-length close.
struct ScriptedTransport {
    incoming: VecDeque<Vec<u8>>,
    sent: Vec<Vec<u8>>,
    connected: bool,
}

impl ScriptedTransport {
    fn new(incoming: Vec<Vec<u8>>) -> Self {
        ScriptedTransport {
            incoming: incoming.into(),
            sent: Vec::new(),
            connected: true,
        }
    }
}

impl Transport for ScriptedTransport {
    fn is_connected(&self) -> bool {
        self.connected
    }

    fn close(&mut self) {
        self.connected = false;
    }

    async fn send_frame(&mut self, frame: &[u8]) -> Result<(), ClientError> {
        if !self.connected {
            return Err(ClientError::NotConnected);
        }
        self.sent.push(frame.to_vec());
        Ok(())
    }

    async fn recv_frame(&mut self) -> Result<Option<Vec<u8>>, ClientError> {
        if !self.connected {
            return Err(ClientError::NotConnected);
        }
        match self.incoming.pop_front() {
            Some(frame) => Ok(Some(frame)),
            None => {
                self.close();
                Ok(None)
            }
        }
    }
}

fn join_ack(handshake: u32) -> Vec<u8> {
    let mut packet = Packet::new(StocMessage::JoinGame as u8);
    packet.write_u32(0).unwrap();
    packet.write_u8(0).unwrap();
    packet.write_u8(0).unwrap();
    packet.write_u8(5).unwrap();
    packet.write_bool(false).unwrap();
    packet.write_bool(false).unwrap();
    packet.write_bytes(&[0; 3]).unwrap();
    packet.write_u32(8000).unwrap();
    packet.write_u8(5).unwrap();
    packet.write_u8(1).unwrap();
    packet.write_u16(240).unwrap();
    packet.write_bytes(&[0; 4]).unwrap();
    packet.write_u32(handshake).unwrap();
    for _ in 0..7 {
        packet.write_u32(0).unwrap();
    }
    packet.data()
}

fn client_over(
    script: Vec<Vec<u8>>,
) -> DuelClient<ScriptedTransport, RecordingExecutor> {
    let deck = Deck::new(vec![111, 222], vec![], vec![]);
    DuelClient::new(
        ScriptedTransport::new(script),
        deck,
        RecordingExecutor::default(),
        "tester",
        0x1360,
    )
}

#[tokio::test]
async fn orderly_close_ends_the_loop_after_the_join_flow() {
    let mut client = client_over(vec![]);

    client.run().await.unwrap();

    assert!(!client.is_connected());
    // Exactly the two join frames went out, no reply to the close.
    // (The transport sees frames without their length prefix.)
    let transport = client.transport();
    assert_eq!(transport.sent.len(), 2);
    assert_eq!(transport.sent[0][0], CtosMessage::PlayerInfo as u8);
    assert_eq!(transport.sent[0].len(), 1 + 40);
    assert_eq!(transport.sent[1][0], CtosMessage::JoinGame as u8);
}

#[tokio::test]
async fn good_handshake_sends_the_deck_list() {
    let mut client = client_over(vec![join_ack(SERVER_HANDSHAKE)]);

    client.run().await.unwrap();

    let transport = client.transport();
    assert_eq!(transport.sent.len(), 3);
    let deck_frame = &transport.sent[2];
    assert_eq!(deck_frame[0], CtosMessage::UpdateDeck as u8);

    let mut reply = Packet::from_frame(deck_frame).unwrap();
    assert_eq!(reply.read_u32().unwrap(), 2); // main + extra
    assert_eq!(reply.read_u32().unwrap(), 0); // side
}

#[tokio::test]
async fn bad_handshake_aborts_before_any_deck_is_sent() {
    let mut client = client_over(vec![join_ack(0xdead_beef)]);

    let err = client.run().await.unwrap_err();
    assert!(matches!(err, ClientError::HandshakeMismatch { .. }));
    assert!(!client.is_connected());

    let transport = client.transport();
    assert_eq!(transport.sent.len(), 2); // join frames only
    assert!(transport
        .sent
        .iter()
        .all(|frame| frame[0] != CtosMessage::UpdateDeck as u8));
}

#[tokio::test]
async fn player_name_is_utf16_padded_to_40_bytes() {
    let mut client = client_over(vec![]);
    client.run().await.unwrap();

    let transport = client.transport();
    let info = &transport.sent[0];
    let mut packet = Packet::from_frame(info).unwrap();
    assert_eq!(packet.read_utf16(40).unwrap(), "tester");
}
