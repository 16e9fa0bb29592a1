// crates/duel-client/tests/router_scenarios.rs
//
// The message router driven with hand-built server packets: handshake
// gating, choice-reply layouts, sentinel conventions, and the closed
// dispatch over unknown ids.

mod common;

use common::RecordingExecutor;
use duel_client::{ClientError, GameManager, Handled};
use duel_core::{Deck, Location, Player};
use duel_protocol::wire_types::{CtosMessage, GameMessage, StocMessage, SERVER_HANDSHAKE};
use duel_protocol::Packet;

fn manager_with(executor: RecordingExecutor) -> GameManager<RecordingExecutor> {
    let deck = Deck::new(vec![111, 222, 333], vec![444], vec![555]);
    GameManager::new(deck, executor)
}

fn manager() -> GameManager<RecordingExecutor> {
    manager_with(RecordingExecutor::default())
}

fn game_msg(inner: GameMessage) -> Packet {
    let mut packet = Packet::new(StocMessage::GameMsg as u8);
    packet.write_u8(inner as u8).unwrap();
    packet
}

fn join_ack(handshake: u32) -> Packet {
    let mut packet = Packet::new(StocMessage::JoinGame as u8);
    packet.write_u32(0).unwrap(); // lflist
    packet.write_u8(0).unwrap(); // rule
    packet.write_u8(0).unwrap(); // mode
    packet.write_u8(5).unwrap(); // duel_rule
    packet.write_bool(false).unwrap(); // nocheck
    packet.write_bool(false).unwrap(); // noshuffle
    packet.write_bytes(&[0; 3]).unwrap();
    packet.write_u32(8000).unwrap(); // start lp
    packet.write_u8(5).unwrap(); // start hand
    packet.write_u8(1).unwrap(); // draw count
    packet.write_u16(240).unwrap(); // time limit
    packet.write_bytes(&[0; 4]).unwrap();
    packet.write_u32(handshake).unwrap();
    packet.write_u32(0x1360).unwrap(); // version
    packet.write_u32(1).unwrap(); // team1
    packet.write_u32(1).unwrap(); // team2
    packet.write_u32(1).unwrap(); // best of
    packet.write_u32(0).unwrap(); // duel flag
    packet.write_u32(0).unwrap(); // forbidden types
    packet.write_u32(0).unwrap(); // extra rules
    packet
}

/// A `(card id, controller, location, index-u32)` candidate entry.
fn write_candidate(packet: &mut Packet, id: u32, player: u8, location: Location, index: u32) {
    packet.write_u32(id).unwrap();
    packet.write_u8(player).unwrap();
    packet.write_u8(location.byte()).unwrap();
    packet.write_u32(index).unwrap();
}

#[test]
fn join_ack_with_good_handshake_replies_with_deck() {
    let mut manager = manager();
    let mut packet = join_ack(SERVER_HANDSHAKE);

    let handled = manager.handle(&mut packet).unwrap();
    let Handled::Reply(reply) = handled else {
        panic!("expected an UPDATE_DECK reply");
    };
    assert_eq!(reply.msg_id(), CtosMessage::UpdateDeck as u8);

    let mut reply = Packet::from_frame(&reply.data()).unwrap();
    assert_eq!(reply.read_u32().unwrap(), 4); // main + extra
    assert_eq!(reply.read_u32().unwrap(), 1); // side
    let ids: Vec<u32> = (0..5).map(|_| reply.read_u32().unwrap()).collect();
    assert_eq!(ids, vec![111, 222, 333, 444, 555]);
}

#[test]
fn join_ack_with_bad_handshake_aborts_without_deck() {
    let mut manager = manager();
    let mut packet = join_ack(SERVER_HANDSHAKE ^ 1);

    let err = manager.handle(&mut packet).unwrap_err();
    assert!(matches!(err, ClientError::HandshakeMismatch { .. }));
}

#[test]
fn yesno_reason_30_routes_to_battle_replay() {
    let mut manager = manager();
    let mut packet = game_msg(GameMessage::SelectYesNo);
    packet.write_u8(0).unwrap();
    packet.write_u64(30).unwrap();

    let handled = manager.handle(&mut packet).unwrap();
    assert_eq!(manager.executor().calls, vec!["select_battle_replay"]);

    let Handled::Reply(reply) = handled else {
        panic!("expected a reply");
    };
    assert_eq!(reply.msg_id(), CtosMessage::Response as u8);
    assert_eq!(reply.content(), &[0x00]); // battle_replay_answer = false
}

#[test]
fn yesno_other_reasons_route_to_plain_yn() {
    let mut manager = manager();
    let mut packet = game_msg(GameMessage::SelectYesNo);
    packet.write_u8(0).unwrap();
    packet.write_u64(94).unwrap();

    let handled = manager.handle(&mut packet).unwrap();
    assert_eq!(manager.executor().calls, vec!["select_yn"]);
    let Handled::Reply(reply) = handled else {
        panic!("expected a reply");
    };
    assert_eq!(reply.content(), &[0x01]); // yn_answer = true
}

#[test]
fn empty_chain_prompt_declines_with_sentinel() {
    let mut manager = manager();
    let mut packet = game_msg(GameMessage::SelectChain);
    packet.write_u8(0).unwrap(); // addressed to
    packet.write_u8(0).unwrap(); // spe count
    packet.write_bool(false).unwrap(); // forced
    packet.write_u32(0).unwrap(); // hint1
    packet.write_u32(0).unwrap(); // hint2
    packet.write_u32(0).unwrap(); // no candidates

    let handled = manager.handle(&mut packet).unwrap();
    let Handled::Reply(reply) = handled else {
        panic!("expected a reply");
    };
    assert_eq!(reply.content(), &[0xff, 0xff, 0xff, 0xff]);
    // The executor is never consulted for an empty prompt.
    assert!(manager.executor().calls.is_empty());
}

#[test]
fn place_selection_over_opponent_spell_zones() {
    let mut executor = RecordingExecutor::default();
    executor.place_pick = 4;
    let mut manager = manager_with(executor);

    // Selectable: opponent spell zones 0 and 4 (bits 24 and 28); the
    // wire carries the complement.
    let selectable: u32 = (1 << 24) | (1 << 28);
    let mut packet = game_msg(GameMessage::SelectPlace);
    packet.write_u8(0).unwrap();
    packet.write_u8(1).unwrap(); // min
    packet.write_u32(!selectable).unwrap();

    let handled = manager.handle(&mut packet).unwrap();

    let (player, location, choices) = manager.executor().last_place.clone().unwrap();
    assert_eq!(player, Player::Opponent);
    assert_eq!(location, Location::SPELL_ZONE);
    assert_eq!(choices, vec![0, 4]);

    // Reply order: player index, location byte, zone offset.
    let Handled::Reply(reply) = handled else {
        panic!("expected a reply");
    };
    assert_eq!(reply.content(), &[1, Location::SPELL_ZONE.byte(), 4]);
}

#[test]
fn card_selection_reply_is_count_prefixed_index_list() {
    let mut executor = RecordingExecutor::default();
    executor.card_pick = vec![1];
    let mut manager = manager_with(executor);

    let mut packet = game_msg(GameMessage::SelectCard);
    packet.write_u8(0).unwrap();
    packet.write_bool(false).unwrap(); // cancelable
    packet.write_u32(1).unwrap(); // min
    packet.write_u32(1).unwrap(); // max
    packet.write_u32(2).unwrap(); // candidates
    write_candidate(&mut packet, 1001, 0, Location::HAND, 0);
    packet.write_u32(0x5).unwrap(); // position
    write_candidate(&mut packet, 1002, 0, Location::HAND, 1);
    packet.write_u32(0x5).unwrap();

    let handled = manager.handle(&mut packet).unwrap();
    assert_eq!(manager.executor().last_min_max, Some((1, 1)));

    let Handled::Reply(reply) = handled else {
        panic!("expected a reply");
    };
    let mut reply = Packet::from_frame(&reply.data()).unwrap();
    assert_eq!(reply.read_u32().unwrap(), 0);
    assert_eq!(reply.read_u32().unwrap(), 1); // count
    assert_eq!(reply.read_u32().unwrap(), 1); // picked index

    // The candidate ids were folded into the mirror.
    let card = manager.duel().card_at(Player::Me, Location::HAND, 1).unwrap();
    assert_eq!(manager.duel().card(card).id, 1002);
}

#[test]
fn select_hint_is_carried_into_the_next_selection() {
    let mut executor = RecordingExecutor::default();
    executor.card_pick = vec![0];
    let mut manager = manager_with(executor);

    let mut hint = game_msg(GameMessage::Hint);
    hint.write_u8(3).unwrap(); // HINT_SELECT
    hint.write_u8(0).unwrap();
    hint.write_u64(567).unwrap();
    assert!(matches!(
        manager.handle(&mut hint).unwrap(),
        Handled::NoReply
    ));

    let mut packet = game_msg(GameMessage::SelectCard);
    packet.write_u8(0).unwrap();
    packet.write_bool(true).unwrap();
    packet.write_u32(0).unwrap();
    packet.write_u32(1).unwrap();
    packet.write_u32(1).unwrap();
    write_candidate(&mut packet, 77, 0, Location::HAND, 0);
    packet.write_u32(0x5).unwrap();

    manager.handle(&mut packet).unwrap();
    assert_eq!(manager.executor().last_hint, 567);
}

#[test]
fn timelimit_ack_only_for_the_local_player() {
    let mut manager = manager();

    let mut packet = Packet::new(StocMessage::TimeLimit as u8);
    packet.write_u8(0).unwrap();
    let handled = manager.handle(&mut packet).unwrap();
    let Handled::Reply(reply) = handled else {
        panic!("expected TIME_CONFIRM");
    };
    assert_eq!(reply.msg_id(), CtosMessage::TimeConfirm as u8);
    assert!(reply.content().is_empty());

    let mut packet = Packet::new(StocMessage::TimeLimit as u8);
    packet.write_u8(1).unwrap();
    assert!(matches!(
        manager.handle(&mut packet).unwrap(),
        Handled::NoReply
    ));
}

#[test]
fn type_change_acknowledges_only_valid_seats() {
    let mut manager = manager();

    let mut packet = Packet::new(StocMessage::TypeChange as u8);
    packet.write_u8(3).unwrap();
    let handled = manager.handle(&mut packet).unwrap();
    let Handled::Reply(reply) = handled else {
        panic!("expected READY");
    };
    assert_eq!(reply.msg_id(), CtosMessage::Ready as u8);

    let mut packet = Packet::new(StocMessage::TypeChange as u8);
    packet.write_u8(7).unwrap();
    assert!(matches!(
        manager.handle(&mut packet).unwrap(),
        Handled::NoReply
    ));
}

#[test]
fn unknown_discriminants_are_silent_no_ops() {
    let mut manager = manager();

    let mut packet = Packet::new(0x7f);
    packet.write_u32(0xdead_beef).unwrap();
    assert!(matches!(
        manager.handle(&mut packet).unwrap(),
        Handled::NoReply
    ));

    // Unrecognized inner game-message id: no mutation, no reply.
    let mut packet = Packet::new(StocMessage::GameMsg as u8);
    packet.write_u8(9).unwrap();
    packet.write_u32(0xdead_beef).unwrap();
    assert!(matches!(
        manager.handle(&mut packet).unwrap(),
        Handled::NoReply
    ));
    assert!(manager.executor().calls.is_empty());
}

#[test]
fn server_error_notification_tears_down() {
    let mut manager = manager();
    let mut packet = Packet::new(StocMessage::ErrorMsg as u8);
    packet.write_u8(2).unwrap(); // deck error

    let err = manager.handle(&mut packet).unwrap_err();
    assert!(matches!(err, ClientError::ServerRejected(_)));
}

#[test]
fn unimplemented_variants_fail_loudly() {
    let mut manager = manager();
    let mut packet = game_msg(GameMessage::Retry);
    assert!(matches!(
        manager.handle(&mut packet).unwrap_err(),
        ClientError::Unsupported(_)
    ));

    let mut packet = game_msg(GameMessage::TagSwap);
    assert!(matches!(
        manager.handle(&mut packet).unwrap_err(),
        ClientError::Unsupported(_)
    ));
}

#[test]
fn start_message_seeds_the_mirror() {
    let mut manager = manager();
    let mut packet = game_msg(GameMessage::Start);
    packet.write_bool(false).unwrap(); // we go first
    packet.write_u32(8000).unwrap();
    packet.write_u32(8000).unwrap();
    packet.write_u16(40).unwrap(); // my main
    packet.write_u16(15).unwrap(); // my extra
    packet.write_u16(40).unwrap();
    packet.write_u16(15).unwrap();

    manager.handle(&mut packet).unwrap();

    let duel = manager.duel();
    assert_eq!(duel.life, [8000, 8000]);
    assert_eq!(duel.turn_player, Player::Me);
    assert_eq!(duel.field(Player::Me).deck.len(), 40);
    assert_eq!(duel.field(Player::Opponent).extra.len(), 15);
    assert_eq!(manager.executor().calls, vec!["on_start"]);
}

#[test]
fn move_message_relocates_one_card() {
    let mut manager = manager();

    let mut start = game_msg(GameMessage::Start);
    start.write_bool(false).unwrap();
    start.write_u32(8000).unwrap();
    start.write_u32(8000).unwrap();
    start.write_u16(5).unwrap();
    start.write_u16(0).unwrap();
    start.write_u16(5).unwrap();
    start.write_u16(0).unwrap();
    manager.handle(&mut start).unwrap();

    let mut packet = game_msg(GameMessage::Move);
    packet.write_u32(46986414).unwrap(); // revealed id
    packet.write_u8(0).unwrap();
    packet.write_u8(Location::DECK.byte()).unwrap();
    packet.write_u32(4).unwrap();
    packet.write_u32(0).unwrap();
    packet.write_u8(0).unwrap();
    packet.write_u8(Location::GRAVE.byte()).unwrap();
    packet.write_u32(0).unwrap();
    packet.write_u32(0x1).unwrap();
    packet.write_u32(0).unwrap(); // reason

    manager.handle(&mut packet).unwrap();

    let duel = manager.duel();
    assert_eq!(duel.field(Player::Me).deck.len(), 4);
    assert_eq!(duel.field(Player::Me).grave.len(), 1);
    let card = duel.card_at(Player::Me, Location::GRAVE, 0).unwrap();
    assert_eq!(duel.card(card).id, 46986414);
}

#[test]
fn rematch_prompt_consults_the_executor() {
    let mut manager = manager();
    let mut packet = Packet::new(StocMessage::Rematch as u8);

    let handled = manager.handle(&mut packet).unwrap();
    assert_eq!(manager.executor().calls, vec!["on_rematch"]);
    let Handled::Reply(reply) = handled else {
        panic!("expected REMATCH_RESPONSE");
    };
    assert_eq!(reply.msg_id(), CtosMessage::RematchResponse as u8);
    assert_eq!(reply.content(), &[0x00]);
}

#[test]
fn duel_end_shuts_the_connection_down() {
    let mut manager = manager();
    let mut packet = Packet::new(StocMessage::DuelEnd as u8);
    assert!(matches!(
        manager.handle(&mut packet).unwrap(),
        Handled::Shutdown
    ));
}
