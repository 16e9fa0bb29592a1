//! The message router.
//!
//! Dispatch is two-level and closed: an outer server-message id, and
//! an inner game-message id when the outer id is the game envelope.
//! Every handler decodes a fixed, order-dependent field sequence,
//! mutates the duel mirror, and may produce exactly one reply packet.
//! Ids without a handler are deliberate no-ops — no mutation, no
//! reply — so newer servers stay compatible.
//!
//! Field widths differ between handlers for the same logical quantity
//! (a card index is 4 bytes in most candidate lists but 1 byte in
//! battle-command attack lists, counter prompts and single-card
//! updates). Each recipe is spelled out rather than shared, because
//! one wrong width desynchronizes the rest of the stream.
//!
//! Replies are always built into a fresh outbound packet; the incoming
//! buffer is read-only.

use duel_core::{
    zone, Attribute, BattlePhaseCommands, CardHandle, Deck, Duel, Location, MainPhaseCommands,
    Player, Position, Race,
};
use duel_protocol::query;
use duel_protocol::wire_types::{CtosMessage, ErrorKind, GameMessage, StocMessage, SERVER_HANDSHAKE};
use duel_protocol::{Packet, ProtocolError};
use tracing::{debug, error, info};

use crate::error::ClientError;
use crate::executor::DuelExecutor;

// Hint message constants.
const HINT_EVENT: u8 = 1;
const HINT_SELECT: u8 = 3;
const EVENT_MAINPHASE_END: u64 = 23;
const EVENT_BATTLING: u64 = 24;

/// Yes/no description asking whether to replay the battle.
const DESC_BATTLE_REPLAY: u64 = 30;

/// Seat indices 0-6 are duelist/spectator slots worth acknowledging.
const SEAT_LIMIT: u8 = 7;

/// Outcome of routing one message.
#[derive(Debug)]
pub enum Handled {
    /// Send this reply, then keep receiving.
    Reply(Packet),
    /// Nothing to send; keep receiving.
    NoReply,
    /// Tear the connection down (duel over, server farewell).
    Shutdown,
}

/// Routes server messages, owns the duel mirror, and drives the
/// executor at every choice point.
pub struct GameManager<E> {
    deck: Deck,
    executor: E,
    duel: Duel,
    /// Select hint carried over from the most recent hint message.
    select_hint: u64,
    won_last_duel: bool,
}

impl<E: DuelExecutor> GameManager<E> {
    pub fn new(deck: Deck, executor: E) -> Self {
        GameManager {
            deck,
            executor,
            duel: Duel::new(),
            select_hint: 0,
            won_last_duel: false,
        }
    }

    pub fn duel(&self) -> &Duel {
        &self.duel
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Route one received packet to its handler.
    pub fn handle(&mut self, packet: &mut Packet) -> Result<Handled, ClientError> {
        let Some(msg) = StocMessage::from_u8(packet.msg_id()) else {
            return Ok(Handled::NoReply);
        };

        match msg {
            StocMessage::GameMsg => self.handle_game_msg(packet),
            StocMessage::ErrorMsg => self.on_error_msg(packet).map(|_| Handled::Shutdown),
            StocMessage::SelectHand => done(self.on_select_hand()?),
            StocMessage::SelectTp => done(self.on_select_tp()?),
            StocMessage::ChangeSide => done(self.on_change_side()?),
            StocMessage::JoinGame => done(self.on_joined_game(packet)?),
            StocMessage::TypeChange => done(self.on_type_changed(packet)?),
            StocMessage::DuelStart => Ok(Handled::NoReply),
            StocMessage::DuelEnd => {
                debug!("Duel ended by server");
                Ok(Handled::Shutdown)
            }
            StocMessage::Replay => Ok(Handled::NoReply),
            StocMessage::TimeLimit => done(self.on_timelimit(packet)?),
            StocMessage::Chat => Ok(Handled::NoReply),
            StocMessage::PlayerEnter => done(self.on_player_enter(packet)?),
            StocMessage::PlayerChange => Ok(Handled::NoReply),
            StocMessage::WatchChange => Ok(Handled::NoReply),
            StocMessage::Rematch => done(self.on_rematch()?),
            _ => Ok(Handled::NoReply),
        }
    }

    fn handle_game_msg(&mut self, packet: &mut Packet) -> Result<Handled, ClientError> {
        let Some(msg) = GameMessage::from_u8(packet.read_u8()?) else {
            return Ok(Handled::NoReply);
        };

        let reply = match msg {
            GameMessage::Retry => return Err(ClientError::Unsupported("retry")),
            GameMessage::TagSwap => return Err(ClientError::Unsupported("tag swap")),
            GameMessage::AnnounceCard => return Err(ClientError::Unsupported("announce card")),

            GameMessage::Hint => self.on_hint(packet)?,
            GameMessage::Start => self.on_start(packet)?,
            GameMessage::Win => self.on_win(packet)?,
            GameMessage::NewTurn => self.on_new_turn(packet)?,
            GameMessage::NewPhase => self.on_new_phase(packet)?,

            GameMessage::SelectIdleCmd => self.on_select_idle_cmd(packet)?,
            GameMessage::SelectBattleCmd => self.on_select_battle_cmd(packet)?,
            GameMessage::SelectEffectYn => self.on_select_effect_yn(packet)?,
            GameMessage::SelectYesNo => self.on_select_yesno(packet)?,
            GameMessage::SelectOption => self.on_select_option(packet)?,
            GameMessage::SelectCard => self.on_select_card(packet)?,
            GameMessage::SelectChain => self.on_select_chain(packet)?,
            GameMessage::SelectPlace | GameMessage::SelectDisfield => {
                self.on_select_place(packet)?
            }
            GameMessage::SelectPosition => self.on_select_position(packet)?,
            GameMessage::SelectTribute => self.on_select_tribute(packet)?,
            GameMessage::SelectCounter => self.on_select_counter(packet)?,
            GameMessage::SelectSum => self.on_select_sum(packet)?,
            GameMessage::SelectUnselect => self.on_select_unselect(packet)?,
            GameMessage::AnnounceRace => self.on_announce_race(packet)?,
            GameMessage::AnnounceAttrib => self.on_announce_attr(packet)?,
            GameMessage::AnnounceNumber => self.on_announce_number(packet)?,

            GameMessage::UpdateData => self.on_update_data(packet)?,
            GameMessage::UpdateCard => self.on_update_card(packet)?,
            GameMessage::ShuffleDeck => self.on_shuffle_deck(packet)?,
            GameMessage::ShuffleHand => self.on_shuffle_hand(packet)?,
            GameMessage::ShuffleExtra => self.on_shuffle_extra(packet)?,
            GameMessage::ShuffleSetCard => self.on_shuffle_setcard(packet)?,
            GameMessage::SortCard => self.on_sort_card(packet)?,
            GameMessage::SortChain => self.on_sort_chain()?,

            GameMessage::Move => self.on_move(packet)?,
            GameMessage::PosChange => self.on_poschange(packet)?,
            GameMessage::Set => None,
            GameMessage::Swap => self.on_swap(packet)?,
            GameMessage::Summoning | GameMessage::FlipSummoning => self.on_summoning(packet)?,
            GameMessage::Summoned | GameMessage::FlipSummoned => self.on_summoned()?,
            GameMessage::SpSummoning => self.on_summoning(packet)?,
            GameMessage::SpSummoned => self.on_summoned()?,
            GameMessage::Chaining => self.on_chaining(packet)?,
            GameMessage::ChainEnd => self.on_chain_end()?,
            GameMessage::BecomeTarget => self.on_become_target(packet)?,
            GameMessage::Draw => self.on_draw(packet)?,
            GameMessage::Damage | GameMessage::PayLpCost => self.on_damage(packet)?,
            GameMessage::Recover => self.on_recover(packet)?,
            GameMessage::Equip => self.on_equip(packet)?,
            GameMessage::Unequip => self.on_unequip(packet)?,
            GameMessage::LpUpdate => self.on_lp_update(packet)?,
            GameMessage::CardTarget => self.on_card_target(packet)?,
            GameMessage::CancelTarget => self.on_cancel_target(packet)?,
            GameMessage::Attack => self.on_attack(packet)?,
            GameMessage::Battle => self.on_battle()?,
            GameMessage::AttackDisabled => self.on_battle()?,
            GameMessage::RockPaperScissors => None,

            _ => None,
        };
        done(reply)
    }

    // -------------------------------------------------------------------------
    // Lobby / meta messages
    // -------------------------------------------------------------------------

    fn on_error_msg(&mut self, packet: &mut Packet) -> Result<(), ClientError> {
        let kind = ErrorKind::from_u8(packet.read_u8()?)
            .ok_or(ProtocolError::InvalidField("error type"))?;
        match kind {
            ErrorKind::Join => error!("Join error"),
            ErrorKind::Deck => error!("Deck error"),
            ErrorKind::Side => error!("Side error"),
            ErrorKind::Version => error!("Version error"),
            ErrorKind::Version2 => {
                let _ = packet.read_bytes(3)?;
                let version = packet.read_u32()?;
                error!(
                    "Version error; host version: {}.{}.{}.{}",
                    version & 0xff,
                    (version >> 8) & 0xff,
                    (version >> 16) & 0xff,
                    (version >> 24) & 0xff
                );
            }
        }
        Err(ClientError::ServerRejected(kind))
    }

    fn on_select_hand(&mut self) -> Result<Option<Packet>, ClientError> {
        let hand = self.executor.select_hand();
        let mut reply = Packet::new(CtosMessage::HandResult as u8);
        reply.write_u8(hand)?;
        Ok(Some(reply))
    }

    fn on_select_tp(&mut self) -> Result<Option<Packet>, ClientError> {
        let goes_first = self.executor.select_tp();
        let mut reply = Packet::new(CtosMessage::TpResult as u8);
        reply.write_bool(goes_first)?;
        Ok(Some(reply))
    }

    fn on_change_side(&mut self) -> Result<Option<Packet>, ClientError> {
        self.executor.change_side(&mut self.deck);
        Ok(Some(self.update_deck_packet()?))
    }

    fn on_joined_game(&mut self, packet: &mut Packet) -> Result<Option<Packet>, ClientError> {
        let _lflist = packet.read_u32()?;
        let _rule = packet.read_u8()?;
        let _mode = packet.read_u8()?;
        let _duel_rule = packet.read_u8()?;
        let _nocheck_deck = packet.read_bool()?;
        let _noshuffle_deck = packet.read_bool()?;
        let _ = packet.read_bytes(3)?;
        let _start_lp = packet.read_u32()?;
        let _start_hand = packet.read_u8()?;
        let _draw_count = packet.read_u8()?;
        let _time_limit = packet.read_u16()?;
        let _ = packet.read_bytes(4)?;
        let handshake = packet.read_u32()?;
        let _version = packet.read_u32()?;
        let _team1 = packet.read_u32()?;
        let _team2 = packet.read_u32()?;
        let _best_of = packet.read_u32()?;
        let _duel_flag = packet.read_u32()?;
        let _forbidden_types = packet.read_u32()?;
        let _extra_rules = packet.read_u32()?;

        if handshake != SERVER_HANDSHAKE {
            error!("Handshake mismatch: {:#010x}", handshake);
            return Err(ClientError::HandshakeMismatch { got: handshake });
        }

        Ok(Some(self.update_deck_packet()?))
    }

    fn on_type_changed(&mut self, packet: &mut Packet) -> Result<Option<Packet>, ClientError> {
        let seat = packet.read_u8()?;
        if seat >= SEAT_LIMIT {
            return Ok(None);
        }
        Ok(Some(Packet::new(CtosMessage::Ready as u8)))
    }

    fn on_timelimit(&mut self, packet: &mut Packet) -> Result<Option<Packet>, ClientError> {
        let player = read_player(packet)?;
        if player == Player::Me {
            return Ok(Some(Packet::new(CtosMessage::TimeConfirm as u8)));
        }
        Ok(None)
    }

    fn on_player_enter(&mut self, packet: &mut Packet) -> Result<Option<Packet>, ClientError> {
        let name = packet.read_utf16(40)?;
        info!("Player entered: {}", name);
        Ok(None)
    }

    fn on_rematch(&mut self) -> Result<Option<Packet>, ClientError> {
        let answer = self.executor.on_rematch(self.won_last_duel);
        let mut reply = Packet::new(CtosMessage::RematchResponse as u8);
        reply.write_bool(answer)?;
        Ok(Some(reply))
    }

    // -------------------------------------------------------------------------
    // Duel flow
    // -------------------------------------------------------------------------

    fn on_hint(&mut self, packet: &mut Packet) -> Result<Option<Packet>, ClientError> {
        let hint_type = packet.read_u8()?;
        let _addressed_to = read_player(packet)?;
        let data = packet.read_u64()?;

        if hint_type == HINT_EVENT {
            if data == EVENT_MAINPHASE_END {
                self.duel.at_mainphase_end();
            } else if data == EVENT_BATTLING {
                self.duel.clear_under_attack();
            }
        }
        if hint_type == HINT_SELECT {
            self.select_hint = data;
        }
        Ok(None)
    }

    fn on_start(&mut self, packet: &mut Packet) -> Result<Option<Packet>, ClientError> {
        let is_first = !packet.read_bool()?;
        let first_player = if is_first { Player::Me } else { Player::Opponent };

        // Cards never survive across duels; start over from an empty
        // arena on every start announcement (including rematches).
        self.duel = Duel::new();
        self.duel.on_start(first_player);

        for player in Player::BOTH {
            let lp = packet.read_u32()?;
            self.duel.on_lp_update(player, lp as i32);
        }
        for player in Player::BOTH {
            let num_main = packet.read_u16()? as usize;
            let num_extra = packet.read_u16()? as usize;
            self.duel.set_deck(player, num_main, num_extra);
        }

        self.executor.on_start(&self.duel);
        Ok(None)
    }

    fn on_win(&mut self, packet: &mut Packet) -> Result<Option<Packet>, ClientError> {
        let win = packet.read_u8()? == 0;
        self.won_last_duel = win;
        self.executor.on_win(&self.duel, win);
        Ok(None)
    }

    fn on_new_turn(&mut self, packet: &mut Packet) -> Result<Option<Packet>, ClientError> {
        let turn_player = read_player(packet)?;
        self.duel.on_new_turn(turn_player);
        self.executor.on_new_turn(&self.duel);
        Ok(None)
    }

    fn on_new_phase(&mut self, packet: &mut Packet) -> Result<Option<Packet>, ClientError> {
        let phase = packet.read_phase()?;
        self.duel.on_new_phase(phase);
        self.executor.on_new_phase(&self.duel);
        Ok(None)
    }

    // -------------------------------------------------------------------------
    // Choice requests
    // -------------------------------------------------------------------------

    fn on_select_idle_cmd(&mut self, packet: &mut Packet) -> Result<Option<Packet>, ClientError> {
        let _addressed_to = read_player(packet)?;
        let mut main = MainPhaseCommands::default();

        // Wire order: summonable, sp-summonable, repositionable (1-byte
        // index), monster-settable, spell-settable, activatable.
        for _ in 0..packet.read_u32()? {
            let card = self.read_listed_card(packet, IndexWidth::U32)?;
            main.summonable.push(card);
        }
        for _ in 0..packet.read_u32()? {
            let card = self.read_listed_card(packet, IndexWidth::U32)?;
            main.spsummonable.push(card);
        }
        for _ in 0..packet.read_u32()? {
            let card = self.read_listed_card(packet, IndexWidth::U8)?;
            main.repositionable.push(card);
        }
        for _ in 0..packet.read_u32()? {
            let card = self.read_listed_card(packet, IndexWidth::U32)?;
            main.msetable.push(card);
        }
        for _ in 0..packet.read_u32()? {
            let card = self.read_listed_card(packet, IndexWidth::U32)?;
            main.ssetable.push(card);
        }
        for _ in 0..packet.read_u32()? {
            let card = self.read_listed_card(packet, IndexWidth::U32)?;
            let description = packet.read_u64()?;
            let _operation_type = packet.read_u8()?;
            main.activatable.push(card);
            main.activation_descs.push(description);
        }

        main.can_battle = packet.read_bool()?;
        main.can_end = packet.read_bool()?;
        main.can_shuffle = packet.read_bool()?;

        let selected = self.executor.select_mainphase_action(&self.duel, &main);
        let mut reply = response();
        reply.write_u32(selected)?;
        Ok(Some(reply))
    }

    fn on_select_battle_cmd(&mut self, packet: &mut Packet) -> Result<Option<Packet>, ClientError> {
        let _addressed_to = read_player(packet)?;
        let mut battle = BattlePhaseCommands::default();

        for _ in 0..packet.read_u32()? {
            let card = self.read_listed_card(packet, IndexWidth::U32)?;
            let description = packet.read_u64()?;
            let _operation_type = packet.read_u8()?;
            battle.activatable.push(card);
            battle.activation_descs.push(description);
        }

        for _ in 0..packet.read_u32()? {
            let card = self.read_listed_card(packet, IndexWidth::U8)?;
            let direct_attackable = packet.read_bool()?;
            let state = self.duel.card_mut(card);
            state.can_direct_attack = direct_attackable;
            state.attacked = false;
            battle.attackable.push(card);
        }

        battle.can_main2 = packet.read_bool()?;
        battle.can_end = packet.read_bool()?;

        let selected = self.executor.select_battle_action(&self.duel, &battle);
        let mut reply = response();
        reply.write_u32(selected)?;
        Ok(Some(reply))
    }

    fn on_select_effect_yn(&mut self, packet: &mut Packet) -> Result<Option<Packet>, ClientError> {
        let _addressed_to = read_player(packet)?;
        let card_id = packet.read_id()?;
        let controller = read_player(packet)?;
        let location = packet.read_location()?;
        let index = packet.read_u32()? as usize;
        let _position = packet.read_position()?;
        let description = packet.read_u64()?;

        let card = self.require_card(controller, location, index)?;
        self.duel.card_mut(card).id = card_id;
        let answer = self.executor.select_effect_yn(&self.duel, card, description);

        let mut reply = response();
        reply.write_u32(u32::from(answer))?;
        Ok(Some(reply))
    }

    fn on_select_yesno(&mut self, packet: &mut Packet) -> Result<Option<Packet>, ClientError> {
        let _addressed_to = read_player(packet)?;
        let description = packet.read_u64()?;
        let answer = if description == DESC_BATTLE_REPLAY {
            self.executor.select_battle_replay(&self.duel)
        } else {
            self.executor.select_yn(&self.duel)
        };
        let mut reply = response();
        reply.write_bool(answer)?;
        Ok(Some(reply))
    }

    fn on_select_option(&mut self, packet: &mut Packet) -> Result<Option<Packet>, ClientError> {
        let _addressed_to = packet.read_u8()?;
        let num_options = packet.read_u8()?;
        let mut options = Vec::with_capacity(num_options as usize);
        for _ in 0..num_options {
            options.push(packet.read_u64()?);
        }
        let answer = self.executor.select_option(&self.duel, &options);

        let mut reply = response();
        reply.write_u32(answer)?;
        Ok(Some(reply))
    }

    fn on_select_card(&mut self, packet: &mut Packet) -> Result<Option<Packet>, ClientError> {
        let _addressed_to = read_player(packet)?;
        let cancelable = packet.read_bool()?;
        let min = packet.read_u32()?;
        let max = packet.read_u32()?;

        let mut choices = Vec::new();
        for _ in 0..packet.read_u32()? {
            let card = self.read_listed_card(packet, IndexWidth::U32)?;
            let _position = packet.read_position()?;
            choices.push(card);
        }

        let selected =
            self.executor
                .select_card(&self.duel, &choices, min, max, cancelable, self.select_hint);

        let mut reply = response();
        reply.write_u32(0)?;
        reply.write_u32(selected.len() as u32)?;
        for index in selected {
            reply.write_u32(index)?;
        }
        Ok(Some(reply))
    }

    fn on_select_chain(&mut self, packet: &mut Packet) -> Result<Option<Packet>, ClientError> {
        let _addressed_to = read_player(packet)?;
        let _spe_count = packet.read_u8()?;
        let forced = packet.read_bool()?;
        let _hint1 = packet.read_u32()?;
        let _hint2 = packet.read_u32()?;

        let mut choices = Vec::new();
        let mut descriptions = Vec::new();
        for _ in 0..packet.read_u32()? {
            let card = self.read_listed_card(packet, IndexWidth::U32)?;
            let _position = packet.read_position()?;
            let description = packet.read_u64()?;
            let _operation_type = packet.read_u8()?;
            choices.push(card);
            descriptions.push(description);
        }

        let mut reply = response();
        if choices.is_empty() {
            // Nothing to chain: decline with the sentinel.
            reply.write_i32(-1)?;
        } else {
            let selected = self
                .executor
                .select_chain(&self.duel, &choices, &descriptions, forced);
            reply.write_i32(selected)?;
        }
        Ok(Some(reply))
    }

    fn on_select_place(&mut self, packet: &mut Packet) -> Result<Option<Packet>, ClientError> {
        let _addressed_to = packet.read_u8()?;
        let _min = packet.read_u8()?;
        let selectable = !packet.read_u32()?;

        let (player, location) = if selectable & zone::MONSTER_ZONES != 0 {
            (Player::Me, Location::MONSTER_ZONE)
        } else if selectable & zone::SPELL_ZONES != 0 {
            (Player::Me, Location::SPELL_ZONE)
        } else if selectable & (zone::MONSTER_ZONES << zone::OPPONENT_SHIFT) != 0 {
            (Player::Opponent, Location::MONSTER_ZONE)
        } else if selectable & (zone::SPELL_ZONES << zone::OPPONENT_SHIFT) != 0 {
            (Player::Opponent, Location::SPELL_ZONE)
        } else {
            return Err(ProtocolError::InvalidField("zone mask").into());
        };

        let slot_count = if location == Location::MONSTER_ZONE {
            zone::MONSTER_SLOT_COUNT
        } else {
            zone::SPELL_SLOT_COUNT
        };
        let choices: Vec<u8> = (0..slot_count)
            .filter(|i| selectable & zone::slot_mask(player, location, *i) != 0)
            .map(|i| i as u8)
            .collect();

        let selected = self
            .executor
            .select_place(&self.duel, player, location, &choices);

        let mut reply = response();
        reply.write_u8(player.index() as u8)?;
        reply.write_u8(location.byte())?;
        reply.write_u8(selected)?;
        Ok(Some(reply))
    }

    fn on_select_position(&mut self, packet: &mut Packet) -> Result<Option<Packet>, ClientError> {
        let _addressed_to = read_player(packet)?;
        let card_id = packet.read_id()?;
        let selectable = u32::from(packet.read_u8()?);

        let choices: Vec<Position> = Position::ALL
            .iter()
            .copied()
            .filter(|pos| pos.raw() & selectable != 0)
            .collect();
        let selected = self.executor.select_position(&self.duel, card_id, &choices);

        let mut reply = response();
        reply.write_u32(selected.raw())?;
        Ok(Some(reply))
    }

    fn on_select_tribute(&mut self, packet: &mut Packet) -> Result<Option<Packet>, ClientError> {
        let _addressed_to = read_player(packet)?;
        let cancelable = packet.read_bool()?;
        let min = packet.read_u32()?;
        let max = packet.read_u32()?;

        let mut choices = Vec::new();
        for _ in 0..packet.read_u32()? {
            let card = self.read_listed_card(packet, IndexWidth::U32)?;
            let _ = packet.read_bytes(1)?;
            choices.push(card);
        }

        let selected =
            self.executor
                .select_tribute(&self.duel, &choices, min, max, cancelable, self.select_hint);

        let mut reply = response();
        reply.write_u32(0)?;
        reply.write_u32(selected.len() as u32)?;
        for index in selected {
            reply.write_u32(index)?;
        }
        Ok(Some(reply))
    }

    fn on_select_counter(&mut self, packet: &mut Packet) -> Result<Option<Packet>, ClientError> {
        let _addressed_to = read_player(packet)?;
        let counter_type = packet.read_u16()?;
        let quantity = packet.read_u32()?;

        let mut cards = Vec::new();
        let mut counts = Vec::new();
        for _ in 0..packet.read_u8()? {
            let card = self.read_listed_card(packet, IndexWidth::U8)?;
            let num = packet.read_u16()?;
            cards.push(card);
            counts.push(num);
        }

        let used =
            self.executor
                .select_counter(&self.duel, counter_type, quantity, &cards, &counts);

        let mut reply = response();
        for count in used {
            reply.write_u16(count)?;
        }
        Ok(Some(reply))
    }

    fn on_select_sum(&mut self, packet: &mut Packet) -> Result<Option<Packet>, ClientError> {
        let _addressed_to = read_player(packet)?;
        let exact = !packet.read_bool()?;
        let mut sum = i64::from(packet.read_u32()?);
        let min = packet.read_u32()?;
        let max = packet.read_u32()?;

        // Forced picks are pre-deducted from the target sum; the
        // executor only chooses from the free candidates.
        let must_count = packet.read_u32()?;
        for _ in 0..must_count {
            let _card = self.read_listed_card(packet, IndexWidth::U32)?;
            let first = packet.read_u16()?;
            let second = packet.read_u16()?;
            sum -= i64::from(first.max(second));
        }

        let mut choices = Vec::new();
        for _ in 0..packet.read_u32()? {
            let card = self.read_listed_card(packet, IndexWidth::U32)?;
            let first = packet.read_u16()?;
            let second = packet.read_u16()?;
            choices.push((card, first, second));
        }

        let selected =
            self.executor
                .select_sum(&self.duel, &choices, sum, min, max, exact, self.select_hint);

        let mut reply = response();
        reply.write_bytes(&[0x00, 0x01, 0x00, 0x00])?;
        reply.write_u32(must_count + selected.len() as u32)?;
        for _ in 0..must_count {
            reply.write_u8(0)?;
        }
        for index in selected {
            reply.write_u8(index as u8)?;
        }
        Ok(Some(reply))
    }

    fn on_select_unselect(&mut self, packet: &mut Packet) -> Result<Option<Packet>, ClientError> {
        let _addressed_to = read_player(packet)?;
        let finishable = packet.read_bool()?;
        let cancelable = packet.read_bool()? || finishable;
        let _min = packet.read_u32()?;
        let _max = packet.read_u32()?;

        let mut choices = Vec::new();
        for _ in 0..packet.read_u32()? {
            let card = self.read_listed_card(packet, IndexWidth::U32)?;
            let position = packet.read_position()?;
            self.duel.card_mut(card).position = position;
            choices.push(card);
        }

        // Second list: cards already picked in this prompt sequence.
        for _ in 0..packet.read_u32()? {
            let _card = self.read_listed_card(packet, IndexWidth::U32)?;
            let _position = packet.read_position()?;
        }

        // One pick per round trip; finishing is expressed by an empty
        // selection.
        let min = u32::from(!finishable);
        let selected =
            self.executor
                .select_unselect(&self.duel, &choices, min, 1, cancelable, self.select_hint);

        let mut reply = response();
        if selected.is_empty() {
            reply.write_i32(-1)?;
        } else {
            reply.write_u32(selected.len() as u32)?;
            for index in selected {
                reply.write_u32(index)?;
            }
        }
        Ok(Some(reply))
    }

    fn on_announce_race(&mut self, packet: &mut Packet) -> Result<Option<Packet>, ClientError> {
        let _addressed_to = read_player(packet)?;
        let count = packet.read_u8()?;
        let available = packet.read_u32()?;
        let choices: Vec<Race> = Race::ALL
            .iter()
            .copied()
            .filter(|race| race.in_mask(available))
            .collect();

        let selected = self.executor.announce_race(&choices, count);

        let mut reply = response();
        reply.write_u32(selected.iter().fold(0, |acc, race| acc | race.raw()))?;
        Ok(Some(reply))
    }

    fn on_announce_attr(&mut self, packet: &mut Packet) -> Result<Option<Packet>, ClientError> {
        let _addressed_to = read_player(packet)?;
        let count = packet.read_u8()?;
        let available = packet.read_u32()?;
        let choices: Vec<Attribute> = Attribute::ALL
            .iter()
            .copied()
            .filter(|attr| attr.in_mask(available))
            .collect();

        let selected = self.executor.announce_attribute(&choices, count);

        let mut reply = response();
        reply.write_u32(selected.iter().fold(0, |acc, attr| acc | attr.raw()))?;
        Ok(Some(reply))
    }

    fn on_announce_number(&mut self, packet: &mut Packet) -> Result<Option<Packet>, ClientError> {
        let _addressed_to = read_player(packet)?;
        let count = packet.read_u8()?;
        let mut choices = Vec::with_capacity(count as usize);
        for _ in 0..count {
            choices.push(packet.read_u32()?);
        }
        let selected = self.executor.announce_number(&choices);

        let mut reply = response();
        reply.write_u32(selected)?;
        Ok(Some(reply))
    }

    // -------------------------------------------------------------------------
    // State synchronization
    // -------------------------------------------------------------------------

    fn on_update_data(&mut self, packet: &mut Packet) -> Result<Option<Packet>, ClientError> {
        let player = read_player(packet)?;
        let location = packet.read_location()?;
        let _size = packet.read_u32()?;

        let slots = self
            .duel
            .cards_at(player, location)
            .ok_or(ProtocolError::InvalidField("location"))?;
        for slot in slots {
            match slot {
                Some(card) => query::apply_card_updates(packet, &mut self.duel, card)?,
                // Empty zone slot: a bare zero-size record.
                None => {
                    let _ = packet.read_bytes(2)?;
                }
            }
        }
        Ok(None)
    }

    fn on_update_card(&mut self, packet: &mut Packet) -> Result<Option<Packet>, ClientError> {
        let player = read_player(packet)?;
        let location = packet.read_location()?;
        let index = packet.read_u8()? as usize;

        let card = self.require_card(player, location, index)?;
        query::apply_card_updates(packet, &mut self.duel, card)?;
        Ok(None)
    }

    fn on_shuffle_deck(&mut self, packet: &mut Packet) -> Result<Option<Packet>, ClientError> {
        let player = read_player(packet)?;
        let deck = self.duel.field(player).deck.clone();
        for card in deck {
            self.duel.card_mut(card).id = 0;
        }
        Ok(None)
    }

    fn on_shuffle_hand(&mut self, packet: &mut Packet) -> Result<Option<Packet>, ClientError> {
        let player = read_player(packet)?;
        let _num_of_hand = packet.read_u32()?;
        let hand = self.duel.field(player).hand.clone();
        for card in hand {
            self.duel.card_mut(card).id = packet.read_u32()?;
        }
        Ok(None)
    }

    fn on_shuffle_extra(&mut self, packet: &mut Packet) -> Result<Option<Packet>, ClientError> {
        let player = read_player(packet)?;
        let _num_of_extra = packet.read_u32()?;
        let extra = self.duel.field(player).extra.clone();
        for card in extra {
            if !self.duel.card(card).is_faceup() {
                self.duel.card_mut(card).id = packet.read_u32()?;
            }
        }
        Ok(None)
    }

    fn on_shuffle_setcard(&mut self, packet: &mut Packet) -> Result<Option<Packet>, ClientError> {
        let _location = packet.read_location()?;
        let count = packet.read_u8()?;

        // Take every shuffled card off the field first, then re-add at
        // the announced destinations; slots never hold two cards.
        let mut shuffled = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let controller = read_player(packet)?;
            let location = packet.read_location()?;
            let index = packet.read_u32()? as usize;
            let _position = packet.read_position()?;
            let card = self.require_card(controller, location, index)?;
            self.duel.card_mut(card).id = 0;
            shuffled.push((card, controller, location, index));
        }
        for (_, controller, location, index) in &shuffled {
            self.duel.remove_card(*controller, *location, *index);
        }

        for (card, ..) in shuffled {
            let controller = read_player(packet)?;
            let location = packet.read_location()?;
            let index = packet.read_u32()? as usize;
            let _position = packet.read_position()?;
            self.duel.add_card(card, controller, location, index);
        }
        Ok(None)
    }

    fn on_sort_card(&mut self, packet: &mut Packet) -> Result<Option<Packet>, ClientError> {
        let _addressed_to = read_player(packet)?;
        let mut cards = Vec::new();
        for _ in 0..packet.read_u32()? {
            let card = self.read_listed_card(packet, IndexWidth::U32)?;
            cards.push(card);
        }

        let order = self.executor.sort_cards(&self.duel, &cards);

        let mut reply = response();
        for index in order {
            reply.write_u8(index)?;
        }
        Ok(Some(reply))
    }

    fn on_sort_chain(&mut self) -> Result<Option<Packet>, ClientError> {
        // Keep server chain order.
        let mut reply = response();
        reply.write_i32(-1)?;
        Ok(Some(reply))
    }

    fn on_move(&mut self, packet: &mut Packet) -> Result<Option<Packet>, ClientError> {
        let card_id = packet.read_id()?;
        let prev_controller = read_player(packet)?;
        let prev_location = packet.read_location()?;
        let prev_index = packet.read_u32()? as usize;
        let _prev_position = packet.read_position()?;
        let controller = read_player(packet)?;
        let location = packet.read_location()?;
        let index = packet.read_u32()? as usize;
        let _position = packet.read_position()?;
        let _reason = packet.read_u32()?;

        // A source outside any tracked pile (e.g. a token appearing)
        // materializes a fresh card; a destination outside drops it.
        let card = match self
            .duel
            .get_or_create(prev_controller, prev_location, prev_index)
        {
            Some(card) => {
                self.duel
                    .remove_card(prev_controller, prev_location, prev_index);
                card
            }
            None => self.duel.new_card(controller),
        };
        self.duel.card_mut(card).id = card_id;
        self.duel.add_card(card, controller, location, index);
        Ok(None)
    }

    fn on_poschange(&mut self, packet: &mut Packet) -> Result<Option<Packet>, ClientError> {
        let _card_id = packet.read_id()?;
        let controller = read_player(packet)?;
        let location = packet.read_location()?;
        let index = packet.read_u8()? as usize;
        let _prev_position = packet.read_u8()?;
        let position = packet.read_u8()?;

        let card = self.require_card(controller, location, index)?;
        self.duel.card_mut(card).position = Position::from_raw(u32::from(position));
        Ok(None)
    }

    fn on_swap(&mut self, packet: &mut Packet) -> Result<Option<Packet>, ClientError> {
        let first_id = packet.read_id()?;
        let first_controller = read_player(packet)?;
        let first_location = packet.read_location()?;
        let first_index = packet.read_u32()? as usize;
        let _first_position = packet.read_position()?;
        let second_id = packet.read_id()?;
        let second_controller = read_player(packet)?;
        let second_location = packet.read_location()?;
        let second_index = packet.read_u32()? as usize;
        let _second_position = packet.read_position()?;

        let first = self.require_card(first_controller, first_location, first_index)?;
        self.duel.card_mut(first).id = first_id;
        let second = self.require_card(second_controller, second_location, second_index)?;
        self.duel.card_mut(second).id = second_id;

        self.duel
            .remove_card(first_controller, first_location, first_index);
        self.duel
            .remove_card(second_controller, second_location, second_index);
        self.duel
            .add_card(first, second_controller, second_location, second_index);
        self.duel
            .add_card(second, first_controller, first_location, first_index);
        Ok(None)
    }

    fn on_summoning(&mut self, packet: &mut Packet) -> Result<Option<Packet>, ClientError> {
        let card_id = packet.read_id()?;
        let controller = read_player(packet)?;
        let location = packet.read_location()?;
        let index = packet.read_u32()? as usize;
        let _position = packet.read_position()?;

        let card = self.require_card(controller, location, index)?;
        self.duel.card_mut(card).id = card_id;
        self.duel.on_summoning(card);
        Ok(None)
    }

    fn on_summoned(&mut self) -> Result<Option<Packet>, ClientError> {
        self.duel.on_summoned();
        Ok(None)
    }

    fn on_chaining(&mut self, packet: &mut Packet) -> Result<Option<Packet>, ClientError> {
        let card_id = packet.read_id()?;
        let controller = read_player(packet)?;
        let location = packet.read_location()?;
        let index = packet.read_u32()? as usize;
        let _position = packet.read_position()?;

        let card = self.require_card(controller, location, index)?;
        self.duel.card_mut(card).id = card_id;
        let chain_player = read_player(packet)?;
        self.duel.on_chaining(chain_player, card);
        Ok(None)
    }

    fn on_chain_end(&mut self) -> Result<Option<Packet>, ClientError> {
        self.duel.on_chain_end();
        Ok(None)
    }

    fn on_become_target(&mut self, packet: &mut Packet) -> Result<Option<Packet>, ClientError> {
        for _ in 0..packet.read_u32()? {
            let controller = read_player(packet)?;
            let location = packet.read_location()?;
            let index = packet.read_u32()? as usize;
            let _position = packet.read_position()?;
            if let Some(card) = self.duel.get_or_create(controller, location, index) {
                self.duel.on_become_target(card);
            }
        }
        Ok(None)
    }

    fn on_draw(&mut self, packet: &mut Packet) -> Result<Option<Packet>, ClientError> {
        let player = read_player(packet)?;
        for _ in 0..packet.read_u32()? {
            self.duel.on_draw(player);
        }
        Ok(None)
    }

    fn on_damage(&mut self, packet: &mut Packet) -> Result<Option<Packet>, ClientError> {
        let player = read_player(packet)?;
        let amount = packet.read_u32()?;
        self.duel.on_damage(player, amount as i32);
        Ok(None)
    }

    fn on_recover(&mut self, packet: &mut Packet) -> Result<Option<Packet>, ClientError> {
        let player = read_player(packet)?;
        let amount = packet.read_u32()?;
        self.duel.on_recover(player, amount as i32);
        Ok(None)
    }

    fn on_equip(&mut self, packet: &mut Packet) -> Result<Option<Packet>, ClientError> {
        let equip = self.read_card_ref(packet)?;
        let target = self.read_card_ref(packet)?;
        if let (Some(equip), Some(target)) = (equip, target) {
            self.duel.equip(equip, target);
        }
        Ok(None)
    }

    fn on_unequip(&mut self, packet: &mut Packet) -> Result<Option<Packet>, ClientError> {
        if let Some(card) = self.read_card_ref(packet)? {
            self.duel.unequip(card);
        }
        Ok(None)
    }

    fn on_lp_update(&mut self, packet: &mut Packet) -> Result<Option<Packet>, ClientError> {
        let player = read_player(packet)?;
        let lp = packet.read_u32()?;
        self.duel.on_lp_update(player, lp as i32);
        Ok(None)
    }

    fn on_card_target(&mut self, packet: &mut Packet) -> Result<Option<Packet>, ClientError> {
        let source = self.read_card_ref(packet)?;
        let target = self.read_card_ref(packet)?;
        if let (Some(source), Some(target)) = (source, target) {
            self.duel.add_target(source, target);
        }
        Ok(None)
    }

    fn on_cancel_target(&mut self, packet: &mut Packet) -> Result<Option<Packet>, ClientError> {
        let source = self.read_card_ref(packet)?;
        let target = self.read_card_ref(packet)?;
        if let (Some(source), Some(target)) = (source, target) {
            self.duel.remove_target(source, target);
        }
        Ok(None)
    }

    fn on_attack(&mut self, packet: &mut Packet) -> Result<Option<Packet>, ClientError> {
        let attacker = self
            .read_card_ref(packet)?
            .ok_or(ProtocolError::InvalidField("location"))?;
        // The target triple is all zeroes for direct attacks.
        let target = self.read_card_ref(packet)?;
        self.duel.on_attack(attacker, target);
        Ok(None)
    }

    fn on_battle(&mut self) -> Result<Option<Packet>, ClientError> {
        self.duel.on_battle();
        Ok(None)
    }

    // -------------------------------------------------------------------------
    // Shared field recipes
    // -------------------------------------------------------------------------

    /// A `(card id, controller, location, index)` entry of a candidate
    /// list. The id overwrites whatever the mirror knew; a zero id
    /// turning non-zero is the normal reveal path.
    fn read_listed_card(
        &mut self,
        packet: &mut Packet,
        index_width: IndexWidth,
    ) -> Result<CardHandle, ClientError> {
        let card_id = packet.read_id()?;
        let controller = read_player(packet)?;
        let location = packet.read_location()?;
        let index = match index_width {
            IndexWidth::U8 => packet.read_u8()? as usize,
            IndexWidth::U32 => packet.read_u32()? as usize,
        };
        let card = self.require_card(controller, location, index)?;
        self.duel.card_mut(card).id = card_id;
        Ok(card)
    }

    /// A `(controller, location, index, position)` reference without a
    /// card id; `None` when the triple names no tracked slot.
    fn read_card_ref(&mut self, packet: &mut Packet) -> Result<Option<CardHandle>, ClientError> {
        let controller = read_player(packet)?;
        let location = packet.read_location()?;
        let index = packet.read_u32()? as usize;
        let _position = packet.read_position()?;
        Ok(self.duel.get_or_create(controller, location, index))
    }

    fn require_card(
        &mut self,
        controller: Player,
        location: Location,
        index: usize,
    ) -> Result<CardHandle, ClientError> {
        self.duel
            .get_or_create(controller, location, index)
            .ok_or_else(|| ProtocolError::InvalidField("location").into())
    }

    fn update_deck_packet(&self) -> Result<Packet, ProtocolError> {
        let mut reply = Packet::new(CtosMessage::UpdateDeck as u8);
        reply.write_u32((self.deck.count_main() + self.deck.count_extra()) as u32)?;
        reply.write_u32(self.deck.count_side() as u32)?;
        for id in self
            .deck
            .main
            .iter()
            .chain(self.deck.extra.iter())
            .chain(self.deck.side.iter())
        {
            reply.write_u32(*id)?;
        }
        Ok(reply)
    }
}

/// Card index width inside one candidate list.
#[derive(Debug, Clone, Copy)]
enum IndexWidth {
    U8,
    U32,
}

fn response() -> Packet {
    Packet::new(CtosMessage::Response as u8)
}

fn read_player(packet: &mut Packet) -> Result<Player, ClientError> {
    Player::from_index(packet.read_u8()?)
        .ok_or_else(|| ProtocolError::InvalidField("player").into())
}

fn done(reply: Option<Packet>) -> Result<Handled, ClientError> {
    Ok(match reply {
        Some(packet) => Handled::Reply(packet),
        None => Handled::NoReply,
    })
}
