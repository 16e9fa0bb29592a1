//! Shared test doubles for the router and client-loop tests.

use duel_client::DuelExecutor;
use duel_core::{
    Attribute, BattlePhaseCommands, CardHandle, Deck, Duel, Location, MainPhaseCommands, Player,
    Position, Race,
};

/// Executor double: records every invocation and answers from
/// pre-configured fields.
#[derive(Debug)]
pub struct RecordingExecutor {
    pub calls: Vec<&'static str>,

    pub yn_answer: bool,
    pub battle_replay_answer: bool,
    pub card_pick: Vec<u32>,
    pub chain_pick: i32,
    pub place_pick: u8,

    pub last_hint: u64,
    pub last_place: Option<(Player, Location, Vec<u8>)>,
    pub last_min_max: Option<(u32, u32)>,
}

impl Default for RecordingExecutor {
    fn default() -> Self {
        RecordingExecutor {
            calls: Vec::new(),
            yn_answer: true,
            battle_replay_answer: false,
            card_pick: Vec::new(),
            chain_pick: 0,
            place_pick: 0,
            last_hint: 0,
            last_place: None,
            last_min_max: None,
        }
    }
}

impl DuelExecutor for RecordingExecutor {
    fn on_start(&mut self, _duel: &Duel) {
        self.calls.push("on_start");
    }

    fn on_new_turn(&mut self, _duel: &Duel) {
        self.calls.push("on_new_turn");
    }

    fn on_new_phase(&mut self, _duel: &Duel) {
        self.calls.push("on_new_phase");
    }

    fn on_win(&mut self, _duel: &Duel, _win: bool) {
        self.calls.push("on_win");
    }

    fn on_rematch(&mut self, _won_match: bool) -> bool {
        self.calls.push("on_rematch");
        false
    }

    fn change_side(&mut self, _deck: &mut Deck) {
        self.calls.push("change_side");
    }

    fn select_hand(&mut self) -> u8 {
        self.calls.push("select_hand");
        2
    }

    fn select_tp(&mut self) -> bool {
        self.calls.push("select_tp");
        true
    }

    fn select_mainphase_action(&mut self, _duel: &Duel, _commands: &MainPhaseCommands) -> u32 {
        self.calls.push("select_mainphase_action");
        7
    }

    fn select_battle_action(&mut self, _duel: &Duel, _commands: &BattlePhaseCommands) -> u32 {
        self.calls.push("select_battle_action");
        3
    }

    fn select_effect_yn(&mut self, _duel: &Duel, _card: CardHandle, _description: u64) -> bool {
        self.calls.push("select_effect_yn");
        self.yn_answer
    }

    fn select_yn(&mut self, _duel: &Duel) -> bool {
        self.calls.push("select_yn");
        self.yn_answer
    }

    fn select_battle_replay(&mut self, _duel: &Duel) -> bool {
        self.calls.push("select_battle_replay");
        self.battle_replay_answer
    }

    fn select_option(&mut self, _duel: &Duel, _options: &[u64]) -> u32 {
        self.calls.push("select_option");
        0
    }

    fn select_card(
        &mut self,
        _duel: &Duel,
        _choices: &[CardHandle],
        min: u32,
        max: u32,
        _cancelable: bool,
        hint: u64,
    ) -> Vec<u32> {
        self.calls.push("select_card");
        self.last_hint = hint;
        self.last_min_max = Some((min, max));
        self.card_pick.clone()
    }

    fn select_tribute(
        &mut self,
        _duel: &Duel,
        _choices: &[CardHandle],
        min: u32,
        max: u32,
        _cancelable: bool,
        hint: u64,
    ) -> Vec<u32> {
        self.calls.push("select_tribute");
        self.last_hint = hint;
        self.last_min_max = Some((min, max));
        self.card_pick.clone()
    }

    fn select_chain(
        &mut self,
        _duel: &Duel,
        _choices: &[CardHandle],
        _descriptions: &[u64],
        _forced: bool,
    ) -> i32 {
        self.calls.push("select_chain");
        self.chain_pick
    }

    fn select_place(
        &mut self,
        _duel: &Duel,
        player: Player,
        location: Location,
        choices: &[u8],
    ) -> u8 {
        self.calls.push("select_place");
        self.last_place = Some((player, location, choices.to_vec()));
        self.place_pick
    }

    fn select_position(&mut self, _duel: &Duel, _card_id: u32, choices: &[Position]) -> Position {
        self.calls.push("select_position");
        choices.first().copied().unwrap_or(Position::FACEUP_ATTACK)
    }

    fn select_sum(
        &mut self,
        _duel: &Duel,
        _choices: &[(CardHandle, u16, u16)],
        _sum: i64,
        _min: u32,
        _max: u32,
        _exact: bool,
        _hint: u64,
    ) -> Vec<u32> {
        self.calls.push("select_sum");
        self.card_pick.clone()
    }

    fn select_unselect(
        &mut self,
        _duel: &Duel,
        _choices: &[CardHandle],
        _min: u32,
        _max: u32,
        _cancelable: bool,
        _hint: u64,
    ) -> Vec<u32> {
        self.calls.push("select_unselect");
        self.card_pick.clone()
    }

    fn select_counter(
        &mut self,
        _duel: &Duel,
        _counter_type: u16,
        _quantity: u32,
        _cards: &[CardHandle],
        counts: &[u16],
    ) -> Vec<u16> {
        self.calls.push("select_counter");
        counts.to_vec()
    }

    fn announce_number(&mut self, _choices: &[u32]) -> u32 {
        self.calls.push("announce_number");
        0
    }

    fn announce_race(&mut self, choices: &[Race], count: u8) -> Vec<Race> {
        self.calls.push("announce_race");
        choices.iter().copied().take(count as usize).collect()
    }

    fn announce_attribute(&mut self, choices: &[Attribute], count: u8) -> Vec<Attribute> {
        self.calls.push("announce_attribute");
        choices.iter().copied().take(count as usize).collect()
    }

    fn sort_cards(&mut self, _duel: &Duel, cards: &[CardHandle]) -> Vec<u8> {
        self.calls.push("sort_cards");
        (0..cards.len() as u8).collect()
    }
}
