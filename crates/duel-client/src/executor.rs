//! The decision boundary.
//!
//! Every choice point of a duel is forwarded to a [`DuelExecutor`],
//! one method per decision shape. The executor sees the current duel
//! mirror plus the decoded candidate set and returns indices into that
//! set (or a scalar decision). The router forwards whatever comes back
//! without validating it against min/max/cancelable; the server is
//! authoritative and is the final arbiter of a bad choice.
//!
//! The receive loop is lockstep, so at most one decision is in flight
//! at a time and implementations may keep mutable state freely.

use duel_core::{
    BattlePhaseCommands, Attribute, CardHandle, Deck, Duel, Location, MainPhaseCommands, Player,
    Position, Race,
};

/// Decision-making callback driving one duel.
pub trait DuelExecutor {
    /// Called when a new duel starts.
    fn on_start(&mut self, duel: &Duel);

    /// Called when a new turn starts.
    fn on_new_turn(&mut self, duel: &Duel);

    /// Called when a new phase starts.
    fn on_new_phase(&mut self, duel: &Duel);

    /// Called when a duel ends.
    fn on_win(&mut self, duel: &Duel, win: bool);

    /// Called when the match is over. Return true to rematch.
    fn on_rematch(&mut self, won_match: bool) -> bool;

    /// Edit the deck between duels of a match.
    fn change_side(&mut self, deck: &mut Deck);

    /// Rock-paper-scissors result: 1, 2 or 3.
    fn select_hand(&mut self) -> u8;

    /// Return true to take the first turn.
    fn select_tp(&mut self) -> bool;

    /// Pick a main phase action, encoded the way the server expects
    /// (candidate index and action kind packed into one integer).
    fn select_mainphase_action(&mut self, duel: &Duel, commands: &MainPhaseCommands) -> u32;

    /// Pick a battle phase action.
    fn select_battle_action(&mut self, duel: &Duel, commands: &BattlePhaseCommands) -> u32;

    /// Whether to activate the shown card's optional effect.
    fn select_effect_yn(&mut self, duel: &Duel, card: CardHandle, description: u64) -> bool;

    /// A plain yes/no prompt.
    fn select_yn(&mut self, duel: &Duel) -> bool;

    /// Whether to replay the battle after the board changed mid-attack.
    fn select_battle_replay(&mut self, duel: &Duel) -> bool;

    /// Pick one of several effect options; returns an index.
    fn select_option(&mut self, duel: &Duel, options: &[u64]) -> u32;

    /// Pick cards from a candidate set; returns candidate indices.
    fn select_card(
        &mut self,
        duel: &Duel,
        choices: &[CardHandle],
        min: u32,
        max: u32,
        cancelable: bool,
        hint: u64,
    ) -> Vec<u32>;

    /// Pick tribute monsters; returns candidate indices.
    fn select_tribute(
        &mut self,
        duel: &Duel,
        choices: &[CardHandle],
        min: u32,
        max: u32,
        cancelable: bool,
        hint: u64,
    ) -> Vec<u32>;

    /// Pick the chain link to activate, or -1 to pass when not forced.
    fn select_chain(
        &mut self,
        duel: &Duel,
        choices: &[CardHandle],
        descriptions: &[u64],
        forced: bool,
    ) -> i32;

    /// Pick a zone offset from `choices` on `player`'s `location`.
    fn select_place(
        &mut self,
        duel: &Duel,
        player: Player,
        location: Location,
        choices: &[u8],
    ) -> u8;

    /// Pick a battle position for the shown card.
    fn select_position(&mut self, duel: &Duel, card_id: u32, choices: &[Position]) -> Position;

    /// Pick cards whose values reach `sum`; returns candidate indices.
    fn select_sum(
        &mut self,
        duel: &Duel,
        choices: &[(CardHandle, u16, u16)],
        sum: i64,
        min: u32,
        max: u32,
        exact: bool,
        hint: u64,
    ) -> Vec<u32>;

    /// Pick (or unpick) cards one at a time; returns candidate indices,
    /// empty to finish/cancel.
    fn select_unselect(
        &mut self,
        duel: &Duel,
        choices: &[CardHandle],
        min: u32,
        max: u32,
        cancelable: bool,
        hint: u64,
    ) -> Vec<u32>;

    /// Distribute counters over the candidates; returns one count per
    /// candidate.
    fn select_counter(
        &mut self,
        duel: &Duel,
        counter_type: u16,
        quantity: u32,
        cards: &[CardHandle],
        counts: &[u16],
    ) -> Vec<u16>;

    /// Pick one announced number; returns an index into `choices`.
    fn announce_number(&mut self, choices: &[u32]) -> u32;

    /// Announce `count` races from the available set.
    fn announce_race(&mut self, choices: &[Race], count: u8) -> Vec<Race>;

    /// Announce `count` attributes from the available set.
    fn announce_attribute(&mut self, choices: &[Attribute], count: u8) -> Vec<Attribute>;

    /// Order the given cards; returns one index per card.
    fn sort_cards(&mut self, duel: &Duel, cards: &[CardHandle]) -> Vec<u8>;
}
