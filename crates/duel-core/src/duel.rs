//! The duel aggregate: card arena, both fields, and turn state.
//!
//! This is the client-side mirror of the server's authoritative state.
//! It records exactly what the server announces and never infers
//! outcomes on its own. Cards are created lazily the first time the
//! server references a slot this client has not seen.

use std::mem;

use crate::card::{Card, CardHandle};
use crate::field::Field;
use crate::location::Location;
use crate::phase::Phase;
use crate::player::Player;

/// One link of the pending chain: who activated, and which card.
#[derive(Debug, Clone, Copy)]
pub struct ChainLink {
    pub player: Player,
    pub card: CardHandle,
}

/// Client-side mirror of one duel.
#[derive(Debug)]
pub struct Duel {
    cards: Vec<Card>,
    fields: [Field; 2],

    pub phase: Phase,
    pub turn: u32,
    pub turn_player: Player,
    pub life: [i32; 2],

    chain: Vec<ChainLink>,
    chain_targets: Vec<CardHandle>,
    summoning: Vec<CardHandle>,
    last_summoned: Vec<CardHandle>,
    attacking: Option<CardHandle>,
    attack_target: Option<CardHandle>,
}

impl Duel {
    pub fn new() -> Self {
        Duel {
            cards: Vec::new(),
            fields: [Field::new(), Field::new()],
            phase: Phase::Draw,
            turn: 0,
            turn_player: Player::Me,
            life: [0, 0],
            chain: Vec::new(),
            chain_targets: Vec::new(),
            summoning: Vec::new(),
            last_summoned: Vec::new(),
            attacking: None,
            attack_target: None,
        }
    }

    // -------------------------------------------------------------------------
    // Arena access
    // -------------------------------------------------------------------------

    pub fn card(&self, handle: CardHandle) -> &Card {
        &self.cards[handle.arena_index()]
    }

    pub fn card_mut(&mut self, handle: CardHandle) -> &mut Card {
        &mut self.cards[handle.arena_index()]
    }

    /// Create a fresh, unrevealed card outside any field slot.
    pub fn new_card(&mut self, controller: Player) -> CardHandle {
        self.cards.push(Card::new(controller));
        CardHandle::new(self.cards.len() - 1)
    }

    pub fn field(&self, player: Player) -> &Field {
        &self.fields[player.index()]
    }

    pub fn field_mut(&mut self, player: Player) -> &mut Field {
        &mut self.fields[player.index()]
    }

    // -------------------------------------------------------------------------
    // Slot bookkeeping
    // -------------------------------------------------------------------------

    /// The card at `(controller, location, index)`, creating it (and any
    /// missing pile slots below it) on first reference.
    ///
    /// Returns `None` when the location names no trackable slot, e.g.
    /// the all-zero triple sent for a direct-attack target.
    pub fn get_or_create(
        &mut self,
        controller: Player,
        location: Location,
        index: usize,
    ) -> Option<CardHandle> {
        if let Some(handle) = self.fields[controller.index()].get(location, index) {
            return Some(handle);
        }

        // Pad growable piles up to the referenced index so every slot
        // below it stays addressable.
        loop {
            let handle = self.new_card(controller);
            if !self.fields[controller.index()].place(location, index, handle) {
                return None;
            }
            if self.fields[controller.index()].get(location, index).is_some() {
                break;
            }
        }
        self.fields[controller.index()].get(location, index)
    }

    /// The card at a slot without creating it.
    pub fn card_at(&self, controller: Player, location: Location, index: usize) -> Option<CardHandle> {
        self.fields[controller.index()].get(location, index)
    }

    /// All slots of a location in order (`None` = empty zone slot), or
    /// `None` if the location is not trackable.
    pub fn cards_at(&self, player: Player, location: Location) -> Option<Vec<Option<CardHandle>>> {
        self.fields[player.index()].all(location)
    }

    /// Insert a card at a slot and hand control to `controller`.
    ///
    /// Returns false when the destination names no trackable slot, in
    /// which case the card simply leaves the tracked field (e.g. a
    /// token despawning).
    pub fn add_card(
        &mut self,
        handle: CardHandle,
        controller: Player,
        location: Location,
        index: usize,
    ) -> bool {
        self.card_mut(handle).controller = controller;
        self.fields[controller.index()].place(location, index, handle)
    }

    /// Remove a card from its slot. Moves are always this followed by
    /// [`Duel::add_card`]; nothing relocates in place.
    pub fn remove_card(&mut self, controller: Player, location: Location, index: usize) {
        self.fields[controller.index()].remove(location, index);
    }

    // -------------------------------------------------------------------------
    // Relationships
    // -------------------------------------------------------------------------

    /// Equip `equip` to `target`, detaching it from any previous target.
    /// Both directions of the link are updated together.
    pub fn equip(&mut self, equip: CardHandle, target: CardHandle) {
        self.unequip(equip);
        self.cards[equip.arena_index()].equip_target = Some(target);
        self.cards[target.arena_index()].equip_cards.push(equip);
    }

    /// Clear the equip link of `equip`, if any, on both sides.
    pub fn unequip(&mut self, equip: CardHandle) {
        if let Some(old) = self.cards[equip.arena_index()].equip_target.take() {
            self.cards[old.arena_index()]
                .equip_cards
                .retain(|h| *h != equip);
        }
    }

    /// Record that `source` targets `target`.
    pub fn add_target(&mut self, source: CardHandle, target: CardHandle) {
        self.cards[source.arena_index()].target_cards.push(target);
        self.cards[target.arena_index()].targeted_by.push(source);
    }

    /// Drop the `source` -> `target` link from both sides.
    pub fn remove_target(&mut self, source: CardHandle, target: CardHandle) {
        self.cards[source.arena_index()]
            .target_cards
            .retain(|h| *h != target);
        self.cards[target.arena_index()]
            .targeted_by
            .retain(|h| *h != source);
    }

    /// Replace the full target list of `source`, unwiring every old
    /// back-reference and wiring every new one.
    pub fn replace_targets(&mut self, source: CardHandle, targets: Vec<CardHandle>) {
        let old = mem::take(&mut self.cards[source.arena_index()].target_cards);
        for target in old {
            self.cards[target.arena_index()]
                .targeted_by
                .retain(|h| *h != source);
        }
        for target in &targets {
            self.cards[target.arena_index()].targeted_by.push(source);
        }
        self.cards[source.arena_index()].target_cards = targets;
    }

    // -------------------------------------------------------------------------
    // Duel events
    // -------------------------------------------------------------------------

    /// First server start announcement of a duel.
    pub fn on_start(&mut self, first_player: Player) {
        self.turn_player = first_player;
        self.turn = 0;
    }

    /// Populate the hidden main and extra decks with unrevealed cards.
    pub fn set_deck(&mut self, player: Player, num_main: usize, num_extra: usize) {
        for _ in 0..num_main {
            let handle = self.new_card(player);
            self.fields[player.index()].deck.push(handle);
        }
        for _ in 0..num_extra {
            let handle = self.new_card(player);
            self.fields[player.index()].extra.push(handle);
        }
    }

    /// Move the top card of `player`'s deck to their hand. The drawn
    /// card's identity arrives separately (shuffle-hand or updates).
    pub fn on_draw(&mut self, player: Player) {
        let handle = match self.fields[player.index()].deck.pop() {
            Some(handle) => handle,
            None => self.new_card(player),
        };
        self.fields[player.index()].hand.push(handle);
    }

    pub fn on_lp_update(&mut self, player: Player, lp: i32) {
        self.life[player.index()] = lp;
    }

    pub fn on_damage(&mut self, player: Player, amount: i32) {
        self.life[player.index()] = (self.life[player.index()] - amount).max(0);
    }

    pub fn on_recover(&mut self, player: Player, amount: i32) {
        self.life[player.index()] += amount;
    }

    pub fn on_new_turn(&mut self, turn_player: Player) {
        self.turn_player = turn_player;
        self.turn += 1;
        for field in &mut self.fields {
            field.under_attack = false;
        }
    }

    pub fn on_new_phase(&mut self, phase: Phase) {
        self.phase = phase;
        self.summoning.clear();
        self.last_summoned.clear();
    }

    /// A summon (normal, special or flip) has been declared.
    pub fn on_summoning(&mut self, card: CardHandle) {
        self.summoning.push(card);
    }

    /// The declared summon resolved without being negated.
    pub fn on_summoned(&mut self) {
        self.last_summoned = mem::take(&mut self.summoning);
    }

    /// Per-turn markers cleared when the main phase is over.
    pub fn at_mainphase_end(&mut self) {
        self.summoning.clear();
        self.last_summoned.clear();
    }

    pub fn on_chaining(&mut self, player: Player, card: CardHandle) {
        self.chain.push(ChainLink { player, card });
    }

    pub fn on_chain_end(&mut self) {
        self.chain.clear();
        self.chain_targets.clear();
    }

    pub fn on_become_target(&mut self, card: CardHandle) {
        self.chain_targets.push(card);
    }

    /// An attack declaration; `target` is `None` for direct attacks.
    pub fn on_attack(&mut self, attacker: CardHandle, target: Option<CardHandle>) {
        let defender = self.card(attacker).controller.opponent();
        self.card_mut(attacker).attacked = true;
        self.attacking = Some(attacker);
        self.attack_target = target;
        self.fields[defender.index()].under_attack = true;
    }

    /// The battle step resolved or the attack was disabled.
    pub fn on_battle(&mut self) {
        self.attacking = None;
        self.attack_target = None;
        for field in &mut self.fields {
            field.under_attack = false;
        }
    }

    /// Clear both sides' under-attack markers (battling hint).
    pub fn clear_under_attack(&mut self) {
        for field in &mut self.fields {
            field.under_attack = false;
        }
    }

    // -------------------------------------------------------------------------
    // Read-side accessors
    // -------------------------------------------------------------------------

    pub fn chain(&self) -> &[ChainLink] {
        &self.chain
    }

    pub fn chain_targets(&self) -> &[CardHandle] {
        &self.chain_targets
    }

    pub fn attacking(&self) -> Option<CardHandle> {
        self.attacking
    }

    pub fn attack_target(&self) -> Option<CardHandle> {
        self.attack_target
    }

    pub fn last_summoned(&self) -> &[CardHandle] {
        &self.last_summoned
    }
}

impl Default for Duel {
    fn default() -> Self {
        Duel::new()
    }
}
